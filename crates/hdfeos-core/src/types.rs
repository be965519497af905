//! Number type registry.
//!
//! HDF-EOS reports the element type of every field and attribute as a small
//! integer code. This module maps each code to the in-memory element type
//! used for typed buffers and to the C pointer type the native call expects
//! for that buffer.
//!
//! | Code | Element type | C pointer |
//! |------|--------------|-----------|
//! | 0    | int32        | `int *` |
//! | 1    | uint32       | `unsigned int *` |
//! | 2    | int16        | `short int *` |
//! | 3    | uint16       | `unsigned short int *` |
//! | 4    | int8         | `signed char *` |
//! | 5    | uint8        | `unsigned char *` |
//! | 8    | int64        | `long long int *` |
//! | 9    | uint64       | `unsigned long long int *` |
//! | 10   | float32      | `float *` |
//! | 11   | float64      | `double *` |
//! | 57   | text         | `char *` |

use std::ffi::{c_char, c_double, c_float, c_int, c_longlong, c_schar, c_short, c_uchar};
use std::ffi::{c_uint, c_ulonglong, c_ushort};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReadError, Result};

/// Number type code for character data.
pub const TEXT_TYPE_CODE: i32 = 57;

/// Every number type code the registry maps.
pub const SUPPORTED_TYPE_CODES: [i32; 11] = [0, 1, 2, 3, 4, 5, 8, 9, 10, 11, TEXT_TYPE_CODE];

/// In-memory element type of a typed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    /// Character data, stored as raw bytes.
    Text,
}

impl ElementType {
    /// Width of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 | Self::Text => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// The native number type code for this element type.
    pub fn type_code(self) -> i32 {
        match self {
            Self::Int32 => 0,
            Self::UInt32 => 1,
            Self::Int16 => 2,
            Self::UInt16 => 3,
            Self::Int8 => 4,
            Self::UInt8 => 5,
            Self::Int64 => 8,
            Self::UInt64 => 9,
            Self::Float32 => 10,
            Self::Float64 => 11,
            Self::Text => TEXT_TYPE_CODE,
        }
    }

    /// Short lowercase name ("int32", "float64", "text", ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The C pointer type a buffer is handed to the native layer as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Int,
    UnsignedInt,
    Short,
    UnsignedShort,
    SignedChar,
    UnsignedChar,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    Char,
}

impl PointerKind {
    /// The C spelling of the pointer type.
    pub fn c_type(self) -> &'static str {
        match self {
            Self::Int => "int *",
            Self::UnsignedInt => "unsigned int *",
            Self::Short => "short int *",
            Self::UnsignedShort => "unsigned short int *",
            Self::SignedChar => "signed char *",
            Self::UnsignedChar => "unsigned char *",
            Self::LongLong => "long long int *",
            Self::UnsignedLongLong => "unsigned long long int *",
            Self::Float => "float *",
            Self::Double => "double *",
            Self::Char => "char *",
        }
    }

    /// Width in bytes of the pointee on this platform.
    pub fn element_size(self) -> usize {
        use std::mem::size_of;
        match self {
            Self::Int => size_of::<c_int>(),
            Self::UnsignedInt => size_of::<c_uint>(),
            Self::Short => size_of::<c_short>(),
            Self::UnsignedShort => size_of::<c_ushort>(),
            Self::SignedChar => size_of::<c_schar>(),
            Self::UnsignedChar => size_of::<c_uchar>(),
            Self::LongLong => size_of::<c_longlong>(),
            Self::UnsignedLongLong => size_of::<c_ulonglong>(),
            Self::Float => size_of::<c_float>(),
            Self::Double => size_of::<c_double>(),
            Self::Char => size_of::<c_char>(),
        }
    }
}

impl fmt::Display for PointerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_type())
    }
}

/// Map a native number type code to its element type.
pub fn element_type_for(code: i32) -> Result<ElementType> {
    let element = match code {
        0 => ElementType::Int32,
        1 => ElementType::UInt32,
        2 => ElementType::Int16,
        3 => ElementType::UInt16,
        4 => ElementType::Int8,
        5 => ElementType::UInt8,
        8 => ElementType::Int64,
        9 => ElementType::UInt64,
        10 => ElementType::Float32,
        11 => ElementType::Float64,
        TEXT_TYPE_CODE => ElementType::Text,
        _ => return Err(ReadError::UnsupportedTypeCode { code }),
    };
    Ok(element)
}

/// Map a native number type code to the pointer type its buffer is passed as.
pub fn pointer_kind_for(code: i32) -> Result<PointerKind> {
    let kind = match code {
        0 => PointerKind::Int,
        1 => PointerKind::UnsignedInt,
        2 => PointerKind::Short,
        3 => PointerKind::UnsignedShort,
        4 => PointerKind::SignedChar,
        5 => PointerKind::UnsignedChar,
        8 => PointerKind::LongLong,
        9 => PointerKind::UnsignedLongLong,
        10 => PointerKind::Float,
        11 => PointerKind::Double,
        TEXT_TYPE_CODE => PointerKind::Char,
        _ => return Err(ReadError::UnsupportedTypeCode { code }),
    };
    Ok(kind)
}

/// Whether a code is the text sentinel.
pub fn is_text(code: i32) -> bool {
    code == TEXT_TYPE_CODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_total_and_consistent() {
        for code in SUPPORTED_TYPE_CODES {
            let element = element_type_for(code).unwrap();
            let pointer = pointer_kind_for(code).unwrap();
            assert_eq!(element.size(), pointer.element_size(), "code {}", code);
            assert_eq!(element.type_code(), code);
        }
    }

    #[test]
    fn test_unmapped_codes_rejected() {
        for code in [-1, 6, 7, 12, 56, 58, 1000] {
            assert_eq!(
                element_type_for(code),
                Err(ReadError::UnsupportedTypeCode { code })
            );
            assert_eq!(
                pointer_kind_for(code),
                Err(ReadError::UnsupportedTypeCode { code })
            );
        }
    }

    #[test]
    fn test_exact_table() {
        assert_eq!(element_type_for(0).unwrap(), ElementType::Int32);
        assert_eq!(element_type_for(5).unwrap(), ElementType::UInt8);
        assert_eq!(element_type_for(9).unwrap(), ElementType::UInt64);
        assert_eq!(element_type_for(10).unwrap(), ElementType::Float32);
        assert_eq!(pointer_kind_for(4).unwrap().c_type(), "signed char *");
        assert_eq!(pointer_kind_for(57).unwrap().c_type(), "char *");
        assert!(is_text(57));
        assert!(!is_text(5));
    }
}
