//! Typed buffers lent to the native layer.
//!
//! A read allocates a [`TypedBuffer`] of the element type the registry
//! reports, lends its storage to exactly one native call as a
//! [`RawBuffer`], and then moves the buffer to the caller as a
//! [`TypedArray`] or an [`AttrValue`]. The `RawBuffer` borrow ends when the
//! call returns, so no pointer into the buffer survives the call.

use std::ffi::c_void;

use ndarray::{ArrayD, IxDyn};
use serde::Serialize;

use crate::error::{ReadError, Result};
use crate::types::{ElementType, PointerKind};

/// Exclusive, call-scoped view of a typed buffer's storage.
pub struct RawBuffer<'a> {
    bytes: &'a mut [u8],
    kind: PointerKind,
}

impl<'a> RawBuffer<'a> {
    /// Wrap a byte region that the native call will write as `kind` elements.
    pub fn new(bytes: &'a mut [u8], kind: PointerKind) -> Self {
        Self { bytes, kind }
    }

    /// The pointer type the native call receives.
    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    /// Number of elements the buffer holds.
    pub fn len(&self) -> usize {
        self.bytes.len() / self.kind.element_size()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Size of the region in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Raw address for the native call.
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        self.bytes.as_mut_ptr().cast()
    }

    /// The region as native-endian bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    /// Run a native write of `needed` bytes that cannot be bounded by the
    /// callee.
    ///
    /// If the lent region is shorter than `needed`, `write` gets a scratch
    /// region instead and only the leading [`byte_len`](Self::byte_len)
    /// bytes are copied back after a successful status.
    pub fn staged<F>(&mut self, needed: usize, write: F) -> i64
    where
        F: FnOnce(RawBuffer<'_>) -> i64,
    {
        if needed <= self.bytes.len() {
            return write(RawBuffer::new(&mut *self.bytes, self.kind));
        }
        // u64 words keep the scratch aligned for every element type.
        let mut scratch = vec![0u64; needed.div_ceil(8)];
        let scratch: &mut [u8] = bytemuck::cast_slice_mut(scratch.as_mut_slice());
        let status = write(RawBuffer::new(&mut *scratch, self.kind));
        if status >= 0 {
            let n = self.bytes.len();
            self.bytes.copy_from_slice(&scratch[..n]);
        }
        status
    }
}

macro_rules! for_each_variant {
    ($enum:ident, $value:expr, $v:ident => $body:expr) => {
        match $value {
            $enum::Int8($v) => $body,
            $enum::UInt8($v) => $body,
            $enum::Int16($v) => $body,
            $enum::UInt16($v) => $body,
            $enum::Int32($v) => $body,
            $enum::UInt32($v) => $body,
            $enum::Int64($v) => $body,
            $enum::UInt64($v) => $body,
            $enum::Float32($v) => $body,
            $enum::Float64($v) => $body,
            $enum::Text($v) => $body,
        }
    };
}

macro_rules! map_variant {
    ($from:ident => $to:ident, $value:expr, $v:ident => $body:expr) => {
        match $value {
            $from::Int8($v) => $to::Int8($body),
            $from::UInt8($v) => $to::UInt8($body),
            $from::Int16($v) => $to::Int16($body),
            $from::UInt16($v) => $to::UInt16($body),
            $from::Int32($v) => $to::Int32($body),
            $from::UInt32($v) => $to::UInt32($body),
            $from::Int64($v) => $to::Int64($body),
            $from::UInt64($v) => $to::UInt64($body),
            $from::Float32($v) => $to::Float32($body),
            $from::Float64($v) => $to::Float64($body),
            $from::Text($v) => $to::Text($body),
        }
    };
}

/// Zero-initialized storage for one native read.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Text(Vec<u8>),
}

impl TypedBuffer {
    /// Allocate `len` zeroed elements of `element`.
    pub fn zeroed(element: ElementType, len: usize) -> Self {
        match element {
            ElementType::Int8 => Self::Int8(vec![0; len]),
            ElementType::UInt8 => Self::UInt8(vec![0; len]),
            ElementType::Int16 => Self::Int16(vec![0; len]),
            ElementType::UInt16 => Self::UInt16(vec![0; len]),
            ElementType::Int32 => Self::Int32(vec![0; len]),
            ElementType::UInt32 => Self::UInt32(vec![0; len]),
            ElementType::Int64 => Self::Int64(vec![0; len]),
            ElementType::UInt64 => Self::UInt64(vec![0; len]),
            ElementType::Float32 => Self::Float32(vec![0.0; len]),
            ElementType::Float64 => Self::Float64(vec![0.0; len]),
            ElementType::Text => Self::Text(vec![0; len]),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int8(_) => ElementType::Int8,
            Self::UInt8(_) => ElementType::UInt8,
            Self::Int16(_) => ElementType::Int16,
            Self::UInt16(_) => ElementType::UInt16,
            Self::Int32(_) => ElementType::Int32,
            Self::UInt32(_) => ElementType::UInt32,
            Self::Int64(_) => ElementType::Int64,
            Self::UInt64(_) => ElementType::UInt64,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
            Self::Text(_) => ElementType::Text,
        }
    }

    pub fn len(&self) -> usize {
        for_each_variant!(Self, self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lend the storage to one native call as `kind` elements.
    pub fn raw(&mut self, kind: PointerKind) -> RawBuffer<'_> {
        debug_assert_eq!(kind.element_size(), self.element_type().size());
        let bytes: &mut [u8] =
            for_each_variant!(Self, self, v => bytemuck::cast_slice_mut(v.as_mut_slice()));
        RawBuffer::new(bytes, kind)
    }

    /// Reshape into an n-dimensional array (row-major).
    pub fn into_array(self, shape: &[usize]) -> Result<TypedArray> {
        let len = self.len();
        let shape_err = || ReadError::BufferShape {
            len,
            shape: shape.to_vec(),
        };
        let array = map_variant!(Self => TypedArray, self, v => {
            ArrayD::from_shape_vec(IxDyn(shape), v).map_err(|_| shape_err())?
        });
        Ok(array)
    }

    /// Present an attribute buffer: one element becomes a scalar, anything
    /// else stays a one-dimensional array of the same length.
    pub fn into_value(self) -> Result<AttrValue> {
        if self.len() == 1 {
            let scalar = match self {
                Self::Int8(v) => Scalar::Int8(v[0]),
                Self::UInt8(v) => Scalar::UInt8(v[0]),
                Self::Int16(v) => Scalar::Int16(v[0]),
                Self::UInt16(v) => Scalar::UInt16(v[0]),
                Self::Int32(v) => Scalar::Int32(v[0]),
                Self::UInt32(v) => Scalar::UInt32(v[0]),
                Self::Int64(v) => Scalar::Int64(v[0]),
                Self::UInt64(v) => Scalar::UInt64(v[0]),
                Self::Float32(v) => Scalar::Float32(v[0]),
                Self::Float64(v) => Scalar::Float64(v[0]),
                Self::Text(v) => return Ok(AttrValue::Text(decode_text(&v, v.len()))),
            };
            return Ok(AttrValue::Scalar(scalar));
        }
        let len = self.len();
        Ok(AttrValue::Array(self.into_array(&[len])?))
    }
}

/// Result of a field read: an n-dimensional array of the field's type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedArray {
    Int8(ArrayD<i8>),
    UInt8(ArrayD<u8>),
    Int16(ArrayD<i16>),
    UInt16(ArrayD<u16>),
    Int32(ArrayD<i32>),
    UInt32(ArrayD<u32>),
    Int64(ArrayD<i64>),
    UInt64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    /// Raw bytes of a character field.
    Text(ArrayD<u8>),
}

impl TypedArray {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int8(_) => ElementType::Int8,
            Self::UInt8(_) => ElementType::UInt8,
            Self::Int16(_) => ElementType::Int16,
            Self::UInt16(_) => ElementType::UInt16,
            Self::Int32(_) => ElementType::Int32,
            Self::UInt32(_) => ElementType::UInt32,
            Self::Int64(_) => ElementType::Int64,
            Self::UInt64(_) => ElementType::UInt64,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
            Self::Text(_) => ElementType::Text,
        }
    }

    pub fn shape(&self) -> &[usize] {
        for_each_variant!(Self, self, a => a.shape())
    }

    pub fn len(&self) -> usize {
        for_each_variant!(Self, self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy every element out as `f64`, in row-major order.
    ///
    /// 64-bit integers beyond 2^53 lose precision.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        for_each_variant!(Self, self, a => a.iter().map(|&x| x as f64).collect())
    }

    /// Convert to `f64` elements, keeping the shape.
    pub fn to_f64(&self) -> ArrayD<f64> {
        for_each_variant!(Self, self, a => a.mapv(|x| x as f64))
    }
}

/// A single attribute element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
}

impl Scalar {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int8(_) => ElementType::Int8,
            Self::UInt8(_) => ElementType::UInt8,
            Self::Int16(_) => ElementType::Int16,
            Self::UInt16(_) => ElementType::UInt16,
            Self::Int32(_) => ElementType::Int32,
            Self::UInt32(_) => ElementType::UInt32,
            Self::Int64(_) => ElementType::Int64,
            Self::UInt64(_) => ElementType::UInt64,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int8(x) => x as f64,
            Self::UInt8(x) => x as f64,
            Self::Int16(x) => x as f64,
            Self::UInt16(x) => x as f64,
            Self::Int32(x) => x as f64,
            Self::UInt32(x) => x as f64,
            Self::Int64(x) => x as f64,
            Self::UInt64(x) => x as f64,
            Self::Float32(x) => x as f64,
            Self::Float64(x) => x,
        }
    }
}

/// Value of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Single-element numeric attribute.
    Scalar(Scalar),
    /// Numeric attribute with zero or more than one element.
    Array(TypedArray),
    /// Character attribute.
    Text(String),
}

impl AttrValue {
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&TypedArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// The bytes of a NUL-terminated C string, at most `cap` bytes long.
pub(crate) fn c_string_prefix(bytes: &[u8], cap: usize) -> &[u8] {
    let window = &bytes[..bytes.len().min(cap)];
    match window.iter().position(|&b| b == 0) {
        Some(end) => &window[..end],
        None => window,
    }
}

/// Decode a NUL-terminated C string, at most `cap` bytes long.
pub(crate) fn decode_text(bytes: &[u8], cap: usize) -> String {
    String::from_utf8_lossy(c_string_prefix(bytes, cap)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{element_type_for, pointer_kind_for, SUPPORTED_TYPE_CODES};

    #[test]
    fn test_raw_view_covers_whole_buffer() {
        for code in SUPPORTED_TYPE_CODES {
            let element = element_type_for(code).unwrap();
            let kind = pointer_kind_for(code).unwrap();
            let mut buffer = TypedBuffer::zeroed(element, 6);
            let raw = buffer.raw(kind);
            assert_eq!(raw.len(), 6);
            assert_eq!(raw.byte_len(), 6 * element.size());
        }
    }

    #[test]
    fn test_native_writes_land_in_typed_storage() {
        let mut buffer = TypedBuffer::zeroed(ElementType::Float32, 3);
        {
            let mut raw = buffer.raw(PointerKind::Float);
            let bytes = raw.as_bytes_mut();
            for (i, value) in [1.5f32, -2.0, 42.25].iter().enumerate() {
                bytes[i * 4..(i + 1) * 4].copy_from_slice(&value.to_ne_bytes());
            }
        }
        assert_eq!(buffer, TypedBuffer::Float32(vec![1.5, -2.0, 42.25]));
    }

    #[test]
    fn test_staged_write_stays_inside_lent_region() {
        let mut backing = vec![0xAAu8; 12];
        let mut raw = RawBuffer::new(&mut backing[..4], PointerKind::Char);

        let status = raw.staged(16, |mut target| {
            let bytes = target.as_bytes_mut();
            assert!(bytes.len() >= 16);
            for (i, b) in bytes[..16].iter_mut().enumerate() {
                *b = i as u8;
            }
            0
        });

        assert_eq!(status, 0);
        assert_eq!(&backing[..4], &[0, 1, 2, 3]);
        assert!(backing[4..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_staged_write_uses_lent_region_when_large_enough() {
        let mut backing = [0u8; 8];
        let mut raw = RawBuffer::new(&mut backing, PointerKind::Char);
        let status = raw.staged(8, |mut target| {
            target.as_bytes_mut().copy_from_slice(b"abcdefgh");
            0
        });
        assert_eq!(status, 0);
        assert_eq!(&backing, b"abcdefgh");
    }

    #[test]
    fn test_failed_staged_write_leaves_buffer_untouched() {
        let mut backing = [7u8; 2];
        let mut raw = RawBuffer::new(&mut backing, PointerKind::Char);
        let status = raw.staged(10, |mut target| {
            target.as_bytes_mut().fill(1);
            -1
        });
        assert_eq!(status, -1);
        assert_eq!(backing, [7, 7]);
    }

    #[test]
    fn test_single_element_becomes_scalar() {
        let value = TypedBuffer::Int16(vec![-3]).into_value().unwrap();
        assert_eq!(value, AttrValue::Scalar(Scalar::Int16(-3)));
    }

    #[test]
    fn test_many_elements_stay_array() {
        let value = TypedBuffer::Float64(vec![1.0, 2.0]).into_value().unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.shape(), &[2]);
        assert_eq!(array.to_f64_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_into_array_rejects_wrong_shape() {
        let err = TypedBuffer::UInt8(vec![0; 5]).into_array(&[2, 3]).unwrap_err();
        assert_eq!(
            err,
            ReadError::BufferShape {
                len: 5,
                shape: vec![2, 3]
            }
        );
    }

    #[test]
    fn test_c_string_prefix() {
        assert_eq!(c_string_prefix(b"abc\0def", 100), b"abc");
        assert_eq!(c_string_prefix(b"abcdef", 4), b"abcd");
        assert_eq!(c_string_prefix(b"\0", 4), b"");
    }
}
