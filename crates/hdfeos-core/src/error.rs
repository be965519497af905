//! Error types for HDF-EOS reads.

use thiserror::Error;

use crate::api::{EntityKind, Generation};

/// Result type for HDF-EOS read operations.
pub type Result<T> = std::result::Result<T, ReadError>;

/// Errors that can occur while introspecting or reading an HDF-EOS file.
///
/// Every variant is terminal for the operation that produced it: nothing is
/// retried and nothing is replaced by a default value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// A native entry point returned a negative status.
    #[error("native call {operation} failed with status {status}")]
    NativeCallFailed {
        status: i64,
        operation: &'static str,
    },

    /// The native layer reported a number type this layer does not map.
    #[error("unsupported native number type code {code}")]
    UnsupportedTypeCode { code: i32 },

    /// The start/stride/edge vectors do not match the field rank.
    #[error(
        "selection does not match field rank {rank}: start has {start}, stride has {stride}, edge has {edge} entries"
    )]
    ShapeMismatch {
        rank: usize,
        start: usize,
        stride: usize,
        edge: usize,
    },

    /// A selection vector holds a value the native layer cannot accept.
    #[error("invalid selection in dimension {dim}: {reason}")]
    InvalidSelection { dim: usize, reason: &'static str },

    /// A name could not be converted to a C string.
    #[error("name {0:?} contains an interior NUL byte")]
    InvalidName(String),

    /// The backend has no entry point for the requested operation.
    #[error("{operation} is not available in the {generation} backend")]
    Unsupported {
        operation: &'static str,
        generation: Generation,
    },

    /// A read buffer cannot be presented with the requested shape.
    #[error("buffer of {len} elements cannot be shaped as {shape:?}")]
    BufferShape { len: usize, shape: Vec<usize> },

    /// The operation does not apply to this kind of entity.
    #[error("{operation} applies to {expected} entities, not {actual}")]
    WrongKind {
        operation: &'static str,
        expected: EntityKind,
        actual: EntityKind,
    },

    /// The native layer reported more dimensions than a field may have.
    #[error("field rank {rank} exceeds the supported maximum")]
    RankTooLarge { rank: i64 },
}

impl ReadError {
    /// Create a NativeCallFailed error.
    pub fn native(status: i64, operation: &'static str) -> Self {
        Self::NativeCallFailed { status, operation }
    }

    /// Create an Unsupported error.
    pub fn unsupported(operation: &'static str, generation: Generation) -> Self {
        Self::Unsupported {
            operation,
            generation,
        }
    }

    /// The native status carried by this error, if it came from a native call.
    pub fn native_status(&self) -> Option<i64> {
        match self {
            Self::NativeCallFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::ffi::NulError> for ReadError {
    fn from(err: std::ffi::NulError) -> Self {
        Self::InvalidName(String::from_utf8_lossy(&err.into_vec()).into_owned())
    }
}
