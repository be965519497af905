//! Native status normalization.
//!
//! Every HDF-EOS entry point returns either a new id, a count, or a status
//! code, and all of them signal failure the same way: a negative value.

use tracing::debug;

use crate::error::{ReadError, Result};

/// Status value the native libraries use for failure.
pub const FAIL: i64 = -1;

/// Normalize a native return value.
///
/// Non-negative values (ids, counts, `SUCCEED`) pass through unchanged;
/// negative values become [`ReadError::NativeCallFailed`] carrying the
/// original status and the name of the logical operation.
pub fn check(status: i64, operation: &'static str) -> Result<i64> {
    if status < 0 {
        debug!(operation, status, "native call failed");
        return Err(ReadError::native(status, operation));
    }
    Ok(status)
}

/// Same as [`check`] for values that must fit in a `usize` (counts, sizes).
pub(crate) fn check_count(status: i64, operation: &'static str) -> Result<usize> {
    let value = check(status, operation)?;
    usize::try_from(value).map_err(|_| ReadError::native(status, operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_passes_through() {
        assert_eq!(check(0, "GDclose"), Ok(0));
        assert_eq!(check(524288, "GDopen"), Ok(524288));
    }

    #[test]
    fn test_negative_status_preserved() {
        let err = check(-7, "GDreadfield").unwrap_err();
        assert_eq!(
            err,
            ReadError::NativeCallFailed {
                status: -7,
                operation: "GDreadfield"
            }
        );
        assert_eq!(err.native_status(), Some(-7));
    }

    #[test]
    fn test_check_count() {
        assert_eq!(check_count(3, "nentries"), Ok(3));
        assert!(check_count(FAIL, "nentries").is_err());
    }
}
