//! Open/attach/detach/close against the in-memory backend.

use hdfeos_core::{attach, close, detach, open, AccessMode, EntityKind, Generation, ReadError};
use test_utils::{files, he2_library, he5_library};

#[test]
fn test_full_lifecycle_releases_everything() {
    let lib = he5_library();

    let file = open(&lib, EntityKind::Swath, files::SIMPLE_SWATH, AccessMode::ReadOnly)
        .expect("Failed to open");
    let index = attach(&lib, &file, "INDEX").expect("Failed to attach INDEX");
    let simple = attach(&lib, &file, "SIMPLE").expect("Failed to attach SIMPLE");
    assert_ne!(index.id(), simple.id());
    assert_eq!(index.kind(), EntityKind::Swath);
    assert_eq!(lib.attached_count(), 2);

    detach(&lib, index).expect("Failed to detach");
    detach(&lib, simple).expect("Failed to detach");
    close(&lib, file).expect("Failed to close");

    assert_eq!(lib.attached_count(), 0);
    assert_eq!(lib.open_file_count(), 0);
}

#[test]
fn test_open_missing_file_fails() {
    let lib = he5_library();

    let err = open(&lib, EntityKind::Grid, files::MISSING, AccessMode::ReadOnly).unwrap_err();

    assert_eq!(
        err,
        ReadError::NativeCallFailed {
            status: -1,
            operation: "open"
        }
    );
}

#[test]
fn test_attach_unknown_entity_fails() {
    let lib = he5_library();
    let file = open(&lib, EntityKind::Grid, files::GRID, AccessMode::ReadOnly)
        .expect("Failed to open");

    let err = attach(&lib, &file, "NoSuchGrid").unwrap_err();

    assert_eq!(err.native_status(), Some(-1));
}

#[test]
fn test_attach_is_scoped_to_kind() {
    let lib = he5_library();
    let file = open(&lib, EntityKind::Grid, files::SIMPLE_SWATH, AccessMode::ReadOnly)
        .expect("Failed to open");

    // SIMPLE is a swath, not a grid
    assert!(attach(&lib, &file, "SIMPLE").is_err());
}

#[test]
fn test_close_failure_status_is_preserved() {
    let lib = he5_library();
    let file = open(&lib, EntityKind::ZonalAverage, files::ZA, AccessMode::ReadWrite)
        .expect("Failed to open");
    lib.fail_on("close", -5);

    let err = close(&lib, file).unwrap_err();

    assert_eq!(err.native_status(), Some(-5));
}

#[test]
fn test_hdfeos2_cannot_open_zonal_average() {
    let lib = he2_library();

    let err = open(&lib, EntityKind::ZonalAverage, files::SWATH219, AccessMode::ReadOnly)
        .unwrap_err();

    assert_eq!(
        err,
        ReadError::Unsupported {
            operation: "open",
            generation: Generation::Hdfeos2
        }
    );
    assert_eq!(lib.calls("open"), 0);
}

#[test]
fn test_name_with_nul_is_rejected_before_native_call() {
    let lib = he5_library();
    let file = open(&lib, EntityKind::Grid, files::GRID, AccessMode::ReadOnly)
        .expect("Failed to open");

    let err = attach(&lib, &file, "UTM\0Grid").unwrap_err();

    assert!(matches!(err, ReadError::InvalidName(_)));
    assert_eq!(lib.calls("attach"), 0);
}
