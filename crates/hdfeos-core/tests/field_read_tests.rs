//! Strided field reads against the in-memory backend.
//!
//! Field contents come from `test_utils::generators`, so every element read
//! can be checked against its source position.

use hdfeos_core::{
    attach, field_info, open, read_field, read_field_full, AccessMode, ElementType, EntityHandle,
    EntityKind, FileHandle, Generation, PointerKind, ReadError, TypedArray,
};
use ndarray::IxDyn;
use test_utils::{
    files, he2_library, he5_library, test_grid_value, StubEntity, StubField, StubFile,
    StubLibrary,
};

/// Helper to open a stub file and attach one entity.
fn attach_entity(
    lib: &StubLibrary,
    kind: EntityKind,
    path: &str,
    name: &str,
) -> (FileHandle, EntityHandle) {
    let file = open(lib, kind, path, AccessMode::ReadOnly).expect("Failed to open stub file");
    let entity = attach(lib, &file, name).expect("Failed to attach entity");
    (file, entity)
}

// =============================================================================
// Sub-rectangle reads
// =============================================================================

#[test]
fn test_read_2x3_block_of_5x5_field() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let array = read_field(&lib, &grid, "Pollution", &[1, 1], &[1, 1], &[2, 3])
        .expect("Failed to read field");

    assert_eq!(array.shape(), &[2, 3]);
    assert_eq!(array.element_type(), ElementType::Float32);
    let TypedArray::Float32(values) = array else {
        panic!("expected f32 array");
    };
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(
                values[IxDyn(&[i, j])],
                test_grid_value(1 + i, 1 + j),
                "Mismatch at ({}, {})",
                i,
                j
            );
        }
    }
}

#[test]
fn test_strided_read_skips_rows_and_columns() {
    let lib = he5_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE");

    let array = read_field(&lib, &swath, "Temperature", &[0, 1], &[3, 2], &[4, 2])
        .expect("Failed to read field");

    assert_eq!(array.shape(), &[4, 2]);
    let expected: Vec<f64> = [0, 3, 6, 9]
        .iter()
        .flat_map(|&row| [1, 3].map(|col| test_grid_value(row, col) as f64))
        .collect();
    assert_eq!(array.to_f64_vec(), expected);
}

#[test]
fn test_three_dimensional_read() {
    let lib = he2_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SWATH219, "Swath1");

    let array = read_field(
        &lib,
        &swath,
        "Temperature_3D",
        &[2, 5, 1],
        &[4, 5, 3],
        &[3, 2, 3],
    )
    .expect("Failed to read field");

    assert_eq!(array.shape(), &[3, 2, 3]);
    let TypedArray::Float64(values) = array else {
        panic!("expected f64 array");
    };
    // Cube values encode band * 10000 + row * 100 + col
    assert_eq!(values[IxDyn(&[0, 0, 0])], 20501.0);
    assert_eq!(values[IxDyn(&[2, 1, 2])], 101007.0);
    assert_eq!(values[IxDyn(&[1, 0, 1])], 60504.0);
}

#[test]
fn test_element_type_follows_number_type() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let array = read_field(&lib, &grid, "Vegetation", &[4, 0], &[1, 1], &[1, 5])
        .expect("Failed to read field");

    assert_eq!(array.element_type(), ElementType::UInt8);
    assert_eq!(array.to_f64_vec(), vec![20.0, 21.0, 22.0, 23.0, 24.0]);
    assert_eq!(lib.pointer_kinds(), vec![PointerKind::UnsignedChar]);
}

#[test]
fn test_single_element_read_keeps_rank() {
    let lib = he5_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE");

    let array = read_field(&lib, &swath, "Conduction", &[9, 3], &[1, 1], &[1, 1])
        .expect("Failed to read field");

    assert_eq!(array.shape(), &[1, 1]);
    assert_eq!(array.element_type(), ElementType::Int32);
    assert_eq!(array.to_f64_vec(), vec![3009.0]);
}

// =============================================================================
// Full reads
// =============================================================================

#[test]
fn test_full_read_of_zonal_average_field() {
    let lib = he5_library();
    let (_file, za) = attach_entity(&lib, EntityKind::ZonalAverage, files::ZA, "ZA1");

    let array = read_field_full(&lib, &za, "Spectra").expect("Failed to read field");

    assert_eq!(array.shape(), &[3, 4]);
    assert_eq!(array.element_type(), ElementType::Float64);
    assert_eq!(array.to_f64()[IxDyn(&[2, 3])], 203.0);
}

#[test]
fn test_full_read_of_empty_unlimited_field() {
    let lib = he5_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE");

    let array = read_field_full(&lib, &swath, "Count").expect("Failed to read field");

    assert!(array.is_empty());
    assert_eq!(array.shape(), &[0]);
    assert_eq!(array.element_type(), ElementType::Int16);
    assert_eq!(lib.calls("read_field"), 0);
}

// =============================================================================
// Field introspection
// =============================================================================

#[test]
fn test_field_info_hdfeos5_reports_max_dimensions() {
    let lib = he5_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE");

    let info = field_info(&lib, &swath, "Temperature").expect("Failed to get field info");

    assert_eq!(info.rank, 2);
    assert_eq!(info.shape, vec![10, 4]);
    assert_eq!(info.element_type(), Ok(ElementType::Float32));
    assert_eq!(info.dimensions, vec!["DataTrack", "DataXtrack"]);
    assert_eq!(
        info.max_dimensions,
        Some(vec!["DataTrack".to_string(), "DataXtrack".to_string()])
    );
    assert_eq!(info.len(), 40);
}

#[test]
fn test_field_info_hdfeos2_has_no_max_dimensions() {
    let lib = he2_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SWATH219, "Swath1");

    let info = field_info(&lib, &swath, "Spectra").expect("Failed to get field info");

    assert_eq!(info.shape, vec![15, 40, 20]);
    assert_eq!(info.dimensions, vec!["Bands", "Res2tr", "Res2xtr"]);
    assert_eq!(info.max_dimensions, None);
}

#[test]
fn test_field_info_reads_unlimited_max_dimension() {
    let lib = StubLibrary::new(Generation::Hdfeos5).with_file(
        StubFile::new("unlim.h5").entity(
            StubEntity::swath("S")
                .dim("Track", 3)
                .dim("Unlim", 0)
                .field(
                    StubField::data("Scan", &["Track"], &[3], &[1u32, 2, 3])
                        .with_max_dims(&["Unlim"]),
                ),
        ),
    );
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, "unlim.h5", "S");

    let info = field_info(&lib, &swath, "Scan").expect("Failed to get field info");

    assert_eq!(info.max_dimensions, Some(vec!["Unlim".to_string()]));
}

#[test]
fn test_field_info_survives_under_reported_dimension_size() {
    let lib = he5_library().under_report_dim_size();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE");

    let info = field_info(&lib, &swath, "Conduction").expect("Failed to get field info");

    assert_eq!(info.dimensions, vec!["DataTrack", "DataXtrack"]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_rank_mismatch_fails_before_read() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let err = read_field(&lib, &grid, "Pollution", &[0, 0, 0], &[1, 1, 1], &[1, 1, 1])
        .unwrap_err();

    assert_eq!(
        err,
        ReadError::ShapeMismatch {
            rank: 2,
            start: 3,
            stride: 3,
            edge: 3
        }
    );
    assert_eq!(lib.calls("read_field"), 0);
}

#[test]
fn test_inconsistent_selection_makes_no_native_call() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");
    lib.reset_calls();

    let err = read_field(&lib, &grid, "Pollution", &[0], &[1, 1], &[2, 2]).unwrap_err();

    assert!(matches!(err, ReadError::ShapeMismatch { start: 1, .. }));
    assert_eq!(lib.total_calls(), 0);
}

#[test]
fn test_zero_edge_is_rejected() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let err = read_field(&lib, &grid, "Pollution", &[0, 0], &[1, 1], &[0, 2]).unwrap_err();

    assert!(matches!(err, ReadError::InvalidSelection { dim: 0, .. }));
    assert_eq!(lib.calls("read_field"), 0);
}

#[test]
fn test_out_of_bounds_selection_is_native_failure() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let err = read_field(&lib, &grid, "Pollution", &[4, 0], &[1, 1], &[2, 5]).unwrap_err();

    assert_eq!(
        err,
        ReadError::NativeCallFailed {
            status: -1,
            operation: "read_field"
        }
    );
}

#[test]
fn test_unknown_field_fails_in_field_info() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let err = read_field(&lib, &grid, "Ozone", &[0, 0], &[1, 1], &[1, 1]).unwrap_err();

    assert_eq!(
        err,
        ReadError::NativeCallFailed {
            status: -1,
            operation: "field_info"
        }
    );
    assert_eq!(lib.calls("read_field"), 0);
}

#[test]
fn test_unsupported_field_type_is_not_read() {
    let lib = StubLibrary::new(Generation::Hdfeos5).with_file(
        StubFile::new("odd.h5").entity(
            StubEntity::grid("G")
                .dim("X", 2)
                .field(StubField::data("Packed", &["X"], &[2], &[0u16, 1]).with_number_type(99)),
        ),
    );
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, "odd.h5", "G");

    let err = read_field(&lib, &grid, "Packed", &[0], &[1], &[2]).unwrap_err();

    assert_eq!(err, ReadError::UnsupportedTypeCode { code: 99 });
    assert_eq!(lib.calls("read_field"), 0);
}

#[test]
fn test_read_failure_status_is_preserved() {
    let lib = he5_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE");
    lib.fail_on("read_field", -42);

    let err = read_field(&lib, &swath, "Temperature", &[0, 0], &[1, 1], &[1, 1]).unwrap_err();

    assert_eq!(err.native_status(), Some(-42));
}

#[test]
fn test_geo_field_read_through_same_path() {
    let lib = he5_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE");

    let info = field_info(&lib, &swath, "Time").expect("Failed to get field info");
    let array = read_field(&lib, &swath, "Time", &[1], &[2], &[2]).expect("Failed to read field");

    assert_eq!(info.element_type(), Ok(ElementType::Float64));
    assert_eq!(array.to_f64_vec(), vec![46353401.0, 46353403.0]);
}
