//! Attribute listing and typed attribute reads.

use hdfeos_core::{
    attach, attribute_info, list_attributes, open, read_attribute, read_attributes, AccessMode,
    AttrLocation, AttrValue, ElementType, EntityHandle, EntityKind, FileHandle, Generation,
    PointerKind, ReadError, Scalar, TEXT_ATTR_CAPACITY,
};
use test_utils::{
    create_long_text, files, he2_library, he5_library, StubAttr, StubEntity, StubFile,
    StubLibrary, LONG_TEXT_LEN,
};

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

fn simple_swath(lib: &StubLibrary) -> (FileHandle, EntityHandle) {
    attach_entity(lib, EntityKind::Swath, files::SIMPLE_SWATH, "SIMPLE")
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_entity_attributes_in_order() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let names = list_attributes(&lib, &swath, AttrLocation::Entity).expect("Failed to list");

    assert_eq!(names, vec!["History", "ScaleFactor", "Description"]);
    assert_eq!(lib.calls("inquire_attrs"), 2);
}

#[test]
fn test_empty_attribute_list_makes_one_call() {
    let lib = he5_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SIMPLE_SWATH, "INDEX");

    let names = list_attributes(&lib, &swath, AttrLocation::Entity).expect("Failed to list");

    assert!(names.is_empty());
    assert_eq!(lib.calls("inquire_attrs"), 1);
}

#[test]
fn test_list_local_attributes() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let names = list_attributes(&lib, &swath, AttrLocation::Field("Temperature"))
        .expect("Failed to list");

    assert_eq!(names, vec!["Units", "_FillValue"]);
}

#[test]
fn test_list_failure_propagates_status() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);
    lib.fail_on("inquire_attrs", -3);

    let err = list_attributes(&lib, &swath, AttrLocation::Entity).unwrap_err();

    assert_eq!(
        err,
        ReadError::NativeCallFailed {
            status: -3,
            operation: "inquire_attrs"
        }
    );
}

// =============================================================================
// Scalar and array presentation
// =============================================================================

#[test]
fn test_single_element_attribute_is_scalar() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let value = read_attribute(&lib, &swath, AttrLocation::Entity, "ScaleFactor")
        .expect("Failed to read attribute");

    assert_eq!(value, AttrValue::Scalar(Scalar::Float64(0.01)));
    assert_eq!(lib.pointer_kinds(), vec![PointerKind::Double]);
}

#[test]
fn test_multi_element_attribute_is_array() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let value = read_attribute(&lib, &swath, AttrLocation::Group, "ValidRange")
        .expect("Failed to read attribute");

    let array = value.as_array().expect("expected array");
    assert_eq!(array.shape(), &[2]);
    assert_eq!(array.element_type(), ElementType::Float32);
    assert_eq!(array.to_f64_vec(), vec![-100.0, 100.0]);
}

#[test]
fn test_local_scalar_attribute() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let value = read_attribute(&lib, &swath, AttrLocation::Field("Temperature"), "_FillValue")
        .expect("Failed to read attribute");

    assert_eq!(value.as_scalar(), Some(Scalar::Float32(-9999.0)));
}

#[test]
fn test_zonal_average_attributes() {
    let lib = he5_library();
    let (_file, za) = attach_entity(&lib, EntityKind::ZonalAverage, files::ZA, "ZA1");

    let version = read_attribute(&lib, &za, AttrLocation::Entity, "Version")
        .expect("Failed to read attribute");
    let source = read_attribute(&lib, &za, AttrLocation::Group, "Source")
        .expect("Failed to read attribute");

    assert_eq!(version, AttrValue::Scalar(Scalar::UInt16(5)));
    assert_eq!(source.as_text(), Some("synthetic"));
}

#[test]
fn test_attribute_descriptor() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let info = attribute_info(&lib, &grid, AttrLocation::Entity, "Drift")
        .expect("Failed to get attribute info");

    assert_eq!(info.count, 1);
    assert_eq!(info.element_type(), Ok(ElementType::Int32));
}

// =============================================================================
// Character attributes
// =============================================================================

#[test]
fn test_text_attribute() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let value = read_attribute(&lib, &swath, AttrLocation::Entity, "History")
        .expect("Failed to read attribute");

    assert_eq!(value, AttrValue::Text("created for tests".to_string()));
    assert_eq!(lib.pointer_kinds(), vec![PointerKind::Char]);
}

#[test]
fn test_long_text_attribute_is_truncated() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let value = read_attribute(&lib, &swath, AttrLocation::Entity, "Description")
        .expect("Failed to read attribute");

    let text = value.as_text().expect("expected text");
    assert_eq!(text.len(), TEXT_ATTR_CAPACITY);
    assert_eq!(text, &create_long_text(LONG_TEXT_LEN)[..TEXT_ATTR_CAPACITY]);
}

#[test]
fn test_oversized_text_attribute_stays_in_lent_buffer() {
    // The stub writes the whole attribute like the native libraries do and
    // panics if that overruns the region it was given.
    let long = create_long_text(4096);
    let lib = StubLibrary::new(Generation::Hdfeos5).with_file(
        StubFile::new("long.h5")
            .entity(StubEntity::swath("S").attr(StubAttr::text("Notes", &long))),
    );
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, "long.h5", "S");

    let info = attribute_info(&lib, &swath, AttrLocation::Entity, "Notes")
        .expect("Failed to get attribute info");
    assert_eq!(info.native_byte_len(), Some(4097));

    let value = read_attribute(&lib, &swath, AttrLocation::Entity, "Notes")
        .expect("Failed to read attribute");
    assert_eq!(value.as_text(), Some(&long[..TEXT_ATTR_CAPACITY]));
}

#[test]
fn test_text_attribute_ignores_reported_count() {
    // Some writers report a count of 1 for character attributes.
    let lib = StubLibrary::new(Generation::Hdfeos5).with_file(
        StubFile::new("text.h5").entity(StubEntity::grid("G").attr(StubAttr::raw(
            "Title",
            57,
            1,
            b"Level 3 product".to_vec(),
        ))),
    );
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, "text.h5", "G");

    let value = read_attribute(&lib, &grid, AttrLocation::Entity, "Title")
        .expect("Failed to read attribute");

    assert_eq!(value.as_text(), Some("Level 3 product"));
}

#[test]
fn test_geo_group_text_attribute() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let value = read_attribute(&lib, &swath, AttrLocation::GeoGroup, "GeoUnits")
        .expect("Failed to read attribute");

    assert_eq!(value.as_text(), Some("degrees"));
}

// =============================================================================
// Bulk reads
// =============================================================================

#[test]
fn test_read_all_attributes() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");

    let attrs = read_attributes(&lib, &grid, AttrLocation::Field("Pollution"))
        .expect("Failed to read attributes");

    assert_eq!(attrs, vec![("Units".to_string(), AttrValue::Text("ppm".to_string()))]);
}

#[test]
fn test_hdfeos2_entity_attributes() {
    let lib = he2_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SWATH219, "Swath1");

    let attrs = read_attributes(&lib, &swath, AttrLocation::Entity)
        .expect("Failed to read attributes");

    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs[0].1.as_text(), Some("HDF-EOS2 sample"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unsupported_type_code_is_not_read() {
    let lib = StubLibrary::new(Generation::Hdfeos5).with_file(
        StubFile::new("odd.h5")
            .entity(StubEntity::grid("G").attr(StubAttr::raw("Odd", 99, 1, vec![0; 4]))),
    );
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, "odd.h5", "G");

    let err = read_attribute(&lib, &grid, AttrLocation::Entity, "Odd").unwrap_err();

    assert_eq!(err, ReadError::UnsupportedTypeCode { code: 99 });
    assert_eq!(lib.calls("read_attr"), 0);
}

#[test]
fn test_attr_info_failure_skips_read() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);
    lib.fail_on("attr_info", -1);

    let err = read_attribute(&lib, &swath, AttrLocation::Entity, "History").unwrap_err();

    assert_eq!(
        err,
        ReadError::NativeCallFailed {
            status: -1,
            operation: "attr_info"
        }
    );
    assert_eq!(lib.calls("read_attr"), 0);
}

#[test]
fn test_missing_attribute_is_native_failure() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let err = read_attribute(&lib, &swath, AttrLocation::Entity, "Nope").unwrap_err();

    assert_eq!(err.native_status(), Some(-1));
}

#[test]
fn test_hdfeos2_group_scopes_are_unsupported() {
    let lib = he2_library();
    let (_file, swath) = attach_entity(&lib, EntityKind::Swath, files::SWATH219, "Swath1");
    lib.reset_calls();

    for location in [
        AttrLocation::Group,
        AttrLocation::GeoGroup,
        AttrLocation::Field("Temperature"),
    ] {
        let err = list_attributes(&lib, &swath, location).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Unsupported {
                generation: Generation::Hdfeos2,
                ..
            }
        ));
        let err = read_attribute(&lib, &swath, location, "Units").unwrap_err();
        assert!(matches!(err, ReadError::Unsupported { .. }));
    }
    assert_eq!(lib.total_calls(), 0);
}

#[test]
fn test_grid_group_attributes_are_unsupported() {
    let lib = he5_library();
    let (_file, grid) = attach_entity(&lib, EntityKind::Grid, files::GRID, "UTMGrid");
    lib.reset_calls();

    let err = list_attributes(&lib, &grid, AttrLocation::Group).unwrap_err();

    assert!(matches!(err, ReadError::Unsupported { .. }));
    assert_eq!(lib.total_calls(), 0);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_attribute_values_serialize_untagged() {
    let lib = he5_library();
    let (_file, swath) = simple_swath(&lib);

    let attrs = read_attributes(&lib, &swath, AttrLocation::Entity)
        .expect("Failed to read attributes");
    let json = serde_json::to_value(&attrs[..2]).expect("Failed to serialize");

    assert_eq!(
        json,
        serde_json::json!([["History", "created for tests"], ["ScaleFactor", 0.01]])
    );
}
