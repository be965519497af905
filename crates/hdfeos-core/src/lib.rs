//! Metadata introspection and typed buffer marshalling for HDF-EOS files.
//!
//! This crate sits between callers and the native HDF-EOS libraries (the
//! HDF4-based HDF-EOS2 and the HDF5-based HDF-EOS5). The native APIs share a
//! calling style: list-producing calls are made twice (once to learn the
//! buffer size, once to fill it), element types are reported as integer
//! codes, and outputs are written through caller-supplied pointers. This
//! crate implements that style once for every entity kind and both
//! generations:
//!
//! - [`status`]: negative native return values become [`ReadError`]s
//! - [`types`]: number type codes map to element types and pointer kinds
//! - [`list`]: the two-call name list protocol
//! - [`attribute`]: typed attribute reads with scalar presentation
//! - [`field`]: field introspection and strided reads into shaped arrays
//! - [`handle`]: open/attach/detach/close
//!
//! The native libraries themselves are reached through the [`NativeApi`]
//! trait; `hdfeos-native` implements it over the shared libraries.
//!
//! # Architecture
//!
//! ```text
//! open(path) ──► FileHandle ──► attach(name) ──► EntityHandle
//!                    │                               │
//!                    ▼                               ├─► inquire_dimensions / inquire_fields
//!              list_entities                         ├─► list_attributes / read_attribute
//!                                                    └─► field_info / read_field
//!                                                              │
//!                                      NativeApi ◄─────────────┘
//!                                    (status → check())
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hdfeos_core::{
//!     attach, open, read_attribute, read_field, AccessMode, AttrLocation, EntityKind,
//! };
//!
//! let file = open(&lib, EntityKind::Swath, "SimpleSwath.h5", AccessMode::ReadOnly)?;
//! let swath = attach(&lib, &file, "SIMPLE")?;
//! let temperature = read_field(&lib, &swath, "Temperature", &[0, 0], &[1, 1], &[2, 3])?;
//! let units = read_attribute(&lib, &swath, AttrLocation::Field("Temperature"), "Units")?;
//! ```

pub mod api;
pub mod attribute;
pub mod buffer;
pub mod error;
pub mod field;
pub mod grid;
pub mod handle;
pub mod inquire;
pub mod list;
pub mod status;
pub mod types;

// Re-export commonly used types at crate root
pub use api::{
    AccessMode, AttrScope, EntityKind, EntryCode, FieldClass, FieldInfoBuffers, Generation,
    GridInfo, NativeApi, ProjectionInfo, MAX_RANK, PROJ_PARAM_COUNT,
};
pub use attribute::{
    attribute_info, read_attribute, read_attributes, AttrDescriptor, AttrLocation,
    TEXT_ATTR_CAPACITY,
};
pub use buffer::{AttrValue, RawBuffer, Scalar, TypedArray, TypedBuffer};
pub use error::{ReadError, Result};
pub use field::{field_info, read_field, read_field_full, FieldDescriptor};
pub use grid::{
    grid_info, origin_info, pixel_registration_info, projection_info, Origin, PixelRegistration,
};
pub use handle::{attach, close, detach, open, EntityHandle, FileHandle};
pub use inquire::{
    inquire_dimensions, inquire_fields, inquire_maps, Dimension, DimensionMap, FieldSummary,
};
pub use list::{
    fetch_list, list_attributes, list_entities, negotiate_entries, split_list, Negotiated,
    DIM_LIST_FLOOR,
};
pub use status::check;
pub use types::{element_type_for, pointer_kind_for, ElementType, PointerKind, TEXT_TYPE_CODE};
