//! The native call boundary.
//!
//! [`NativeApi`] has one method per logical HDF-EOS entry point. Methods take
//! the entity kind (grid, swath, za) instead of existing once per kind, and
//! return the raw native status as `i64` without interpreting it; status
//! normalization, buffer sizing and type dispatch live in the rest of this
//! crate and are shared by every backend.
//!
//! Output buffers are borrowed for the duration of one method call only.

use std::ffi::CStr;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::RawBuffer;

/// Maximum rank of a field. Field introspection hands the native layer a
/// dimension array of this length.
pub const MAX_RANK: usize = 8;

/// Number of GCTP projection parameters.
pub const PROJ_PARAM_COUNT: usize = 13;

/// HDF-EOS format generation a backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// HDF4-based HDF-EOS2 (`GD*`, `SW*` entry points).
    Hdfeos2,
    /// HDF5-based HDF-EOS5 (`HE5_GD*`, `HE5_SW*`, `HE5_ZA*` entry points).
    Hdfeos5,
}

impl Generation {
    /// Whether this generation has entities of the given kind.
    pub fn supports_kind(self, kind: EntityKind) -> bool {
        match self {
            Self::Hdfeos2 => kind != EntityKind::ZonalAverage,
            Self::Hdfeos5 => true,
        }
    }

    /// Whether this generation can list and read attributes in `scope` for
    /// entities of `kind`.
    pub fn supports_scope(self, kind: EntityKind, scope: AttrScope<'_>) -> bool {
        match (self, scope) {
            (_, AttrScope::Entity) => self.supports_kind(kind),
            (Self::Hdfeos2, _) => false,
            (Self::Hdfeos5, AttrScope::Group) => kind != EntityKind::Grid,
            (Self::Hdfeos5, AttrScope::GeoGroup) => kind == EntityKind::Swath,
            (Self::Hdfeos5, AttrScope::Local(_)) => true,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hdfeos2 => f.write_str("HDF-EOS2"),
            Self::Hdfeos5 => f.write_str("HDF-EOS5"),
        }
    }
}

/// Kind of structure inside an HDF-EOS file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Grid,
    Swath,
    #[serde(rename = "za")]
    ZonalAverage,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Grid, Self::Swath, Self::ZonalAverage];

    /// Native API prefix ("GD", "SW", "ZA").
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Grid => "GD",
            Self::Swath => "SW",
            Self::ZonalAverage => "ZA",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grid" | "gd" => Some(Self::Grid),
            "swath" | "sw" => Some(Self::Swath),
            "za" | "zonal" | "zonal_average" => Some(Self::ZonalAverage),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid => f.write_str("grid"),
            Self::Swath => f.write_str("swath"),
            Self::ZonalAverage => f.write_str("za"),
        }
    }
}

/// File access mode. Each backend maps it to its native constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    #[default]
    ReadOnly,
    ReadWrite,
}

/// Entry codes accepted by the `*nentries` entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryCode {
    Dimensions,
    DimensionMaps,
    IndexedMaps,
    GeoFields,
    DataFields,
}

impl EntryCode {
    /// Native value (`HDFE_NENTDIM` .. `HDFE_NENTDFLD`, same in both
    /// generations).
    pub fn code(self) -> i32 {
        match self {
            Self::Dimensions => 0,
            Self::DimensionMaps => 1,
            Self::IndexedMaps => 2,
            Self::GeoFields => 3,
            Self::DataFields => 4,
        }
    }
}

/// Which fields of an entity to inquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldClass {
    /// Swath geolocation fields.
    Geo,
    /// Data fields (the only class grids and zonal averages have).
    Data,
}

impl FieldClass {
    pub fn entry_code(self) -> EntryCode {
        match self {
            Self::Geo => EntryCode::GeoFields,
            Self::Data => EntryCode::DataFields,
        }
    }
}

/// Where an attribute lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrScope<'a> {
    /// Attached to the grid/swath/za itself.
    Entity,
    /// Data field group (HDF-EOS5 swath and za).
    Group,
    /// Geolocation field group (HDF-EOS5 swath).
    GeoGroup,
    /// Local to one field (HDF-EOS5).
    Local(&'a CStr),
}

impl AttrScope<'_> {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Group => "group",
            Self::GeoGroup => "geo group",
            Self::Local(_) => "local",
        }
    }
}

/// Output parameters of a field info call.
pub struct FieldInfoBuffers<'a> {
    pub rank: &'a mut i32,
    /// Extent of each dimension; `MAX_RANK` entries.
    pub dims: &'a mut [u64],
    pub number_type: &'a mut i32,
    /// Comma-delimited dimension names.
    pub dim_list: &'a mut [u8],
    /// Comma-delimited maximum dimension names (HDF-EOS5 only).
    pub max_dim_list: Option<&'a mut [u8]>,
}

/// Output parameters of a grid info call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridInfo {
    pub xdim: i64,
    pub ydim: i64,
    /// Upper left corner, meters (degrees packed as DMS for geographic).
    pub upper_left: [f64; 2],
    /// Lower right corner.
    pub lower_right: [f64; 2],
}

/// Output parameters of a projection info call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionInfo {
    /// GCTP projection code.
    pub proj_code: i32,
    /// GCTP zone code (UTM).
    pub zone_code: i32,
    /// GCTP spheroid code.
    pub sphere_code: i32,
    pub params: [f64; PROJ_PARAM_COUNT],
}

/// Raw HDF-EOS entry points.
///
/// Every method returns the native status or id unchanged. A method is
/// only invoked for kinds and scopes its [`Generation`] supports; backends
/// return a negative status if called otherwise.
pub trait NativeApi {
    /// The format generation this backend implements.
    fn generation(&self) -> Generation;

    /// `*open`: returns a file id.
    fn open(&self, kind: EntityKind, path: &CStr, access: AccessMode) -> i64;

    /// `*close`.
    fn close(&self, kind: EntityKind, file_id: i64) -> i64;

    /// `*attach`: returns an entity id.
    fn attach(&self, kind: EntityKind, file_id: i64, name: &CStr) -> i64;

    /// `*detach`.
    fn detach(&self, kind: EntityKind, entity_id: i64) -> i64;

    /// `*inqgrid` / `*inqswath` / `*inqza`: returns the entity count and
    /// stores the list length in `size`. With `list == None` only the
    /// negotiation half runs.
    fn inquire_entities(
        &self,
        kind: EntityKind,
        path: &CStr,
        list: Option<&mut [u8]>,
        size: &mut i64,
    ) -> i64;

    /// `*nentries`: returns the entry count and stores the list length.
    fn nentries(&self, kind: EntityKind, entity_id: i64, entry: EntryCode, size: &mut i64)
        -> i64;

    /// `*inqdims`: fills the dimension names and one length per dimension.
    fn inquire_dims(&self, kind: EntityKind, entity_id: i64, list: &mut [u8], lengths: &mut [u64])
        -> i64;

    /// `*inqfields` / `SWinqgeofields` / `SWinqdatafields` / `ZAinquire`.
    fn inquire_fields(
        &self,
        kind: EntityKind,
        entity_id: i64,
        class: FieldClass,
        list: &mut [u8],
        ranks: &mut [i32],
        number_types: &mut [i32],
    ) -> i64;

    /// `SWinqmaps`: fills `geo/data` map pairs with offsets and increments.
    fn inquire_maps(
        &self,
        entity_id: i64,
        list: &mut [u8],
        offsets: &mut [i64],
        increments: &mut [i64],
    ) -> i64;

    /// `*fieldinfo` / `ZAinfo`.
    fn field_info(
        &self,
        kind: EntityKind,
        entity_id: i64,
        field: &CStr,
        out: FieldInfoBuffers<'_>,
    ) -> i64;

    /// `*inqattrs` and the group/geo-group/local variants.
    fn inquire_attrs(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        list: Option<&mut [u8]>,
        size: &mut i64,
    ) -> i64;

    /// `*attrinfo` and variants: number type and element count.
    fn attr_info(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        name: &CStr,
        number_type: &mut i32,
        count: &mut u64,
    ) -> i64;

    /// `*readattr` and variants.
    ///
    /// Never writes past `buffer`. The native calls write the whole
    /// attribute, so implementations stage longer attributes through
    /// [`RawBuffer::staged`] and return only the leading bytes.
    fn read_attr(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        name: &CStr,
        buffer: RawBuffer<'_>,
    ) -> i64;

    /// `*readfield` / `ZAread`. The three index slices have equal length.
    #[allow(clippy::too_many_arguments)]
    fn read_field(
        &self,
        kind: EntityKind,
        entity_id: i64,
        field: &CStr,
        start: &[u64],
        stride: &[u64],
        edge: &[u64],
        buffer: RawBuffer<'_>,
    ) -> i64;

    /// `GDgridinfo`.
    fn grid_info(&self, grid_id: i64, out: &mut GridInfo) -> i64;

    /// `GDprojinfo`.
    fn projection_info(&self, grid_id: i64, out: &mut ProjectionInfo) -> i64;

    /// `GDorigininfo`.
    fn origin_info(&self, grid_id: i64, origin_code: &mut i32) -> i64;

    /// `GDpixreginfo`.
    fn pixel_registration_info(&self, grid_id: i64, pixreg_code: &mut i32) -> i64;
}
