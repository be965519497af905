//! HDF-EOS2 backend over `libhdfeos`.
//!
//! HDF-EOS2 differs from HDF-EOS5 in ways this backend hides from the core
//! layer:
//!
//! - ids, sizes and selection indices are 32-bit; wider values are rejected
//!   with a failure status before the native call
//! - number types are HDF4 `DFNT_*` codes and are translated to registry
//!   codes on the way out
//! - attribute info reports a byte count, converted here to elements
//! - there are no zonal averages and only entity-level attributes

use std::ffi::{c_char, c_int, c_void, CStr};
use std::path::{Path, PathBuf};
use std::ptr;

use hdfeos_core::{
    element_type_for, AccessMode, AttrDescriptor, AttrScope, EntityKind, EntryCode, FieldClass,
    FieldInfoBuffers, Generation, GridInfo, NativeApi, ProjectionInfo, RawBuffer,
    TEXT_TYPE_CODE,
};
use libloading::Library;
use tracing::{debug, warn};

use crate::config::LibraryConfig;
use crate::error::Result;
use crate::loader::{LibrarySearch, HDFEOS2_LIBRARY};

type Int32 = i32;
type Intn = c_int;

/// `DFACC_READ`.
pub const DFACC_READ: Intn = 1;
/// `DFACC_RDWR`.
pub const DFACC_RDWR: Intn = 3;

/// HDF4 number type codes.
pub mod dfnt {
    pub const UCHAR8: i32 = 3;
    pub const CHAR8: i32 = 4;
    pub const FLOAT32: i32 = 5;
    pub const FLOAT64: i32 = 6;
    pub const INT8: i32 = 20;
    pub const UINT8: i32 = 21;
    pub const INT16: i32 = 22;
    pub const UINT16: i32 = 23;
    pub const INT32: i32 = 24;
    pub const UINT32: i32 = 25;
    pub const INT64: i32 = 26;
    pub const UINT64: i32 = 27;

    /// Native byte order flag.
    pub const NATIVE: i32 = 0x1000;
    /// Little-endian flag.
    pub const LITEND: i32 = 0x4000;
}

const FAIL: i64 = -1;

/// Translate an HDF4 number type to a registry code.
///
/// Byte order flags are ignored. Codes with no registry counterpart are
/// returned unchanged so the registry reports them as unsupported.
pub fn translate_number_type(code: i32) -> i32 {
    match code & !(dfnt::NATIVE | dfnt::LITEND) {
        dfnt::CHAR8 | dfnt::UCHAR8 => TEXT_TYPE_CODE,
        dfnt::INT8 => 4,
        dfnt::UINT8 => 5,
        dfnt::INT16 => 2,
        dfnt::UINT16 => 3,
        dfnt::INT32 => 0,
        dfnt::UINT32 => 1,
        dfnt::INT64 => 8,
        dfnt::UINT64 => 9,
        dfnt::FLOAT32 => 10,
        dfnt::FLOAT64 => 11,
        _ => code,
    }
}

/// Narrow 64-bit selection indices to the library's `int32`.
pub fn narrow_indices(values: &[u64]) -> Option<Vec<Int32>> {
    values.iter().map(|&v| Int32::try_from(v).ok()).collect()
}

fn int32_id(id: i64) -> Option<Int32> {
    Int32::try_from(id).ok()
}

fn widen(values: &[Int32], out: &mut [u64]) {
    for (o, v) in out.iter_mut().zip(values) {
        *o = u64::try_from(*v).unwrap_or(0);
    }
}

fn out_ptr(list: Option<&mut [u8]>) -> *mut c_char {
    list.map_or(ptr::null_mut(), |buf| buf.as_mut_ptr().cast())
}

// HDF-EOS2 prototypes take `char *` even for input names.
fn name_ptr(name: &CStr) -> *mut c_char {
    name.as_ptr().cast_mut()
}

symbol_table! {
    struct He2Symbols {
        fn GDopen(*mut c_char, Intn) -> Int32;
        fn GDclose(Int32) -> Intn;
        fn GDattach(Int32, *mut c_char) -> Int32;
        fn GDdetach(Int32) -> Intn;
        fn GDinqgrid(*mut c_char, *mut c_char, *mut Int32) -> Int32;
        fn GDnentries(Int32, Int32, *mut Int32) -> Int32;
        fn GDinqdims(Int32, *mut c_char, *mut Int32) -> Int32;
        fn GDinqfields(Int32, *mut c_char, *mut Int32, *mut Int32) -> Int32;
        fn GDfieldinfo(Int32, *mut c_char, *mut Int32, *mut Int32, *mut Int32, *mut c_char) -> Intn;
        fn GDinqattrs(Int32, *mut c_char, *mut Int32) -> Int32;
        fn GDattrinfo(Int32, *mut c_char, *mut Int32, *mut Int32) -> Intn;
        fn GDreadattr(Int32, *mut c_char, *mut c_void) -> Intn;
        fn GDreadfield(Int32, *mut c_char, *mut Int32, *mut Int32, *mut Int32, *mut c_void) -> Intn;
        fn GDgridinfo(Int32, *mut Int32, *mut Int32, *mut f64, *mut f64) -> Intn;
        fn GDprojinfo(Int32, *mut Int32, *mut Int32, *mut Int32, *mut f64) -> Intn;
        fn GDorigininfo(Int32, *mut Int32) -> Intn;
        fn GDpixreginfo(Int32, *mut Int32) -> Intn;

        fn SWopen(*mut c_char, Intn) -> Int32;
        fn SWclose(Int32) -> Intn;
        fn SWattach(Int32, *mut c_char) -> Int32;
        fn SWdetach(Int32) -> Intn;
        fn SWinqswath(*mut c_char, *mut c_char, *mut Int32) -> Int32;
        fn SWnentries(Int32, Int32, *mut Int32) -> Int32;
        fn SWinqdims(Int32, *mut c_char, *mut Int32) -> Int32;
        fn SWinqgeofields(Int32, *mut c_char, *mut Int32, *mut Int32) -> Int32;
        fn SWinqdatafields(Int32, *mut c_char, *mut Int32, *mut Int32) -> Int32;
        fn SWinqmaps(Int32, *mut c_char, *mut Int32, *mut Int32) -> Int32;
        fn SWfieldinfo(Int32, *mut c_char, *mut Int32, *mut Int32, *mut Int32, *mut c_char) -> Intn;
        fn SWinqattrs(Int32, *mut c_char, *mut Int32) -> Int32;
        fn SWattrinfo(Int32, *mut c_char, *mut Int32, *mut Int32) -> Intn;
        fn SWreadattr(Int32, *mut c_char, *mut c_void) -> Intn;
        fn SWreadfield(Int32, *mut c_char, *mut Int32, *mut Int32, *mut Int32, *mut c_void) -> Intn;
    }
}

/// The HDF-EOS2 library, loaded at runtime.
pub struct Hdfeos2Library {
    symbols: He2Symbols,
    path: PathBuf,
    // Dropped after `symbols`.
    _library: Library,
}

impl Hdfeos2Library {
    /// Locate and load `libhdfeos` as configured.
    pub fn load(config: &LibraryConfig) -> Result<Self> {
        let search = LibrarySearch::from_config(config);
        let (library, path) = search.load(config.hdfeos2_lib.as_deref(), HDFEOS2_LIBRARY)?;
        Self::from_library(library, path)
    }

    /// Load the library at `path`.
    pub fn open_path(path: &Path) -> Result<Self> {
        let (library, path) =
            LibrarySearch::with_paths(Vec::new()).load(Some(path), HDFEOS2_LIBRARY)?;
        Self::from_library(library, path)
    }

    fn from_library(library: Library, path: PathBuf) -> Result<Self> {
        // SAFETY: the table declares the signatures of the HDF-EOS2 public
        // headers and is stored next to the library that owns it.
        let symbols = unsafe { He2Symbols::resolve(&library, HDFEOS2_LIBRARY)? };
        debug!(path = %path.display(), "Resolved HDF-EOS2 entry points");
        Ok(Self {
            symbols,
            path,
            _library: library,
        })
    }

    /// Where the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Hdfeos2Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hdfeos2Library").field("path", &self.path).finish()
    }
}

// Every unsafe block below passes NUL-terminated names borrowed for the call,
// and output pointers into buffers the core layer sized for that call.
impl NativeApi for Hdfeos2Library {
    fn generation(&self) -> Generation {
        Generation::Hdfeos2
    }

    fn open(&self, kind: EntityKind, path: &CStr, access: AccessMode) -> i64 {
        let s = &self.symbols;
        let flags = match access {
            AccessMode::ReadOnly => DFACC_READ,
            AccessMode::ReadWrite => DFACC_RDWR,
        };
        // SAFETY: see above.
        let id = unsafe {
            match kind {
                EntityKind::Grid => (s.GDopen)(name_ptr(path), flags),
                EntityKind::Swath => (s.SWopen)(name_ptr(path), flags),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        i64::from(id)
    }

    fn close(&self, kind: EntityKind, file_id: i64) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(file_id) else {
            return FAIL;
        };
        // SAFETY: see above.
        let status = unsafe {
            match kind {
                EntityKind::Grid => (s.GDclose)(id),
                EntityKind::Swath => (s.SWclose)(id),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        i64::from(status)
    }

    fn attach(&self, kind: EntityKind, file_id: i64, name: &CStr) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(file_id) else {
            return FAIL;
        };
        // SAFETY: see above.
        let entity = unsafe {
            match kind {
                EntityKind::Grid => (s.GDattach)(id, name_ptr(name)),
                EntityKind::Swath => (s.SWattach)(id, name_ptr(name)),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        i64::from(entity)
    }

    fn detach(&self, kind: EntityKind, entity_id: i64) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(entity_id) else {
            return FAIL;
        };
        // SAFETY: see above.
        let status = unsafe {
            match kind {
                EntityKind::Grid => (s.GDdetach)(id),
                EntityKind::Swath => (s.SWdetach)(id),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        i64::from(status)
    }

    fn inquire_entities(
        &self,
        kind: EntityKind,
        path: &CStr,
        list: Option<&mut [u8]>,
        size: &mut i64,
    ) -> i64 {
        let s = &self.symbols;
        let list = out_ptr(list);
        let mut strbufsize: Int32 = 0;
        // SAFETY: see above.
        let count = unsafe {
            match kind {
                EntityKind::Grid => (s.GDinqgrid)(name_ptr(path), list, &mut strbufsize),
                EntityKind::Swath => (s.SWinqswath)(name_ptr(path), list, &mut strbufsize),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        *size = i64::from(strbufsize);
        i64::from(count)
    }

    fn nentries(&self, kind: EntityKind, entity_id: i64, entry: EntryCode, size: &mut i64) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(entity_id) else {
            return FAIL;
        };
        let mut strbufsize: Int32 = 0;
        // SAFETY: see above.
        let count = unsafe {
            match kind {
                EntityKind::Grid => (s.GDnentries)(id, entry.code(), &mut strbufsize),
                EntityKind::Swath => (s.SWnentries)(id, entry.code(), &mut strbufsize),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        *size = i64::from(strbufsize);
        i64::from(count)
    }

    fn inquire_dims(
        &self,
        kind: EntityKind,
        entity_id: i64,
        list: &mut [u8],
        lengths: &mut [u64],
    ) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(entity_id) else {
            return FAIL;
        };
        let mut dims: Vec<Int32> = vec![0; lengths.len()];
        let names = list.as_mut_ptr().cast();
        // SAFETY: see above.
        let count = unsafe {
            match kind {
                EntityKind::Grid => (s.GDinqdims)(id, names, dims.as_mut_ptr()),
                EntityKind::Swath => (s.SWinqdims)(id, names, dims.as_mut_ptr()),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        widen(&dims, lengths);
        i64::from(count)
    }

    fn inquire_fields(
        &self,
        kind: EntityKind,
        entity_id: i64,
        class: FieldClass,
        list: &mut [u8],
        ranks: &mut [i32],
        number_types: &mut [i32],
    ) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(entity_id) else {
            return FAIL;
        };
        let names = list.as_mut_ptr().cast();
        let (rank_ptr, ntype_ptr) = (ranks.as_mut_ptr(), number_types.as_mut_ptr());
        // SAFETY: see above.
        let count = unsafe {
            match (kind, class) {
                (EntityKind::Grid, FieldClass::Data) => {
                    (s.GDinqfields)(id, names, rank_ptr, ntype_ptr)
                }
                (EntityKind::Swath, FieldClass::Geo) => {
                    (s.SWinqgeofields)(id, names, rank_ptr, ntype_ptr)
                }
                (EntityKind::Swath, FieldClass::Data) => {
                    (s.SWinqdatafields)(id, names, rank_ptr, ntype_ptr)
                }
                _ => return FAIL,
            }
        };
        for code in number_types.iter_mut() {
            *code = translate_number_type(*code);
        }
        i64::from(count)
    }

    fn inquire_maps(
        &self,
        entity_id: i64,
        list: &mut [u8],
        offsets: &mut [i64],
        increments: &mut [i64],
    ) -> i64 {
        let Some(id) = int32_id(entity_id) else {
            return FAIL;
        };
        let mut off: Vec<Int32> = vec![0; offsets.len()];
        let mut inc: Vec<Int32> = vec![0; increments.len()];
        // SAFETY: see above.
        let count = unsafe {
            (self.symbols.SWinqmaps)(
                id,
                list.as_mut_ptr().cast(),
                off.as_mut_ptr(),
                inc.as_mut_ptr(),
            )
        };
        for (out, v) in offsets.iter_mut().zip(&off) {
            *out = i64::from(*v);
        }
        for (out, v) in increments.iter_mut().zip(&inc) {
            *out = i64::from(*v);
        }
        i64::from(count)
    }

    fn field_info(
        &self,
        kind: EntityKind,
        entity_id: i64,
        field: &CStr,
        out: FieldInfoBuffers<'_>,
    ) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(entity_id) else {
            return FAIL;
        };
        let mut dims: Vec<Int32> = vec![0; out.dims.len()];
        let mut ntype: Int32 = 0;
        let dim_list = out.dim_list.as_mut_ptr().cast();
        let rank = out.rank as *mut Int32;
        let dims_ptr = dims.as_mut_ptr();

        // SAFETY: see above. `dims` holds MAX_RANK entries.
        let status = unsafe {
            match kind {
                EntityKind::Grid => {
                    (s.GDfieldinfo)(id, name_ptr(field), rank, dims_ptr, &mut ntype, dim_list)
                }
                EntityKind::Swath => {
                    (s.SWfieldinfo)(id, name_ptr(field), rank, dims_ptr, &mut ntype, dim_list)
                }
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        widen(&dims, out.dims);
        *out.number_type = translate_number_type(ntype);
        i64::from(status)
    }

    fn inquire_attrs(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        list: Option<&mut [u8]>,
        size: &mut i64,
    ) -> i64 {
        let s = &self.symbols;
        let (Some(id), AttrScope::Entity) = (int32_id(entity_id), scope) else {
            return FAIL;
        };
        let names = out_ptr(list);
        let mut strbufsize: Int32 = 0;
        // SAFETY: see above.
        let count = unsafe {
            match kind {
                EntityKind::Grid => (s.GDinqattrs)(id, names, &mut strbufsize),
                EntityKind::Swath => (s.SWinqattrs)(id, names, &mut strbufsize),
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        *size = i64::from(strbufsize);
        i64::from(count)
    }

    fn attr_info(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        name: &CStr,
        number_type: &mut i32,
        count: &mut u64,
    ) -> i64 {
        let s = &self.symbols;
        let (Some(id), AttrScope::Entity) = (int32_id(entity_id), scope) else {
            return FAIL;
        };
        let mut ntype: Int32 = 0;
        let mut nbytes: Int32 = 0;
        // SAFETY: see above.
        let status = unsafe {
            match kind {
                EntityKind::Grid => (s.GDattrinfo)(id, name_ptr(name), &mut ntype, &mut nbytes),
                EntityKind::Swath => (s.SWattrinfo)(id, name_ptr(name), &mut ntype, &mut nbytes),
                EntityKind::ZonalAverage => return FAIL,
            }
        };

        *number_type = translate_number_type(ntype);
        let width = element_type_for(*number_type).map_or(1, |t| t.size()) as u64;
        *count = u64::try_from(nbytes).unwrap_or(0) / width;
        i64::from(status)
    }

    fn read_attr(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        name: &CStr,
        mut buffer: RawBuffer<'_>,
    ) -> i64 {
        let s = &self.symbols;
        let (Some(id), AttrScope::Entity) = (int32_id(entity_id), scope) else {
            return FAIL;
        };
        let mut descriptor = AttrDescriptor { number_type: 0, count: 0 };
        let status = self.attr_info(
            kind,
            entity_id,
            scope,
            name,
            &mut descriptor.number_type,
            &mut descriptor.count,
        );
        if status < 0 {
            return status;
        }
        let Some(needed) = descriptor.native_byte_len() else {
            return FAIL;
        };

        buffer.staged(needed, |mut target| {
            let data = target.as_mut_ptr();
            // SAFETY: see above. `target` holds at least the attribute's
            // byte count.
            let status = unsafe {
                match kind {
                    EntityKind::Grid => (s.GDreadattr)(id, name_ptr(name), data),
                    EntityKind::Swath => (s.SWreadattr)(id, name_ptr(name), data),
                    EntityKind::ZonalAverage => return FAIL,
                }
            };
            i64::from(status)
        })
    }

    fn read_field(
        &self,
        kind: EntityKind,
        entity_id: i64,
        field: &CStr,
        start: &[u64],
        stride: &[u64],
        edge: &[u64],
        mut buffer: RawBuffer<'_>,
    ) -> i64 {
        let s = &self.symbols;
        let Some(id) = int32_id(entity_id) else {
            return FAIL;
        };
        let (Some(mut start), Some(mut stride), Some(mut edge)) =
            (narrow_indices(start), narrow_indices(stride), narrow_indices(edge))
        else {
            warn!(field = ?field, "Selection does not fit in int32");
            return FAIL;
        };
        let data = buffer.as_mut_ptr();
        let (start, stride, edge) = (start.as_mut_ptr(), stride.as_mut_ptr(), edge.as_mut_ptr());

        // SAFETY: see above. The buffer holds the product of `edge`.
        let status = unsafe {
            match kind {
                EntityKind::Grid => (s.GDreadfield)(id, name_ptr(field), start, stride, edge, data),
                EntityKind::Swath => {
                    (s.SWreadfield)(id, name_ptr(field), start, stride, edge, data)
                }
                EntityKind::ZonalAverage => return FAIL,
            }
        };
        i64::from(status)
    }

    fn grid_info(&self, grid_id: i64, out: &mut GridInfo) -> i64 {
        let Some(id) = int32_id(grid_id) else {
            return FAIL;
        };
        let mut xdim: Int32 = 0;
        let mut ydim: Int32 = 0;
        // SAFETY: see above. Each corner array holds two values.
        let status = unsafe {
            (self.symbols.GDgridinfo)(
                id,
                &mut xdim,
                &mut ydim,
                out.upper_left.as_mut_ptr(),
                out.lower_right.as_mut_ptr(),
            )
        };
        out.xdim = i64::from(xdim);
        out.ydim = i64::from(ydim);
        i64::from(status)
    }

    fn projection_info(&self, grid_id: i64, out: &mut ProjectionInfo) -> i64 {
        let Some(id) = int32_id(grid_id) else {
            return FAIL;
        };
        // SAFETY: see above. `params` holds the 13 GCTP parameters.
        let status = unsafe {
            (self.symbols.GDprojinfo)(
                id,
                &mut out.proj_code,
                &mut out.zone_code,
                &mut out.sphere_code,
                out.params.as_mut_ptr(),
            )
        };
        i64::from(status)
    }

    fn origin_info(&self, grid_id: i64, origin_code: &mut i32) -> i64 {
        let Some(id) = int32_id(grid_id) else {
            return FAIL;
        };
        // SAFETY: see above.
        i64::from(unsafe { (self.symbols.GDorigininfo)(id, origin_code) })
    }

    fn pixel_registration_info(&self, grid_id: i64, pixreg_code: &mut i32) -> i64 {
        let Some(id) = int32_id(grid_id) else {
            return FAIL;
        };
        // SAFETY: see above.
        i64::from(unsafe { (self.symbols.GDpixreginfo)(id, pixreg_code) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdfeos_core::ElementType;

    #[test]
    fn test_translate_number_types() {
        let cases = [
            (dfnt::CHAR8, ElementType::Text),
            (dfnt::UCHAR8, ElementType::Text),
            (dfnt::INT8, ElementType::Int8),
            (dfnt::UINT8, ElementType::UInt8),
            (dfnt::INT16, ElementType::Int16),
            (dfnt::UINT16, ElementType::UInt16),
            (dfnt::INT32, ElementType::Int32),
            (dfnt::UINT32, ElementType::UInt32),
            (dfnt::INT64, ElementType::Int64),
            (dfnt::UINT64, ElementType::UInt64),
            (dfnt::FLOAT32, ElementType::Float32),
            (dfnt::FLOAT64, ElementType::Float64),
        ];
        for (code, expected) in cases {
            assert_eq!(
                element_type_for(translate_number_type(code)),
                Ok(expected),
                "DFNT code {code}"
            );
        }
    }

    #[test]
    fn test_byte_order_flags_are_ignored() {
        assert_eq!(translate_number_type(dfnt::NATIVE | dfnt::FLOAT32), 10);
        assert_eq!(translate_number_type(dfnt::LITEND | dfnt::INT16), 2);
    }

    #[test]
    fn test_unknown_number_type_passes_through() {
        // DFNT_FLOAT128
        assert_eq!(translate_number_type(7), 7);
        assert!(element_type_for(translate_number_type(7)).is_err());
    }

    #[test]
    fn test_narrow_indices() {
        assert_eq!(narrow_indices(&[0, 2, 5]), Some(vec![0, 2, 5]));
        assert_eq!(narrow_indices(&[0, 1 << 31]), None);
        assert_eq!(narrow_indices(&[]), Some(vec![]));
    }

    #[test]
    fn test_ids_must_fit_int32() {
        assert_eq!(int32_id(393216), Some(393216));
        assert_eq!(int32_id(i64::from(i32::MAX) + 1), None);
    }

    #[test]
    fn test_widen_clamps_negative() {
        let mut out = [9u64; 3];
        widen(&[4, -1, 0], &mut out);
        assert_eq!(out, [4, 0, 0]);
    }

    #[test]
    fn test_load_missing_library_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Hdfeos2Library::open_path(&dir.path().join("libhdfeos.so")).unwrap_err();
        assert!(matches!(err, crate::LoadError::LoadFailed { .. }));
    }
}
