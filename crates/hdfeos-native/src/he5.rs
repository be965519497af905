//! HDF-EOS5 backend over `libhe5_hdfeos`.
//!
//! Entry points are resolved once at load time. Grids, swaths and zonal
//! averages share one symbol table; each [`NativeApi`] method dispatches on
//! the entity kind. Number types come back as `HE5T` codes, which are
//! already the codes the type registry uses.

use std::ffi::{c_char, c_int, c_long, c_uint, c_void, CStr};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Once;

use hdfeos_core::{
    AccessMode, AttrDescriptor, AttrScope, EntityKind, EntryCode, FieldClass, FieldInfoBuffers,
    Generation, GridInfo, NativeApi, ProjectionInfo, RawBuffer,
};
use libloading::Library;
use tracing::{debug, trace};

use crate::config::LibraryConfig;
use crate::error::Result;
use crate::loader::{LibrarySearch, HDFEOS5_LIBRARY};

/// HDF5 object id. 64-bit since HDF5 1.10.
#[cfg(feature = "hid64")]
pub type Hid = i64;
/// HDF5 object id.
#[cfg(not(feature = "hid64"))]
pub type Hid = c_int;

type Herr = c_int;
type Hsize = u64;

/// `H5F_ACC_RDONLY`.
pub const H5F_ACC_RDONLY: c_uint = 0;
/// `H5F_ACC_RDWR`.
pub const H5F_ACC_RDWR: c_uint = 1;

/// `H5E_DEFAULT` error stack.
const H5E_DEFAULT: Hid = 0;

const FAIL: i64 = -1;

symbol_table! {
    struct He5Symbols {
        fn HE5_GDopen(*const c_char, c_uint) -> Hid;
        fn HE5_GDclose(Hid) -> Herr;
        fn HE5_GDattach(Hid, *const c_char) -> Hid;
        fn HE5_GDdetach(Hid) -> Herr;
        fn HE5_GDinqgrid(*const c_char, *mut c_char, *mut c_long) -> c_long;
        fn HE5_GDnentries(Hid, c_int, *mut c_long) -> c_long;
        fn HE5_GDinqdims(Hid, *mut c_char, *mut Hsize) -> c_int;
        fn HE5_GDinqfields(Hid, *mut c_char, *mut c_int, *mut Hid) -> c_int;
        fn HE5_GDfieldinfo(Hid, *const c_char, *mut c_int, *mut Hsize, *mut Hid, *mut c_char, *mut c_char) -> Herr;
        fn HE5_GDinqattrs(Hid, *mut c_char, *mut c_long) -> c_long;
        fn HE5_GDinqlocattrs(Hid, *const c_char, *mut c_char, *mut c_long) -> c_long;
        fn HE5_GDattrinfo(Hid, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_GDlocattrinfo(Hid, *const c_char, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_GDreadattr(Hid, *const c_char, *mut c_void) -> Herr;
        fn HE5_GDreadlocattr(Hid, *const c_char, *const c_char, *mut c_void) -> Herr;
        fn HE5_GDreadfield(Hid, *const c_char, *const Hsize, *const Hsize, *const Hsize, *mut c_void) -> Herr;
        fn HE5_GDgridinfo(Hid, *mut c_long, *mut c_long, *mut f64, *mut f64) -> Herr;
        fn HE5_GDprojinfo(Hid, *mut c_int, *mut c_int, *mut c_int, *mut f64) -> Herr;
        fn HE5_GDorigininfo(Hid, *mut c_int) -> Herr;
        fn HE5_GDpixreginfo(Hid, *mut c_int) -> Herr;

        fn HE5_SWopen(*const c_char, c_uint) -> Hid;
        fn HE5_SWclose(Hid) -> Herr;
        fn HE5_SWattach(Hid, *const c_char) -> Hid;
        fn HE5_SWdetach(Hid) -> Herr;
        fn HE5_SWinqswath(*const c_char, *mut c_char, *mut c_long) -> c_long;
        fn HE5_SWnentries(Hid, c_int, *mut c_long) -> c_long;
        fn HE5_SWinqdims(Hid, *mut c_char, *mut Hsize) -> c_int;
        fn HE5_SWinqgeofields(Hid, *mut c_char, *mut c_int, *mut Hid) -> c_int;
        fn HE5_SWinqdatafields(Hid, *mut c_char, *mut c_int, *mut Hid) -> c_int;
        fn HE5_SWinqmaps(Hid, *mut c_char, *mut c_long, *mut c_long) -> c_long;
        fn HE5_SWfieldinfo(Hid, *const c_char, *mut c_int, *mut Hsize, *mut Hid, *mut c_char, *mut c_char) -> Herr;
        fn HE5_SWinqattrs(Hid, *mut c_char, *mut c_long) -> c_long;
        fn HE5_SWinqgrpattrs(Hid, *mut c_char, *mut c_long) -> c_long;
        fn HE5_SWinqgeogrpattrs(Hid, *mut c_char, *mut c_long) -> c_long;
        fn HE5_SWinqlocattrs(Hid, *const c_char, *mut c_char, *mut c_long) -> c_long;
        fn HE5_SWattrinfo(Hid, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_SWgrpattrinfo(Hid, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_SWgeogrpattrinfo(Hid, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_SWlocattrinfo(Hid, *const c_char, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_SWreadattr(Hid, *const c_char, *mut c_void) -> Herr;
        fn HE5_SWreadgrpattr(Hid, *const c_char, *mut c_void) -> Herr;
        fn HE5_SWreadgeogrpattr(Hid, *const c_char, *mut c_void) -> Herr;
        fn HE5_SWreadlocattr(Hid, *const c_char, *const c_char, *mut c_void) -> Herr;
        fn HE5_SWreadfield(Hid, *const c_char, *const Hsize, *const Hsize, *const Hsize, *mut c_void) -> Herr;

        fn HE5_ZAopen(*const c_char, c_uint) -> Hid;
        fn HE5_ZAclose(Hid) -> Herr;
        fn HE5_ZAattach(Hid, *const c_char) -> Hid;
        fn HE5_ZAdetach(Hid) -> Herr;
        fn HE5_ZAinqza(*const c_char, *mut c_char, *mut c_long) -> c_long;
        fn HE5_ZAnentries(Hid, c_int, *mut c_long) -> c_long;
        fn HE5_ZAinqdims(Hid, *mut c_char, *mut Hsize) -> c_long;
        fn HE5_ZAinquire(Hid, *mut c_char, *mut c_int, *mut Hid) -> c_long;
        fn HE5_ZAinfo(Hid, *const c_char, *mut c_int, *mut Hsize, *mut Hid, *mut c_char, *mut c_char) -> Herr;
        fn HE5_ZAinqattrs(Hid, *mut c_char, *mut c_long) -> c_long;
        fn HE5_ZAinqgrpattrs(Hid, *mut c_char, *mut c_long) -> c_long;
        fn HE5_ZAinqlocattrs(Hid, *const c_char, *mut c_char, *mut c_long) -> c_long;
        fn HE5_ZAattrinfo(Hid, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_ZAgrpattrinfo(Hid, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_ZAlocattrinfo(Hid, *const c_char, *const c_char, *mut Hid, *mut Hsize) -> c_long;
        fn HE5_ZAreadattr(Hid, *const c_char, *mut c_void) -> Herr;
        fn HE5_ZAreadgrpattr(Hid, *const c_char, *mut c_void) -> Herr;
        fn HE5_ZAreadlocattr(Hid, *const c_char, *const c_char, *mut c_void) -> Herr;
        fn HE5_ZAread(Hid, *const c_char, *const Hsize, *const Hsize, *const Hsize, *mut c_void) -> Herr;
    }
}

/// The HDF-EOS5 library, loaded at runtime.
pub struct Hdfeos5Library {
    symbols: He5Symbols,
    path: PathBuf,
    // Dropped after `symbols`.
    _library: Library,
}

impl Hdfeos5Library {
    /// Locate and load `libhe5_hdfeos` as configured.
    pub fn load(config: &LibraryConfig) -> Result<Self> {
        let search = LibrarySearch::from_config(config);
        let (library, path) = search.load(config.hdfeos5_lib.as_deref(), HDFEOS5_LIBRARY)?;
        Self::from_library(library, path)
    }

    /// Load the library at `path`.
    pub fn open_path(path: &Path) -> Result<Self> {
        let (library, path) =
            LibrarySearch::with_paths(Vec::new()).load(Some(path), HDFEOS5_LIBRARY)?;
        Self::from_library(library, path)
    }

    fn from_library(library: Library, path: PathBuf) -> Result<Self> {
        // SAFETY: the table declares the signatures of the HDF-EOS5 public
        // headers and is stored next to the library that owns it.
        let symbols = unsafe { He5Symbols::resolve(&library, HDFEOS5_LIBRARY)? };
        debug!(path = %path.display(), "Resolved HDF-EOS5 entry points");
        silence_hdf5_errors(&library);
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

impl std::fmt::Debug for Hdfeos5Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hdfeos5Library").field("path", &self.path).finish()
    }
}

/// Turn off HDF5's automatic error stack printing.
///
/// Failed lookups are normal (an absent attribute list, a missing field) and
/// are reported through status codes, but HDF5 also prints a diagnostic
/// stack to stderr for each one. `H5Eset_auto2` lives in libhdf5, which
/// `libhe5_hdfeos` links, so it resolves through the same handle. Runs once
/// per process.
fn silence_hdf5_errors(library: &Library) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        type SetAuto = unsafe extern "C" fn(Hid, *const c_void, *mut c_void) -> Herr;
        // SAFETY: H5Eset_auto2(H5E_DEFAULT, NULL, NULL) is the documented way
        // to disable automatic error printing.
        unsafe {
            match library.get::<SetAuto>(b"H5Eset_auto2\0") {
                Ok(set_auto) => {
                    set_auto(H5E_DEFAULT, ptr::null(), ptr::null_mut());
                }
                Err(_) => trace!("H5Eset_auto2 not resolvable, HDF5 errors stay on"),
            }
        }
    });
}

fn hid(id: i64) -> Hid {
    Hid::try_from(id).unwrap_or(-1)
}

fn type_code(ntype: Hid) -> i32 {
    i32::try_from(ntype).unwrap_or(-1)
}

fn out_ptr(list: Option<&mut [u8]>) -> *mut c_char {
    list.map_or(ptr::null_mut(), |buf| buf.as_mut_ptr().cast())
}

// Every unsafe block below passes NUL-terminated names borrowed for the call,
// and output pointers into buffers the core layer sized for that call.
impl NativeApi for Hdfeos5Library {
    fn generation(&self) -> Generation {
        Generation::Hdfeos5
    }

    fn open(&self, kind: EntityKind, path: &CStr, access: AccessMode) -> i64 {
        let s = &self.symbols;
        let flags = match access {
            AccessMode::ReadOnly => H5F_ACC_RDONLY,
            AccessMode::ReadWrite => H5F_ACC_RDWR,
        };
        // SAFETY: see above.
        let id = unsafe {
            match kind {
                EntityKind::Grid => (s.HE5_GDopen)(path.as_ptr(), flags),
                EntityKind::Swath => (s.HE5_SWopen)(path.as_ptr(), flags),
                EntityKind::ZonalAverage => (s.HE5_ZAopen)(path.as_ptr(), flags),
            }
        };
        i64::from(id)
    }

    fn close(&self, kind: EntityKind, file_id: i64) -> i64 {
        let s = &self.symbols;
        // SAFETY: see above.
        let status = unsafe {
            match kind {
                EntityKind::Grid => (s.HE5_GDclose)(hid(file_id)),
                EntityKind::Swath => (s.HE5_SWclose)(hid(file_id)),
                EntityKind::ZonalAverage => (s.HE5_ZAclose)(hid(file_id)),
            }
        };
        i64::from(status)
    }

    fn attach(&self, kind: EntityKind, file_id: i64, name: &CStr) -> i64 {
        let s = &self.symbols;
        // SAFETY: see above.
        let id = unsafe {
            match kind {
                EntityKind::Grid => (s.HE5_GDattach)(hid(file_id), name.as_ptr()),
                EntityKind::Swath => (s.HE5_SWattach)(hid(file_id), name.as_ptr()),
                EntityKind::ZonalAverage => (s.HE5_ZAattach)(hid(file_id), name.as_ptr()),
            }
        };
        i64::from(id)
    }

    fn detach(&self, kind: EntityKind, entity_id: i64) -> i64 {
        let s = &self.symbols;
        // SAFETY: see above.
        let status = unsafe {
            match kind {
                EntityKind::Grid => (s.HE5_GDdetach)(hid(entity_id)),
                EntityKind::Swath => (s.HE5_SWdetach)(hid(entity_id)),
                EntityKind::ZonalAverage => (s.HE5_ZAdetach)(hid(entity_id)),
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
        let mut strbufsize: c_long = 0;
        // SAFETY: see above.
        let count = unsafe {
            match kind {
                EntityKind::Grid => (s.HE5_GDinqgrid)(path.as_ptr(), list, &mut strbufsize),
                EntityKind::Swath => (s.HE5_SWinqswath)(path.as_ptr(), list, &mut strbufsize),
                EntityKind::ZonalAverage => (s.HE5_ZAinqza)(path.as_ptr(), list, &mut strbufsize),
            }
        };
        *size = i64::from(strbufsize);
        i64::from(count)
    }

    fn nentries(&self, kind: EntityKind, entity_id: i64, entry: EntryCode, size: &mut i64) -> i64 {
        let s = &self.symbols;
        let mut strbufsize: c_long = 0;
        let id = hid(entity_id);
        // SAFETY: see above.
        let count = unsafe {
            match kind {
                EntityKind::Grid => (s.HE5_GDnentries)(id, entry.code(), &mut strbufsize),
                EntityKind::Swath => (s.HE5_SWnentries)(id, entry.code(), &mut strbufsize),
                EntityKind::ZonalAverage => (s.HE5_ZAnentries)(id, entry.code(), &mut strbufsize),
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
        let id = hid(entity_id);
        let names = list.as_mut_ptr().cast();
        let dims = lengths.as_mut_ptr();
        // SAFETY: see above.
        unsafe {
            match kind {
                EntityKind::Grid => i64::from((s.HE5_GDinqdims)(id, names, dims)),
                EntityKind::Swath => i64::from((s.HE5_SWinqdims)(id, names, dims)),
                EntityKind::ZonalAverage => i64::from((s.HE5_ZAinqdims)(id, names, dims)),
            }
        }
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
        let id = hid(entity_id);
        let names = list.as_mut_ptr().cast();
        let rank_ptr = ranks.as_mut_ptr();
        let mut ntypes: Vec<Hid> = vec![0; number_types.len()];
        let ntype_ptr = ntypes.as_mut_ptr();

        // SAFETY: see above.
        let count = unsafe {
            match (kind, class) {
                (EntityKind::Swath, FieldClass::Geo) => {
                    i64::from((s.HE5_SWinqgeofields)(id, names, rank_ptr, ntype_ptr))
                }
                (EntityKind::Swath, FieldClass::Data) => {
                    i64::from((s.HE5_SWinqdatafields)(id, names, rank_ptr, ntype_ptr))
                }
                (EntityKind::Grid, FieldClass::Data) => {
                    i64::from((s.HE5_GDinqfields)(id, names, rank_ptr, ntype_ptr))
                }
                (EntityKind::ZonalAverage, FieldClass::Data) => {
                    i64::from((s.HE5_ZAinquire)(id, names, rank_ptr, ntype_ptr))
                }
                _ => FAIL,
            }
        };

        for (out, ntype) in number_types.iter_mut().zip(&ntypes) {
            *out = type_code(*ntype);
        }
        count
    }

    fn inquire_maps(
        &self,
        entity_id: i64,
        list: &mut [u8],
        offsets: &mut [i64],
        increments: &mut [i64],
    ) -> i64 {
        let mut off: Vec<c_long> = vec![0; offsets.len()];
        let mut inc: Vec<c_long> = vec![0; increments.len()];
        // SAFETY: see above.
        let count = unsafe {
            (self.symbols.HE5_SWinqmaps)(
                hid(entity_id),
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
        let id = hid(entity_id);
        let mut ntype: Hid = 0;
        let dim_list = out.dim_list.as_mut_ptr().cast();
        let max_dim_list = out_ptr(out.max_dim_list);
        let dims = out.dims.as_mut_ptr();
        let rank = out.rank as *mut i32;

        // SAFETY: see above. `dims` holds MAX_RANK entries.
        let status = unsafe {
            match kind {
                EntityKind::Grid => (s.HE5_GDfieldinfo)(
                    id, field.as_ptr(), rank, dims, &mut ntype, dim_list, max_dim_list,
                ),
                EntityKind::Swath => (s.HE5_SWfieldinfo)(
                    id, field.as_ptr(), rank, dims, &mut ntype, dim_list, max_dim_list,
                ),
                EntityKind::ZonalAverage => (s.HE5_ZAinfo)(
                    id, field.as_ptr(), rank, dims, &mut ntype, dim_list, max_dim_list,
                ),
            }
        };
        *out.number_type = type_code(ntype);
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
        let id = hid(entity_id);
        let names = out_ptr(list);
        let mut strbufsize: c_long = 0;
        let sz = &mut strbufsize as *mut c_long;

        // SAFETY: see above.
        let count = unsafe {
            match (kind, scope) {
                (EntityKind::Grid, AttrScope::Entity) => (s.HE5_GDinqattrs)(id, names, sz),
                (EntityKind::Swath, AttrScope::Entity) => (s.HE5_SWinqattrs)(id, names, sz),
                (EntityKind::ZonalAverage, AttrScope::Entity) => (s.HE5_ZAinqattrs)(id, names, sz),
                (EntityKind::Swath, AttrScope::Group) => (s.HE5_SWinqgrpattrs)(id, names, sz),
                (EntityKind::ZonalAverage, AttrScope::Group) => {
                    (s.HE5_ZAinqgrpattrs)(id, names, sz)
                }
                (EntityKind::Swath, AttrScope::GeoGroup) => {
                    (s.HE5_SWinqgeogrpattrs)(id, names, sz)
                }
                (EntityKind::Grid, AttrScope::Local(field)) => {
                    (s.HE5_GDinqlocattrs)(id, field.as_ptr(), names, sz)
                }
                (EntityKind::Swath, AttrScope::Local(field)) => {
                    (s.HE5_SWinqlocattrs)(id, field.as_ptr(), names, sz)
                }
                (EntityKind::ZonalAverage, AttrScope::Local(field)) => {
                    (s.HE5_ZAinqlocattrs)(id, field.as_ptr(), names, sz)
                }
                _ => return FAIL,
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
        let id = hid(entity_id);
        let attr = name.as_ptr();
        let mut ntype: Hid = 0;
        let nt = &mut ntype as *mut Hid;
        let cnt = count as *mut Hsize;

        // SAFETY: see above.
        let status = unsafe {
            match (kind, scope) {
                (EntityKind::Grid, AttrScope::Entity) => (s.HE5_GDattrinfo)(id, attr, nt, cnt),
                (EntityKind::Swath, AttrScope::Entity) => (s.HE5_SWattrinfo)(id, attr, nt, cnt),
                (EntityKind::ZonalAverage, AttrScope::Entity) => {
                    (s.HE5_ZAattrinfo)(id, attr, nt, cnt)
                }
                (EntityKind::Swath, AttrScope::Group) => (s.HE5_SWgrpattrinfo)(id, attr, nt, cnt),
                (EntityKind::ZonalAverage, AttrScope::Group) => {
                    (s.HE5_ZAgrpattrinfo)(id, attr, nt, cnt)
                }
                (EntityKind::Swath, AttrScope::GeoGroup) => {
                    (s.HE5_SWgeogrpattrinfo)(id, attr, nt, cnt)
                }
                (EntityKind::Grid, AttrScope::Local(field)) => {
                    (s.HE5_GDlocattrinfo)(id, field.as_ptr(), attr, nt, cnt)
                }
                (EntityKind::Swath, AttrScope::Local(field)) => {
                    (s.HE5_SWlocattrinfo)(id, field.as_ptr(), attr, nt, cnt)
                }
                (EntityKind::ZonalAverage, AttrScope::Local(field)) => {
                    (s.HE5_ZAlocattrinfo)(id, field.as_ptr(), attr, nt, cnt)
                }
                _ => return FAIL,
            }
        };
        *number_type = type_code(ntype);
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

        let s = &self.symbols;
        let id = hid(entity_id);
        let attr = name.as_ptr();
        buffer.staged(needed, |mut target| {
            let data = target.as_mut_ptr();
            // SAFETY: see above. `target` holds at least the attribute's
            // native size.
            let status = unsafe {
                match (kind, scope) {
                    (EntityKind::Grid, AttrScope::Entity) => (s.HE5_GDreadattr)(id, attr, data),
                    (EntityKind::Swath, AttrScope::Entity) => (s.HE5_SWreadattr)(id, attr, data),
                    (EntityKind::ZonalAverage, AttrScope::Entity) => {
                        (s.HE5_ZAreadattr)(id, attr, data)
                    }
                    (EntityKind::Swath, AttrScope::Group) => {
                        (s.HE5_SWreadgrpattr)(id, attr, data)
                    }
                    (EntityKind::ZonalAverage, AttrScope::Group) => {
                        (s.HE5_ZAreadgrpattr)(id, attr, data)
                    }
                    (EntityKind::Swath, AttrScope::GeoGroup) => {
                        (s.HE5_SWreadgeogrpattr)(id, attr, data)
                    }
                    (EntityKind::Grid, AttrScope::Local(field)) => {
                        (s.HE5_GDreadlocattr)(id, field.as_ptr(), attr, data)
                    }
                    (EntityKind::Swath, AttrScope::Local(field)) => {
                        (s.HE5_SWreadlocattr)(id, field.as_ptr(), attr, data)
                    }
                    (EntityKind::ZonalAverage, AttrScope::Local(field)) => {
                        (s.HE5_ZAreadlocattr)(id, field.as_ptr(), attr, data)
                    }
                    _ => return FAIL,
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
        let id = hid(entity_id);
        let data = buffer.as_mut_ptr();
        let (start, stride, edge) = (start.as_ptr(), stride.as_ptr(), edge.as_ptr());

        // SAFETY: see above. The buffer holds the product of `edge`.
        let status = unsafe {
            match kind {
                EntityKind::Grid => {
                    (s.HE5_GDreadfield)(id, field.as_ptr(), start, stride, edge, data)
                }
                EntityKind::Swath => {
                    (s.HE5_SWreadfield)(id, field.as_ptr(), start, stride, edge, data)
                }
                EntityKind::ZonalAverage => {
                    (s.HE5_ZAread)(id, field.as_ptr(), start, stride, edge, data)
                }
            }
        };
        i64::from(status)
    }

    fn grid_info(&self, grid_id: i64, out: &mut GridInfo) -> i64 {
        let mut xdim: c_long = 0;
        let mut ydim: c_long = 0;
        // SAFETY: see above. Each corner array holds two values.
        let status = unsafe {
            (self.symbols.HE5_GDgridinfo)(
                hid(grid_id),
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
        // SAFETY: see above. `params` holds the 13 GCTP parameters.
        let status = unsafe {
            (self.symbols.HE5_GDprojinfo)(
                hid(grid_id),
                &mut out.proj_code,
                &mut out.zone_code,
                &mut out.sphere_code,
                out.params.as_mut_ptr(),
            )
        };
        i64::from(status)
    }

    fn origin_info(&self, grid_id: i64, origin_code: &mut i32) -> i64 {
        // SAFETY: see above.
        i64::from(unsafe { (self.symbols.HE5_GDorigininfo)(hid(grid_id), origin_code) })
    }

    fn pixel_registration_info(&self, grid_id: i64, pixreg_code: &mut i32) -> i64 {
        // SAFETY: see above.
        i64::from(unsafe { (self.symbols.HE5_GDpixreginfo)(hid(grid_id), pixreg_code) })
    }
}
