//! File and entity handle lifecycle.
//!
//! Thin, status-checked pass-throughs. The handle types are not `Copy`:
//! [`detach`] and [`close`] consume them, so a caller holding the value
//! cannot use it after the native id has been released.

use std::ffi::CString;
use std::path::Path;

use tracing::debug;

use crate::api::{AccessMode, EntityKind, NativeApi};
use crate::error::{ReadError, Result};
use crate::status::check;

/// An open HDF-EOS file, valid for attach and enumeration until [`close`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FileHandle {
    id: i64,
    kind: EntityKind,
}

impl FileHandle {
    /// Wrap an id obtained outside this crate.
    pub fn from_raw(id: i64, kind: EntityKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Entity kind the file was opened for.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

/// An attached grid, swath or za, valid for attribute and field
/// operations until [`detach`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    id: i64,
    kind: EntityKind,
}

impl EntityHandle {
    /// Wrap an id obtained outside this crate.
    pub fn from_raw(id: i64, kind: EntityKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

/// Convert a name to a NUL-terminated C string.
pub(crate) fn c_name(name: &str) -> Result<CString> {
    Ok(CString::new(name)?)
}

/// Convert a path to a NUL-terminated C string.
pub(crate) fn c_path(path: &Path) -> Result<CString> {
    let text = path.to_string_lossy();
    c_name(&text)
}

pub(crate) fn ensure_kind<A: NativeApi + ?Sized>(
    api: &A,
    kind: EntityKind,
    operation: &'static str,
) -> Result<()> {
    let generation = api.generation();
    if generation.supports_kind(kind) {
        Ok(())
    } else {
        Err(ReadError::unsupported(operation, generation))
    }
}

/// Open a file for access to entities of `kind`.
pub fn open<A: NativeApi + ?Sized>(
    api: &A,
    kind: EntityKind,
    path: impl AsRef<Path>,
    access: AccessMode,
) -> Result<FileHandle> {
    ensure_kind(api, kind, "open")?;
    let path = c_path(path.as_ref())?;
    let id = check(api.open(kind, &path, access), "open")?;
    debug!(%kind, file_id = id, path = ?path, "opened file");
    Ok(FileHandle { id, kind })
}

/// Attach to a named entity in an open file.
pub fn attach<A: NativeApi + ?Sized>(
    api: &A,
    file: &FileHandle,
    name: &str,
) -> Result<EntityHandle> {
    let c = c_name(name)?;
    let id = check(api.attach(file.kind, file.id, &c), "attach")?;
    debug!(kind = %file.kind, entity_id = id, name, "attached");
    Ok(EntityHandle {
        id,
        kind: file.kind,
    })
}

/// Release an attached entity.
pub fn detach<A: NativeApi + ?Sized>(api: &A, entity: EntityHandle) -> Result<()> {
    check(api.detach(entity.kind, entity.id), "detach")?;
    Ok(())
}

/// Close a file.
pub fn close<A: NativeApi + ?Sized>(api: &A, file: FileHandle) -> Result<()> {
    check(api.close(file.kind, file.id), "close")?;
    Ok(())
}
