//! Size-negotiated name lists.
//!
//! Every HDF-EOS "list the X of Y" entry point follows the same two-call
//! protocol:
//!
//! 1. Call with no output buffer. The return value is the element count and
//!    the required length of the comma-delimited list is written to an
//!    output parameter.
//! 2. If the count is zero, stop: no second call, no allocation.
//! 3. Allocate `size + 1` zeroed bytes, call again with the buffer, then
//!    split the text on `,`.
//!
//! Dimension negotiation goes through `*nentries`, which is known to
//! under-report the list length; sizes negotiated for dimensions are raised
//! to [`DIM_LIST_FLOOR`]. Entity, field and attribute sizes are used as
//! reported.

use std::path::Path;

use tracing::trace;

use crate::api::{EntityKind, EntryCode, NativeApi};
use crate::attribute::AttrLocation;
use crate::buffer::c_string_prefix;
use crate::error::{ReadError, Result};
use crate::handle::{c_path, ensure_kind, EntityHandle};
use crate::status::{check, check_count};

/// Minimum buffer length for dimension lists.
pub const DIM_LIST_FLOOR: usize = 100;

/// Outcome of the negotiation half of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated {
    /// Number of entries.
    pub count: usize,
    /// Length of the comma-delimited list, without the terminator.
    pub size: usize,
}

impl Negotiated {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Zeroed list buffer with room for the terminator.
    pub fn list_buffer(&self) -> Vec<u8> {
        vec![0u8; self.size + 1]
    }
}

/// Split a NUL-terminated, comma-delimited list into names, in order.
pub fn split_list(buffer: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(c_string_prefix(buffer, buffer.len()));
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::to_string).collect()
}

fn negotiated_size(size: i64, operation: &'static str) -> Result<usize> {
    usize::try_from(size).map_err(|_| ReadError::native(size, operation))
}

/// Run the full two-call protocol over one list-producing entry point.
///
/// `call` receives `None` for the negotiation call and the allocated buffer
/// for the fetch call.
pub fn fetch_list<F>(operation: &'static str, mut call: F) -> Result<Vec<String>>
where
    F: FnMut(Option<&mut [u8]>, &mut i64) -> i64,
{
    let mut size = 0i64;
    let count = check_count(call(None, &mut size), operation)?;
    if count == 0 {
        trace!(operation, "empty list, skipping fetch");
        return Ok(Vec::new());
    }
    let negotiated = Negotiated {
        count,
        size: negotiated_size(size, operation)?,
    };
    trace!(operation, count, size = negotiated.size, "negotiated list");

    let mut buffer = negotiated.list_buffer();
    let mut fetched_size = size;
    check(call(Some(buffer.as_mut_slice()), &mut fetched_size), operation)?;
    Ok(split_list(&buffer))
}

/// Negotiate the count and list length of an entity's entries.
///
/// The dimension floor applies to [`EntryCode::Dimensions`] only.
pub fn negotiate_entries<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    entry: EntryCode,
) -> Result<Negotiated> {
    let mut size = 0i64;
    let count = check_count(
        api.nentries(entity.kind(), entity.id(), entry, &mut size),
        "nentries",
    )?;
    let reported = negotiated_size(size, "nentries")?;
    let size = match entry {
        EntryCode::Dimensions => reported.max(DIM_LIST_FLOOR),
        _ => reported,
    };
    trace!(?entry, count, reported, size, "negotiated entries");
    Ok(Negotiated { count, size })
}

/// Names of the entities of `kind` in a file, without opening it.
pub fn list_entities<A: NativeApi + ?Sized>(
    api: &A,
    kind: EntityKind,
    path: impl AsRef<Path>,
) -> Result<Vec<String>> {
    ensure_kind(api, kind, "inquire_entities")?;
    let path = c_path(path.as_ref())?;
    fetch_list("inquire_entities", |list, size| {
        api.inquire_entities(kind, &path, list, size)
    })
}

/// Names of the attributes at `location` of an attached entity.
pub fn list_attributes<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    location: AttrLocation<'_>,
) -> Result<Vec<String>> {
    let field = location.c_field()?;
    let scope = location.scope(field.as_deref());
    location.ensure_supported(api, entity.kind(), "inquire_attrs")?;
    fetch_list("inquire_attrs", |list, size| {
        api.inquire_attrs(entity.kind(), entity.id(), scope, list, size)
    })
}
