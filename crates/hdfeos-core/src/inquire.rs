//! Dimension, field and dimension map inquiry.
//!
//! Each inquiry negotiates through `*nentries` with the matching entry code,
//! returns an empty list without a second call when there are no entries,
//! and otherwise sizes the name list and the per-entry arrays from the
//! negotiated count.

use serde::Serialize;

use crate::api::{EntityKind, EntryCode, FieldClass, NativeApi};
use crate::error::{ReadError, Result};
use crate::handle::EntityHandle;
use crate::list::{negotiate_entries, split_list};
use crate::status::check;

/// A named dimension and its length (0 for an unlimited dimension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub name: String,
    pub length: u64,
}

/// Name, rank and number type of a field, as listed by field inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub rank: i32,
    pub number_type: i32,
}

/// Mapping between a swath geolocation dimension and a data dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionMap {
    pub geo_dim: String,
    pub data_dim: String,
    pub offset: i64,
    pub increment: i64,
}

fn require_kind(
    entity: &EntityHandle,
    expected: EntityKind,
    operation: &'static str,
) -> Result<()> {
    if entity.kind() == expected {
        Ok(())
    } else {
        Err(ReadError::WrongKind {
            operation,
            expected,
            actual: entity.kind(),
        })
    }
}

/// Dimensions of an entity, in declaration order.
pub fn inquire_dimensions<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
) -> Result<Vec<Dimension>> {
    let negotiated = negotiate_entries(api, entity, EntryCode::Dimensions)?;
    if negotiated.is_empty() {
        return Ok(Vec::new());
    }
    let mut list = negotiated.list_buffer();
    let mut lengths = vec![0u64; negotiated.count];
    check(
        api.inquire_dims(entity.kind(), entity.id(), &mut list, &mut lengths),
        "inquire_dims",
    )?;
    Ok(split_list(&list)
        .into_iter()
        .zip(lengths)
        .map(|(name, length)| Dimension { name, length })
        .collect())
}

/// Fields of one class, in declaration order.
///
/// Geolocation fields exist only in swaths.
pub fn inquire_fields<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    class: FieldClass,
) -> Result<Vec<FieldSummary>> {
    if class == FieldClass::Geo {
        require_kind(entity, EntityKind::Swath, "inquire_geo_fields")?;
    }
    let negotiated = negotiate_entries(api, entity, class.entry_code())?;
    if negotiated.is_empty() {
        return Ok(Vec::new());
    }
    let mut list = negotiated.list_buffer();
    let mut ranks = vec![0i32; negotiated.count];
    let mut number_types = vec![0i32; negotiated.count];
    check(
        api.inquire_fields(
            entity.kind(),
            entity.id(),
            class,
            &mut list,
            &mut ranks,
            &mut number_types,
        ),
        "inquire_fields",
    )?;
    Ok(split_list(&list)
        .into_iter()
        .zip(ranks.into_iter().zip(number_types))
        .map(|(name, (rank, number_type))| FieldSummary {
            name,
            rank,
            number_type,
        })
        .collect())
}

/// Dimension maps of a swath.
pub fn inquire_maps<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
) -> Result<Vec<DimensionMap>> {
    require_kind(entity, EntityKind::Swath, "inquire_maps")?;
    let negotiated = negotiate_entries(api, entity, EntryCode::DimensionMaps)?;
    if negotiated.is_empty() {
        return Ok(Vec::new());
    }
    let mut list = negotiated.list_buffer();
    let mut offsets = vec![0i64; negotiated.count];
    let mut increments = vec![0i64; negotiated.count];
    check(
        api.inquire_maps(entity.id(), &mut list, &mut offsets, &mut increments),
        "inquire_maps",
    )?;
    Ok(split_list(&list)
        .into_iter()
        .zip(offsets.into_iter().zip(increments))
        .map(|(pair, (offset, increment))| {
            let (geo_dim, data_dim) = pair.split_once('/').unwrap_or((pair.as_str(), ""));
            DimensionMap {
                geo_dim: geo_dim.to_string(),
                data_dim: data_dim.to_string(),
                offset,
                increment,
            }
        })
        .collect())
}
