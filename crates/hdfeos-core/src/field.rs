//! Field introspection and strided field reads.

use serde::Serialize;
use tracing::debug;

use crate::api::{EntryCode, FieldInfoBuffers, Generation, NativeApi, MAX_RANK};
use crate::buffer::{TypedArray, TypedBuffer};
use crate::error::{ReadError, Result};
use crate::handle::{c_name, EntityHandle};
use crate::list::{negotiate_entries, split_list};
use crate::status::check;
use crate::types::{element_type_for, pointer_kind_for, ElementType};

/// Rank, shape, number type and dimension names of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub rank: usize,
    /// Extent of each dimension, in declaration order.
    pub shape: Vec<u64>,
    pub number_type: i32,
    /// Dimension names, in declaration order.
    pub dimensions: Vec<String>,
    /// Maximum dimension names for unlimited dimensions (HDF-EOS5 only).
    pub max_dimensions: Option<Vec<String>>,
}

impl FieldDescriptor {
    pub fn element_type(&self) -> Result<ElementType> {
        element_type_for(self.number_type)
    }

    /// Number of elements in the full extent.
    pub fn len(&self) -> u64 {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Introspect a field.
///
/// The dimension-name buffers are sized by dimension negotiation, so they
/// get the dimension list floor.
pub fn field_info<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    name: &str,
) -> Result<FieldDescriptor> {
    let c = c_name(name)?;
    let negotiated = negotiate_entries(api, entity, EntryCode::Dimensions)?;
    let mut dim_list = negotiated.list_buffer();
    let mut max_dim_list = negotiated.list_buffer();
    let has_max = api.generation() == Generation::Hdfeos5;

    let mut rank = 0i32;
    let mut dims = [0u64; MAX_RANK];
    let mut number_type = 0i32;
    let out = FieldInfoBuffers {
        rank: &mut rank,
        dims: &mut dims,
        number_type: &mut number_type,
        dim_list: &mut dim_list,
        max_dim_list: has_max.then_some(max_dim_list.as_mut_slice()),
    };
    check(api.field_info(entity.kind(), entity.id(), &c, out), "field_info")?;

    let rank = usize::try_from(rank)
        .ok()
        .filter(|&r| r <= MAX_RANK)
        .ok_or(ReadError::RankTooLarge { rank: rank as i64 })?;

    Ok(FieldDescriptor {
        rank,
        shape: dims[..rank].to_vec(),
        number_type,
        dimensions: split_list(&dim_list),
        max_dimensions: has_max.then(|| split_list(&max_dim_list)),
    })
}

/// Check a start/stride/edge selection against a field rank and widen it
/// to the native index type.
fn native_selection(
    rank: usize,
    start: &[usize],
    stride: &[usize],
    edge: &[usize],
) -> Result<(Vec<u64>, Vec<u64>, Vec<u64>)> {
    if start.len() != rank || stride.len() != rank || edge.len() != rank {
        return Err(ReadError::ShapeMismatch {
            rank,
            start: start.len(),
            stride: stride.len(),
            edge: edge.len(),
        });
    }
    for dim in 0..rank {
        if edge[dim] == 0 {
            return Err(ReadError::InvalidSelection {
                dim,
                reason: "edge must be at least 1",
            });
        }
        if stride[dim] == 0 {
            return Err(ReadError::InvalidSelection {
                dim,
                reason: "stride must be at least 1",
            });
        }
    }
    let widen = |v: &[usize]| v.iter().map(|&x| x as u64).collect::<Vec<_>>();
    Ok((widen(start), widen(stride), widen(edge)))
}

/// Read a strided sub-rectangle of a field.
///
/// The result has shape exactly `edge`, in row-major order following the
/// field's dimension list. Bounds are enforced by the native layer.
pub fn read_field<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    name: &str,
    start: &[usize],
    stride: &[usize],
    edge: &[usize],
) -> Result<TypedArray> {
    // Selections that disagree among themselves fail before any native call.
    if start.len() != edge.len() || stride.len() != edge.len() {
        return Err(ReadError::ShapeMismatch {
            rank: edge.len(),
            start: start.len(),
            stride: stride.len(),
            edge: edge.len(),
        });
    }

    let info = field_info(api, entity, name)?;
    let (start64, stride64, edge64) = native_selection(info.rank, start, stride, edge)?;
    let element = element_type_for(info.number_type)?;
    let kind = pointer_kind_for(info.number_type)?;

    let len = edge
        .iter()
        .try_fold(1usize, |acc, &e| acc.checked_mul(e))
        .ok_or(ReadError::InvalidSelection {
            dim: 0,
            reason: "selection is too large to allocate",
        })?;
    let mut buffer = TypedBuffer::zeroed(element, len);

    let c = c_name(name)?;
    check(
        api.read_field(
            entity.kind(),
            entity.id(),
            &c,
            &start64,
            &stride64,
            &edge64,
            buffer.raw(kind),
        ),
        "read_field",
    )?;
    debug!(field = name, %element, ?edge, "read field");
    buffer.into_array(edge)
}

/// Read the full declared extent of a field.
pub fn read_field_full<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    name: &str,
) -> Result<TypedArray> {
    let info = field_info(api, entity, name)?;
    let shape: Vec<usize> = info.shape.iter().map(|&d| d as usize).collect();
    if shape.iter().any(|&d| d == 0) {
        // Unlimited dimension with nothing written yet.
        return TypedBuffer::zeroed(info.element_type()?, 0).into_array(&shape);
    }
    let start = vec![0; info.rank];
    let stride = vec![1; info.rank];
    read_field(api, entity, name, &start, &stride, &shape)
}
