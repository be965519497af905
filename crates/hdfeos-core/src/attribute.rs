//! Attribute reads.
//!
//! The attribute descriptor (number type and element count) decides the
//! buffer: character attributes go into a fixed [`TEXT_ATTR_CAPACITY`]-byte
//! buffer because the native count is unreliable for them, everything else
//! gets a typed buffer of exactly `count` elements. Single-element numeric
//! attributes come back as scalars.

use std::ffi::{CStr, CString};

use serde::Serialize;
use tracing::debug;

use crate::api::{AttrScope, EntityKind, NativeApi};
use crate::buffer::{decode_text, AttrValue, RawBuffer, TypedBuffer};
use crate::error::{ReadError, Result};
use crate::handle::{c_name, EntityHandle};
use crate::list::list_attributes;
use crate::status::{check, FAIL};
use crate::types::{element_type_for, is_text, pointer_kind_for, ElementType};

/// Longest character attribute returned, in bytes.
pub const TEXT_ATTR_CAPACITY: usize = 1000;

/// Where an attribute is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrLocation<'a> {
    /// Attributes of the grid/swath/za.
    Entity,
    /// Data field group attributes (HDF-EOS5 swath and za).
    Group,
    /// Geolocation field group attributes (HDF-EOS5 swath).
    GeoGroup,
    /// Attributes local to the named field (HDF-EOS5).
    Field(&'a str),
}

impl AttrLocation<'_> {
    pub(crate) fn c_field(&self) -> Result<Option<CString>> {
        match self {
            Self::Field(name) => Ok(Some(c_name(name)?)),
            _ => Ok(None),
        }
    }

    pub(crate) fn scope<'c>(&self, field: Option<&'c CStr>) -> AttrScope<'c> {
        match (self, field) {
            (Self::Group, _) => AttrScope::Group,
            (Self::GeoGroup, _) => AttrScope::GeoGroup,
            (Self::Field(_), Some(field)) => AttrScope::Local(field),
            _ => AttrScope::Entity,
        }
    }

    pub(crate) fn ensure_supported<A: NativeApi + ?Sized>(
        &self,
        api: &A,
        kind: EntityKind,
        operation: &'static str,
    ) -> Result<()> {
        let scope = self.scope(Some(c""));
        let generation = api.generation();
        if generation.supports_scope(kind, scope) {
            Ok(())
        } else {
            Err(ReadError::unsupported(operation, generation))
        }
    }
}

/// Number type and element count of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttrDescriptor {
    pub number_type: i32,
    pub count: u64,
}

impl AttrDescriptor {
    pub fn element_type(&self) -> Result<ElementType> {
        element_type_for(self.number_type)
    }

    /// Bytes a native read of this attribute writes. Text gets room for a
    /// terminator; unknown types are sized at the widest element.
    pub fn native_byte_len(&self) -> Option<usize> {
        let count = usize::try_from(self.count).ok()?;
        if is_text(self.number_type) {
            return count.checked_add(1);
        }
        let width = self.element_type().map_or(8, |t| t.size());
        count.checked_mul(width)
    }
}

/// Look up an attribute's number type and element count.
pub fn attribute_info<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    location: AttrLocation<'_>,
    name: &str,
) -> Result<AttrDescriptor> {
    location.ensure_supported(api, entity.kind(), "attr_info")?;
    let field = location.c_field()?;
    let scope = location.scope(field.as_deref());
    let c = c_name(name)?;

    let mut number_type = 0i32;
    let mut count = 0u64;
    check(
        api.attr_info(entity.kind(), entity.id(), scope, &c, &mut number_type, &mut count),
        "attr_info",
    )?;
    Ok(AttrDescriptor { number_type, count })
}

/// Read one attribute.
pub fn read_attribute<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    location: AttrLocation<'_>,
    name: &str,
) -> Result<AttrValue> {
    let info = attribute_info(api, entity, location, name)?;
    let field = location.c_field()?;
    let scope = location.scope(field.as_deref());
    let c = c_name(name)?;
    let kind = pointer_kind_for(info.number_type)?;

    if is_text(info.number_type) {
        let mut text = vec![0u8; TEXT_ATTR_CAPACITY + 1];
        check(
            api.read_attr(entity.kind(), entity.id(), scope, &c, RawBuffer::new(&mut text, kind)),
            "read_attr",
        )?;
        return Ok(AttrValue::Text(decode_text(&text, TEXT_ATTR_CAPACITY)));
    }

    let element = element_type_for(info.number_type)?;
    let len = usize::try_from(info.count).map_err(|_| ReadError::native(FAIL, "attr_info"))?;
    let mut buffer = TypedBuffer::zeroed(element, len);
    check(
        api.read_attr(entity.kind(), entity.id(), scope, &c, buffer.raw(kind)),
        "read_attr",
    )?;
    debug!(name, scope = scope.as_str(), %element, count = len, "read attribute");
    buffer.into_value()
}

/// List and read every attribute at `location`, in declaration order.
pub fn read_attributes<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    location: AttrLocation<'_>,
) -> Result<Vec<(String, AttrValue)>> {
    list_attributes(api, entity, location)?
        .into_iter()
        .map(|name| {
            let value = read_attribute(api, entity, location, &name)?;
            Ok((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_scope() {
        let field = c"Temperature";
        assert_eq!(AttrLocation::Entity.scope(None), AttrScope::Entity);
        assert_eq!(AttrLocation::Group.scope(None), AttrScope::Group);
        assert_eq!(
            AttrLocation::Field("Temperature").scope(Some(field)),
            AttrScope::Local(field)
        );
    }

    #[test]
    fn test_native_byte_len() {
        let text = AttrDescriptor { number_type: 57, count: 4096 };
        assert_eq!(text.native_byte_len(), Some(4097));
        let doubles = AttrDescriptor { number_type: 11, count: 3 };
        assert_eq!(doubles.native_byte_len(), Some(24));
        let unknown = AttrDescriptor { number_type: 7, count: 2 };
        assert_eq!(unknown.native_byte_len(), Some(16));
        let huge = AttrDescriptor { number_type: 11, count: u64::MAX };
        assert_eq!(huge.native_byte_len(), None);
    }

    #[test]
    fn test_location_c_field() {
        assert_eq!(AttrLocation::Entity.c_field().unwrap(), None);
        assert_eq!(
            AttrLocation::Field("Count").c_field().unwrap().unwrap().as_bytes(),
            b"Count"
        );
        assert!(AttrLocation::Field("a\0b").c_field().is_err());
    }
}
