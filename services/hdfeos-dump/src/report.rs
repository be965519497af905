//! JSON reports over any `NativeApi` backend.

use std::path::Path;

use hdfeos_core::{
    attach, close, detach, field_info, grid_info, inquire_dimensions, inquire_fields,
    inquire_maps, list_attributes, list_entities, open, origin_info, pixel_registration_info,
    projection_info, read_attribute, read_field, read_field_full, AccessMode, AttrLocation,
    AttrScope, AttrValue, Dimension, DimensionMap, ElementType, EntityHandle, EntityKind,
    FieldClass, FieldDescriptor, FileHandle, Generation, GridInfo, NativeApi, Origin,
    PixelRegistration, ProjectionInfo, ReadError, Result, TypedArray,
};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub generation: Generation,
    pub entities: Vec<EntityReport>,
}

#[derive(Debug, Serialize)]
pub struct EntityReport {
    pub name: String,
    pub kind: EntityKind,
    pub dimensions: Vec<Dimension>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geo_fields: Vec<FieldReport>,
    pub data_fields: Vec<FieldReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimension_maps: Vec<DimensionMap>,
    pub attributes: Vec<AttrEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_attributes: Vec<AttrEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geo_group_attributes: Vec<AttrEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridReport>,
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub name: String,
    #[serde(flatten)]
    pub info: FieldDescriptor,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttrEntry>,
}

/// One attribute. Unreadable attributes keep their name and carry the error.
#[derive(Debug, Serialize)]
pub struct AttrEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<AttrValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GridReport {
    #[serde(flatten)]
    pub info: GridInfo,
    pub projection: ProjectionInfo,
    pub origin: Origin,
    pub pixel_registration: PixelRegistration,
}

#[derive(Debug, Serialize)]
pub struct FieldData {
    pub entity: String,
    pub field: String,
    pub element_type: ElementType,
    pub shape: Vec<usize>,
    pub values: TypedArray,
}

/// Describe every entity of every kind the backend supports.
pub fn describe_file<A: NativeApi + ?Sized>(api: &A, path: &Path) -> Result<FileReport> {
    let generation = api.generation();
    let mut entities = Vec::new();

    for kind in EntityKind::ALL {
        if !generation.supports_kind(kind) {
            continue;
        }
        let names = list_entities(api, kind, path)?;
        if names.is_empty() {
            continue;
        }
        debug!(%kind, count = names.len(), "describing entities");

        let file = open(api, kind, path, AccessMode::ReadOnly)?;
        let described = describe_entities(api, &file, &names);
        close(api, file)?;
        entities.extend(described?);
    }

    Ok(FileReport {
        path: path.display().to_string(),
        generation,
        entities,
    })
}

fn describe_entities<A: NativeApi + ?Sized>(
    api: &A,
    file: &FileHandle,
    names: &[String],
) -> Result<Vec<EntityReport>> {
    let mut reports = Vec::with_capacity(names.len());
    for name in names {
        let entity = attach(api, file, name)?;
        let report = describe_entity(api, &entity, name);
        detach(api, entity)?;
        reports.push(report?);
    }
    Ok(reports)
}

/// Describe one attached entity.
pub fn describe_entity<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    name: &str,
) -> Result<EntityReport> {
    let kind = entity.kind();
    let generation = api.generation();

    let geo_fields = if kind == EntityKind::Swath {
        describe_fields(api, entity, FieldClass::Geo)?
    } else {
        Vec::new()
    };
    let data_fields = describe_fields(api, entity, FieldClass::Data)?;

    let dimension_maps = if kind == EntityKind::Swath {
        inquire_maps(api, entity)?
    } else {
        Vec::new()
    };

    let group_attributes = if generation.supports_scope(kind, AttrScope::Group) {
        collect_attributes(api, entity, AttrLocation::Group)?
    } else {
        Vec::new()
    };
    let geo_group_attributes = if generation.supports_scope(kind, AttrScope::GeoGroup) {
        collect_attributes(api, entity, AttrLocation::GeoGroup)?
    } else {
        Vec::new()
    };

    let grid = if kind == EntityKind::Grid {
        Some(GridReport {
            info: grid_info(api, entity)?,
            projection: projection_info(api, entity)?,
            origin: origin_info(api, entity)?,
            pixel_registration: pixel_registration_info(api, entity)?,
        })
    } else {
        None
    };

    Ok(EntityReport {
        name: name.to_string(),
        kind,
        dimensions: inquire_dimensions(api, entity)?,
        geo_fields,
        data_fields,
        dimension_maps,
        attributes: collect_attributes(api, entity, AttrLocation::Entity)?,
        group_attributes,
        geo_group_attributes,
        grid,
    })
}

fn describe_fields<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    class: FieldClass,
) -> Result<Vec<FieldReport>> {
    let local = api.generation().supports_scope(entity.kind(), AttrScope::Local(c"field"));
    inquire_fields(api, entity, class)?
        .into_iter()
        .map(|summary| {
            let attributes = if local {
                collect_attributes(api, entity, AttrLocation::Field(&summary.name))?
            } else {
                Vec::new()
            };
            Ok(FieldReport {
                info: field_info(api, entity, &summary.name)?,
                name: summary.name,
                attributes,
            })
        })
        .collect()
}

fn collect_attributes<A: NativeApi + ?Sized>(
    api: &A,
    entity: &EntityHandle,
    location: AttrLocation<'_>,
) -> Result<Vec<AttrEntry>> {
    let names = list_attributes(api, entity, location)?;
    Ok(names
        .into_iter()
        .map(|name| match read_attribute(api, entity, location, &name) {
            Ok(value) => AttrEntry {
                name,
                value: Some(value),
                error: None,
            },
            Err(err) => {
                warn!(attribute = %name, error = %err, "Skipping unreadable attribute");
                AttrEntry {
                    name,
                    value: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect())
}

/// A hyperslab request. Empty vectors mean "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: Vec<usize>,
    pub stride: Vec<usize>,
    pub edge: Vec<usize>,
}

impl Selection {
    /// Nothing was given: read the full extent.
    pub fn is_full(&self) -> bool {
        self.start.is_empty() && self.stride.is_empty() && self.edge.is_empty()
    }

    /// Fill omitted start (zeros) and stride (ones) to the edge rank.
    pub fn complete(&self) -> Selection {
        let rank = self.edge.len();
        Selection {
            start: if self.start.is_empty() { vec![0; rank] } else { self.start.clone() },
            stride: if self.stride.is_empty() { vec![1; rank] } else { self.stride.clone() },
            edge: self.edge.clone(),
        }
    }
}

/// Read one field of a named entity.
pub fn read_entity_field<A: NativeApi + ?Sized>(
    api: &A,
    path: &Path,
    kind: EntityKind,
    entity_name: &str,
    field: &str,
    selection: &Selection,
) -> Result<FieldData> {
    let file = open(api, kind, path, AccessMode::ReadOnly)?;
    let entity = match attach(api, &file, entity_name) {
        Ok(entity) => entity,
        Err(err) => {
            close(api, file)?;
            return Err(err);
        }
    };

    let values = if selection.is_full() {
        read_field_full(api, &entity, field)
    } else if selection.edge.is_empty() {
        Err(ReadError::InvalidSelection {
            dim: 0,
            reason: "edge is required when start or stride is given",
        })
    } else {
        let s = selection.complete();
        read_field(api, &entity, field, &s.start, &s.stride, &s.edge)
    };

    detach(api, entity)?;
    close(api, file)?;

    let values = values?;
    Ok(FieldData {
        entity: entity_name.to_string(),
        field: field.to_string(),
        element_type: values.element_type(),
        shape: values.shape().to_vec(),
        values,
    })
}
