//! In-memory HDF-EOS backend for tests.
//!
//! [`StubLibrary`] implements [`NativeApi`] over files described with the
//! builders in this module. It behaves like a native library as far as the
//! core layer can observe: ids are handed out on open/attach, lists are
//! written comma-delimited and NUL-terminated, fields are copied with real
//! start/stride/edge arithmetic, and anything out of bounds returns `-1`.
//!
//! Every entry point is counted, and any entry point can be made to fail
//! with a chosen status, so tests can assert how many native calls an
//! operation made.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::CStr;

use bytemuck::Pod;
use hdfeos_core::{
    AccessMode, AttrDescriptor, AttrScope, ElementType, EntityKind, EntryCode, FieldClass,
    FieldInfoBuffers, Generation, GridInfo, NativeApi, PointerKind, ProjectionInfo, RawBuffer,
};

const FAIL: i64 = -1;

/// Rust element types with a canonical HDF-EOS number type.
pub trait StubElement: Pod {
    const ELEMENT: ElementType;
}

macro_rules! impl_stub_element {
    ($($t:ty => $e:ident),+ $(,)?) => {
        $(impl StubElement for $t {
            const ELEMENT: ElementType = ElementType::$e;
        })+
    };
}

impl_stub_element! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

/// An attribute: number type, element count and native-endian bytes.
#[derive(Debug, Clone)]
pub struct StubAttr {
    pub name: String,
    pub number_type: i32,
    pub count: u64,
    pub data: Vec<u8>,
}

impl StubAttr {
    pub fn numeric<T: StubElement>(name: &str, values: &[T]) -> Self {
        Self {
            name: name.to_string(),
            number_type: T::ELEMENT.type_code(),
            count: values.len() as u64,
            data: bytemuck::cast_slice(values).to_vec(),
        }
    }

    /// A character attribute. The reported count is the text length.
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            number_type: ElementType::Text.type_code(),
            count: value.len() as u64,
            data: value.as_bytes().to_vec(),
        }
    }

    /// An attribute with an arbitrary number type code.
    pub fn raw(name: &str, number_type: i32, count: u64, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            number_type,
            count,
            data,
        }
    }
}

/// A field with its dimension names, shape and row-major contents.
#[derive(Debug, Clone)]
pub struct StubField {
    pub name: String,
    pub class: FieldClass,
    pub dims: Vec<String>,
    pub max_dims: Vec<String>,
    pub shape: Vec<u64>,
    pub number_type: i32,
    pub data: Vec<u8>,
    pub local_attrs: Vec<StubAttr>,
}

impl StubField {
    pub fn new<T: StubElement>(
        name: &str,
        class: FieldClass,
        dims: &[&str],
        shape: &[u64],
        values: &[T],
    ) -> Self {
        assert_eq!(dims.len(), shape.len(), "one dimension name per extent");
        assert_eq!(
            values.len() as u64,
            shape.iter().product::<u64>(),
            "values must fill the shape"
        );
        let dims: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
        Self {
            name: name.to_string(),
            class,
            max_dims: dims.clone(),
            dims,
            shape: shape.to_vec(),
            number_type: T::ELEMENT.type_code(),
            data: bytemuck::cast_slice(values).to_vec(),
            local_attrs: Vec::new(),
        }
    }

    pub fn data<T: StubElement>(name: &str, dims: &[&str], shape: &[u64], values: &[T]) -> Self {
        Self::new(name, FieldClass::Data, dims, shape, values)
    }

    pub fn geo<T: StubElement>(name: &str, dims: &[&str], shape: &[u64], values: &[T]) -> Self {
        Self::new(name, FieldClass::Geo, dims, shape, values)
    }

    /// Report a different number type code than the stored element type.
    pub fn with_number_type(mut self, code: i32) -> Self {
        self.number_type = code;
        self
    }

    pub fn with_max_dims(mut self, max_dims: &[&str]) -> Self {
        self.max_dims = max_dims.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn local_attr(mut self, attr: StubAttr) -> Self {
        self.local_attrs.push(attr);
        self
    }

    fn element_size(&self) -> usize {
        hdfeos_core::element_type_for(self.number_type)
            .map(ElementType::size)
            .unwrap_or(1)
    }
}

/// Swath dimension map.
#[derive(Debug, Clone)]
pub struct StubMap {
    pub geo_dim: String,
    pub data_dim: String,
    pub offset: i64,
    pub increment: i64,
}

/// Grid geometry returned by the grid info entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubGeometry {
    pub info: GridInfo,
    pub projection: ProjectionInfo,
    pub origin: i32,
    pub pixel_registration: i32,
}

/// A grid, swath or za.
#[derive(Debug, Clone)]
pub struct StubEntity {
    pub name: String,
    pub kind: EntityKind,
    pub dims: Vec<(String, u64)>,
    pub fields: Vec<StubField>,
    pub maps: Vec<StubMap>,
    pub attrs: Vec<StubAttr>,
    pub group_attrs: Vec<StubAttr>,
    pub geo_group_attrs: Vec<StubAttr>,
    pub geometry: Option<StubGeometry>,
}

impl StubEntity {
    pub fn new(kind: EntityKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            dims: Vec::new(),
            fields: Vec::new(),
            maps: Vec::new(),
            attrs: Vec::new(),
            group_attrs: Vec::new(),
            geo_group_attrs: Vec::new(),
            geometry: None,
        }
    }

    pub fn grid(name: &str) -> Self {
        Self::new(EntityKind::Grid, name)
    }

    pub fn swath(name: &str) -> Self {
        Self::new(EntityKind::Swath, name)
    }

    pub fn za(name: &str) -> Self {
        Self::new(EntityKind::ZonalAverage, name)
    }

    pub fn dim(mut self, name: &str, length: u64) -> Self {
        self.dims.push((name.to_string(), length));
        self
    }

    pub fn field(mut self, field: StubField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn map(mut self, geo_dim: &str, data_dim: &str, offset: i64, increment: i64) -> Self {
        self.maps.push(StubMap {
            geo_dim: geo_dim.to_string(),
            data_dim: data_dim.to_string(),
            offset,
            increment,
        });
        self
    }

    pub fn attr(mut self, attr: StubAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn group_attr(mut self, attr: StubAttr) -> Self {
        self.group_attrs.push(attr);
        self
    }

    pub fn geo_group_attr(mut self, attr: StubAttr) -> Self {
        self.geo_group_attrs.push(attr);
        self
    }

    pub fn geometry(mut self, geometry: StubGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    fn field_named(&self, name: &CStr) -> Option<&StubField> {
        let name = name.to_str().ok()?;
        self.fields.iter().find(|f| f.name == name)
    }

    fn fields_of(&self, class: FieldClass) -> impl Iterator<Item = &StubField> {
        self.fields.iter().filter(move |f| f.class == class)
    }

    fn attrs_in(&self, scope: AttrScope<'_>) -> Option<&[StubAttr]> {
        match scope {
            AttrScope::Entity => Some(&self.attrs),
            AttrScope::Group => Some(&self.group_attrs),
            AttrScope::GeoGroup => Some(&self.geo_group_attrs),
            AttrScope::Local(field) => self.field_named(field).map(|f| f.local_attrs.as_slice()),
        }
    }
}

/// A file on the stub's virtual filesystem.
#[derive(Debug, Clone)]
pub struct StubFile {
    pub path: String,
    pub entities: Vec<StubEntity>,
}

impl StubFile {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            entities: Vec::new(),
        }
    }

    pub fn entity(mut self, entity: StubEntity) -> Self {
        self.entities.push(entity);
        self
    }

    fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &StubEntity> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }
}

/// In-memory [`NativeApi`] with call counting and failure injection.
pub struct StubLibrary {
    generation: Generation,
    files: Vec<StubFile>,
    next_id: Cell<i64>,
    open_files: RefCell<HashMap<i64, usize>>,
    attached: RefCell<HashMap<i64, (usize, usize)>>,
    calls: RefCell<HashMap<&'static str, usize>>,
    failures: RefCell<HashMap<&'static str, i64>>,
    pointer_kinds: RefCell<Vec<PointerKind>>,
    under_report_dims: bool,
}

impl StubLibrary {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            files: Vec::new(),
            next_id: Cell::new(1000),
            open_files: RefCell::new(HashMap::new()),
            attached: RefCell::new(HashMap::new()),
            calls: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashMap::new()),
            pointer_kinds: RefCell::new(Vec::new()),
            under_report_dims: false,
        }
    }

    pub fn with_file(mut self, file: StubFile) -> Self {
        self.files.push(file);
        self
    }

    /// Report a dimension list length of 1 from `nentries`, the way some
    /// native builds under-report it.
    pub fn under_report_dim_size(mut self) -> Self {
        self.under_report_dims = true;
        self
    }

    /// Make every later call to `operation` return `status`.
    pub fn fail_on(&self, operation: &'static str, status: i64) {
        self.failures.borrow_mut().insert(operation, status);
    }

    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
    }

    /// Number of calls made to `operation`.
    pub fn calls(&self, operation: &str) -> usize {
        self.calls.borrow().get(operation).copied().unwrap_or(0)
    }

    /// Number of calls made to every entry point.
    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
        self.pointer_kinds.borrow_mut().clear();
    }

    /// Pointer kinds of every buffer lent to `read_attr` and `read_field`.
    pub fn pointer_kinds(&self) -> Vec<PointerKind> {
        self.pointer_kinds.borrow().clone()
    }

    /// Files still open.
    pub fn open_file_count(&self) -> usize {
        self.open_files.borrow().len()
    }

    /// Entities still attached.
    pub fn attached_count(&self) -> usize {
        self.attached.borrow().len()
    }

    /// Count the call and return the injected failure, if any.
    fn enter(&self, operation: &'static str) -> Option<i64> {
        *self.calls.borrow_mut().entry(operation).or_default() += 1;
        self.failures.borrow().get(operation).copied()
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn file(&self, path: &CStr) -> Option<(usize, &StubFile)> {
        let path = path.to_str().ok()?;
        self.files.iter().enumerate().find(|(_, f)| f.path == path)
    }

    fn entity(&self, kind: EntityKind, entity_id: i64) -> Option<&StubEntity> {
        let (file, index) = *self.attached.borrow().get(&entity_id)?;
        let entity = self.files.get(file)?.entities.get(index)?;
        (entity.kind == kind).then_some(entity)
    }

    fn grid(&self, grid_id: i64) -> Option<StubGeometry> {
        self.entity(EntityKind::Grid, grid_id)?.geometry
    }
}

/// Write `text` NUL-terminated into `buffer`; false if it does not fit.
fn write_list(buffer: &mut [u8], text: &str) -> bool {
    if buffer.len() <= text.len() {
        return false;
    }
    buffer[..text.len()].copy_from_slice(text.as_bytes());
    buffer[text.len()] = 0;
    true
}

fn join<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(",")
}

/// Copy a strided selection of a row-major array into `out`.
fn strided_copy(
    src: &[u8],
    shape: &[u64],
    element_size: usize,
    start: &[u64],
    stride: &[u64],
    edge: &[u64],
    out: &mut [u8],
) -> bool {
    let rank = shape.len();
    if start.len() != rank || stride.len() != rank || edge.len() != rank {
        return false;
    }
    for d in 0..rank {
        if edge[d] == 0 || stride[d] == 0 || start[d] + (edge[d] - 1) * stride[d] >= shape[d] {
            return false;
        }
    }
    let count: u64 = edge.iter().product();
    if out.len() as u64 != count * element_size as u64 {
        return false;
    }

    let mut src_strides = vec![1u64; rank];
    for d in (0..rank.saturating_sub(1)).rev() {
        src_strides[d] = src_strides[d + 1] * shape[d + 1];
    }

    let mut index = vec![0u64; rank];
    for i in 0..count as usize {
        let offset: u64 = (0..rank)
            .map(|d| (start[d] + index[d] * stride[d]) * src_strides[d])
            .sum();
        let from = offset as usize * element_size;
        out[i * element_size..(i + 1) * element_size]
            .copy_from_slice(&src[from..from + element_size]);

        for d in (0..rank).rev() {
            index[d] += 1;
            if index[d] < edge[d] {
                break;
            }
            index[d] = 0;
        }
    }
    true
}

impl NativeApi for StubLibrary {
    fn generation(&self) -> Generation {
        self.generation
    }

    fn open(&self, kind: EntityKind, path: &CStr, _access: AccessMode) -> i64 {
        if let Some(status) = self.enter("open") {
            return status;
        }
        if !self.generation.supports_kind(kind) {
            return FAIL;
        }
        let Some((index, _)) = self.file(path) else {
            return FAIL;
        };
        let id = self.allocate_id();
        self.open_files.borrow_mut().insert(id, index);
        id
    }

    fn close(&self, _kind: EntityKind, file_id: i64) -> i64 {
        if let Some(status) = self.enter("close") {
            return status;
        }
        match self.open_files.borrow_mut().remove(&file_id) {
            Some(_) => 0,
            None => FAIL,
        }
    }

    fn attach(&self, kind: EntityKind, file_id: i64, name: &CStr) -> i64 {
        if let Some(status) = self.enter("attach") {
            return status;
        }
        let Some(&file) = self.open_files.borrow().get(&file_id) else {
            return FAIL;
        };
        let Ok(name) = name.to_str() else {
            return FAIL;
        };
        let found = self.files[file]
            .entities
            .iter()
            .position(|e| e.kind == kind && e.name == name);
        match found {
            Some(index) => {
                let id = self.allocate_id();
                self.attached.borrow_mut().insert(id, (file, index));
                id
            }
            None => FAIL,
        }
    }

    fn detach(&self, _kind: EntityKind, entity_id: i64) -> i64 {
        if let Some(status) = self.enter("detach") {
            return status;
        }
        match self.attached.borrow_mut().remove(&entity_id) {
            Some(_) => 0,
            None => FAIL,
        }
    }

    fn inquire_entities(
        &self,
        kind: EntityKind,
        path: &CStr,
        list: Option<&mut [u8]>,
        size: &mut i64,
    ) -> i64 {
        if let Some(status) = self.enter("inquire_entities") {
            return status;
        }
        let Some((_, file)) = self.file(path) else {
            return FAIL;
        };
        let text = join(file.of_kind(kind).map(|e| e.name.as_str()));
        *size = text.len() as i64;
        if let Some(buffer) = list {
            if !write_list(buffer, &text) {
                return FAIL;
            }
        }
        file.of_kind(kind).count() as i64
    }

    fn nentries(&self, kind: EntityKind, entity_id: i64, entry: EntryCode, size: &mut i64) -> i64 {
        if let Some(status) = self.enter("nentries") {
            return status;
        }
        let Some(entity) = self.entity(kind, entity_id) else {
            return FAIL;
        };
        let (count, text) = match entry {
            EntryCode::Dimensions => (
                entity.dims.len(),
                join(entity.dims.iter().map(|(n, _)| n.as_str())),
            ),
            EntryCode::DimensionMaps => (
                entity.maps.len(),
                entity
                    .maps
                    .iter()
                    .map(|m| format!("{}/{}", m.geo_dim, m.data_dim))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            EntryCode::IndexedMaps => (0, String::new()),
            EntryCode::GeoFields => (
                entity.fields_of(FieldClass::Geo).count(),
                join(entity.fields_of(FieldClass::Geo).map(|f| f.name.as_str())),
            ),
            EntryCode::DataFields => (
                entity.fields_of(FieldClass::Data).count(),
                join(entity.fields_of(FieldClass::Data).map(|f| f.name.as_str())),
            ),
        };
        *size = if entry == EntryCode::Dimensions && self.under_report_dims {
            1
        } else {
            text.len() as i64
        };
        count as i64
    }

    fn inquire_dims(
        &self,
        kind: EntityKind,
        entity_id: i64,
        list: &mut [u8],
        lengths: &mut [u64],
    ) -> i64 {
        if let Some(status) = self.enter("inquire_dims") {
            return status;
        }
        let Some(entity) = self.entity(kind, entity_id) else {
            return FAIL;
        };
        if lengths.len() < entity.dims.len()
            || !write_list(list, &join(entity.dims.iter().map(|(n, _)| n.as_str())))
        {
            return FAIL;
        }
        for (slot, (_, length)) in lengths.iter_mut().zip(&entity.dims) {
            *slot = *length;
        }
        entity.dims.len() as i64
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
        if let Some(status) = self.enter("inquire_fields") {
            return status;
        }
        let Some(entity) = self.entity(kind, entity_id) else {
            return FAIL;
        };
        let fields: Vec<&StubField> = entity.fields_of(class).collect();
        if ranks.len() < fields.len()
            || number_types.len() < fields.len()
            || !write_list(list, &join(fields.iter().map(|f| f.name.as_str())))
        {
            return FAIL;
        }
        for (i, field) in fields.iter().enumerate() {
            ranks[i] = field.shape.len() as i32;
            number_types[i] = field.number_type;
        }
        fields.len() as i64
    }

    fn inquire_maps(
        &self,
        entity_id: i64,
        list: &mut [u8],
        offsets: &mut [i64],
        increments: &mut [i64],
    ) -> i64 {
        if let Some(status) = self.enter("inquire_maps") {
            return status;
        }
        let Some(entity) = self.entity(EntityKind::Swath, entity_id) else {
            return FAIL;
        };
        let text = entity
            .maps
            .iter()
            .map(|m| format!("{}/{}", m.geo_dim, m.data_dim))
            .collect::<Vec<_>>()
            .join(",");
        if offsets.len() < entity.maps.len()
            || increments.len() < entity.maps.len()
            || !write_list(list, &text)
        {
            return FAIL;
        }
        for (i, map) in entity.maps.iter().enumerate() {
            offsets[i] = map.offset;
            increments[i] = map.increment;
        }
        entity.maps.len() as i64
    }

    fn field_info(
        &self,
        kind: EntityKind,
        entity_id: i64,
        field: &CStr,
        out: FieldInfoBuffers<'_>,
    ) -> i64 {
        if let Some(status) = self.enter("field_info") {
            return status;
        }
        let Some(field) = self
            .entity(kind, entity_id)
            .and_then(|e| e.field_named(field))
        else {
            return FAIL;
        };
        if out.dims.len() < field.shape.len() {
            return FAIL;
        }
        if !write_list(out.dim_list, &field.dims.join(",")) {
            return FAIL;
        }
        if let Some(max_dim_list) = out.max_dim_list {
            if !write_list(max_dim_list, &field.max_dims.join(",")) {
                return FAIL;
            }
        }
        *out.rank = field.shape.len() as i32;
        out.dims[..field.shape.len()].copy_from_slice(&field.shape);
        *out.number_type = field.number_type;
        0
    }

    fn inquire_attrs(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        list: Option<&mut [u8]>,
        size: &mut i64,
    ) -> i64 {
        if let Some(status) = self.enter("inquire_attrs") {
            return status;
        }
        if !self.generation.supports_scope(kind, scope) {
            return FAIL;
        }
        let Some(attrs) = self.entity(kind, entity_id).and_then(|e| e.attrs_in(scope)) else {
            return FAIL;
        };
        let text = join(attrs.iter().map(|a| a.name.as_str()));
        *size = text.len() as i64;
        if let Some(buffer) = list {
            if !write_list(buffer, &text) {
                return FAIL;
            }
        }
        attrs.len() as i64
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
        if let Some(status) = self.enter("attr_info") {
            return status;
        }
        let Some(attr) = self.attr(kind, entity_id, scope, name) else {
            return FAIL;
        };
        *number_type = attr.number_type;
        *count = attr.count;
        0
    }

    fn read_attr(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        name: &CStr,
        mut buffer: RawBuffer<'_>,
    ) -> i64 {
        if let Some(status) = self.enter("read_attr") {
            return status;
        }
        self.pointer_kinds.borrow_mut().push(buffer.kind());
        let Some(attr) = self.attr(kind, entity_id, scope, name) else {
            return FAIL;
        };
        let descriptor = AttrDescriptor {
            number_type: attr.number_type,
            count: attr.count,
        };
        let Some(needed) = descriptor.native_byte_len() else {
            return FAIL;
        };
        // Like the native libraries, the write covers the whole attribute
        // whatever the region holds.
        buffer.staged(needed, |mut target| {
            let bytes = target.as_bytes_mut();
            assert!(
                attr.data.len() <= bytes.len(),
                "read_attr wrote {} bytes into a {}-byte region",
                attr.data.len(),
                bytes.len()
            );
            bytes[..attr.data.len()].copy_from_slice(&attr.data);
            0
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
        if let Some(status) = self.enter("read_field") {
            return status;
        }
        self.pointer_kinds.borrow_mut().push(buffer.kind());
        let Some(field) = self
            .entity(kind, entity_id)
            .and_then(|e| e.field_named(field))
        else {
            return FAIL;
        };
        let copied = strided_copy(
            &field.data,
            &field.shape,
            field.element_size(),
            start,
            stride,
            edge,
            buffer.as_bytes_mut(),
        );
        if copied {
            0
        } else {
            FAIL
        }
    }

    fn grid_info(&self, grid_id: i64, out: &mut GridInfo) -> i64 {
        if let Some(status) = self.enter("grid_info") {
            return status;
        }
        match self.grid(grid_id) {
            Some(geometry) => {
                *out = geometry.info;
                0
            }
            None => FAIL,
        }
    }

    fn projection_info(&self, grid_id: i64, out: &mut ProjectionInfo) -> i64 {
        if let Some(status) = self.enter("projection_info") {
            return status;
        }
        match self.grid(grid_id) {
            Some(geometry) => {
                *out = geometry.projection;
                0
            }
            None => FAIL,
        }
    }

    fn origin_info(&self, grid_id: i64, origin_code: &mut i32) -> i64 {
        if let Some(status) = self.enter("origin_info") {
            return status;
        }
        match self.grid(grid_id) {
            Some(geometry) => {
                *origin_code = geometry.origin;
                0
            }
            None => FAIL,
        }
    }

    fn pixel_registration_info(&self, grid_id: i64, pixreg_code: &mut i32) -> i64 {
        if let Some(status) = self.enter("pixel_registration_info") {
            return status;
        }
        match self.grid(grid_id) {
            Some(geometry) => {
                *pixreg_code = geometry.pixel_registration;
                0
            }
            None => FAIL,
        }
    }
}

impl StubLibrary {
    fn attr(
        &self,
        kind: EntityKind,
        entity_id: i64,
        scope: AttrScope<'_>,
        name: &CStr,
    ) -> Option<&StubAttr> {
        if !self.generation.supports_scope(kind, scope) {
            return None;
        }
        let name = name.to_str().ok()?;
        self.entity(kind, entity_id)?
            .attrs_in(scope)?
            .iter()
            .find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strided_copy_2d() {
        // 3x4 array of i32, values 0..12
        let values: Vec<i32> = (0..12).collect();
        let src = bytemuck::cast_slice::<i32, u8>(&values);
        let mut out = vec![0u8; 4 * 4];
        assert!(strided_copy(src, &[3, 4], 4, &[1, 0], &[1, 2], &[2, 2], &mut out));
        let got: Vec<i32> = out
            .chunks_exact(4)
            .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(got, vec![4, 6, 8, 10]);
    }

    #[test]
    fn test_strided_copy_out_of_bounds() {
        let values = [0u8; 10];
        let mut out = vec![0u8; 3];
        assert!(!strided_copy(&values, &[10], 1, &[5], &[3], &[3], &mut out));
    }

    #[test]
    fn test_write_list_needs_terminator_room() {
        let mut buf = [0xffu8; 5];
        assert!(!write_list(&mut buf, "abcde"));
        assert!(write_list(&mut buf, "abcd"));
        assert_eq!(&buf, b"abcd\0");
    }

    #[test]
    #[should_panic(expected = "wrote 6 bytes into a 4-byte region")]
    fn test_read_attr_catches_overrun() {
        // A reported count smaller than the stored text defeats staging.
        let lib = StubLibrary::new(Generation::Hdfeos5).with_file(
            StubFile::new("a.h5").entity(StubEntity::grid("G").attr(StubAttr::raw(
                "Title",
                ElementType::Text.type_code(),
                1,
                b"abcdef".to_vec(),
            ))),
        );
        let mut bytes = [0u8; 4];
        let file = lib.open(EntityKind::Grid, c"a.h5", AccessMode::ReadOnly);
        let grid = lib.attach(EntityKind::Grid, file, c"G");
        lib.read_attr(
            EntityKind::Grid,
            grid,
            AttrScope::Entity,
            c"Title",
            RawBuffer::new(&mut bytes, PointerKind::Char),
        );
    }

    #[test]
    fn test_failure_injection_counts_call() {
        let lib = StubLibrary::new(Generation::Hdfeos5);
        lib.fail_on("open", -7);
        assert_eq!(lib.open(EntityKind::Swath, c"x.h5", AccessMode::ReadOnly), -7);
        assert_eq!(lib.calls("open"), 1);
    }
}
