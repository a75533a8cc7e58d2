use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Well-known attribute names.
pub const ATTR_POSITION: &str = "position";
pub const ATTR_NORMAL: &str = "normal";
pub const ATTR_UV: &str = "uv";

/// Element layout of an attribute or index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    Uint16,
    Uint32,
}

impl VertexFormat {
    #[must_use]
    pub fn size(self) -> u64 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
            VertexFormat::Uint16 => 2,
            VertexFormat::Uint32 => 4,
        }
    }
}

/// Attribute holds CPU-side data (`Arc<Vec<u8>>`) and metadata.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// CPU-side data shared via Arc (supports interleaved buffers)
    pub data: Arc<Vec<u8>>,

    /// Data version for change detection
    pub version: u64,

    pub format: VertexFormat,
    pub offset: u64,
    pub count: u32,
    pub stride: u64,
}

static NEXT_ATTR_VERSION: AtomicU64 = AtomicU64::new(1);

impl Attribute {
    /// Tightly packed attribute over its own buffer.
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        let raw_data = bytemuck::cast_slice(data).to_vec();

        Self {
            data: Arc::new(raw_data),
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format,
            offset: 0,
            count: data.len() as u32,
            stride: std::mem::size_of::<T>() as u64,
        }
    }

    /// View into an interleaved buffer. Several attributes may share `data`.
    pub fn new_interleaved(
        data: Arc<Vec<u8>>,
        format: VertexFormat,
        offset: u64,
        count: u32,
        stride: u64,
    ) -> Self {
        Self {
            data,
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format,
            offset,
            count,
            stride,
        }
    }

    /// Reads element `i` as `T`. Out-of-range reads return `None`.
    pub fn read<T: bytemuck::Pod>(&self, i: u32) -> Option<T> {
        if i >= self.count {
            return None;
        }
        let start = self.offset as usize + (i as usize) * self.stride as usize;
        let end = start + std::mem::size_of::<T>();
        let bytes = self.data.get(start..end)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn read_vec2(&self, i: u32) -> Option<Vec2> {
        if self.format != VertexFormat::Float32x2 {
            return None;
        }
        self.read::<[f32; 2]>(i).map(Vec2::from_array)
    }

    /// Reads an index element, widening u16 indices.
    pub fn read_index(&self, i: u32) -> Option<u32> {
        match self.format {
            VertexFormat::Uint16 => self.read::<u16>(i).map(u32::from),
            VertexFormat::Uint32 => self.read::<u32>(i),
            _ => None,
        }
    }
}

/// A contiguous index range rendered with one material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    /// First index (or vertex, for non-indexed geometry) of the range.
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

#[derive(Debug)]
pub struct Geometry {
    pub uuid: Uuid,

    data_version: u64,

    attributes: FxHashMap<String, Attribute>,
    index_attribute: Option<Attribute>,
    groups: Vec<GeometryGroup>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            data_version: 0,
            attributes: FxHashMap::default(),
            index_attribute: None,
            groups: Vec::new(),
        }
    }

    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    // Attributes accessors
    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        self.attributes.insert(name.to_string(), attr);
        self.data_version = self.data_version.wrapping_add(1);
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let removed = self.attributes.remove(name);
        if removed.is_some() {
            self.data_version = self.data_version.wrapping_add(1);
        }
        removed
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    // Index attribute accessors
    pub fn index_attribute(&self) -> Option<&Attribute> {
        self.index_attribute.as_ref()
    }

    pub fn set_indices(&mut self, indices: &[u16]) {
        self.index_attribute = Some(Attribute::new_planar(indices, VertexFormat::Uint16));
        self.data_version = self.data_version.wrapping_add(1);
    }

    pub fn set_indices_u32(&mut self, indices: &[u32]) {
        self.index_attribute = Some(Attribute::new_planar(indices, VertexFormat::Uint32));
        self.data_version = self.data_version.wrapping_add(1);
    }

    // Draw groups (multi-material)
    pub fn groups(&self) -> &[GeometryGroup] {
        &self.groups
    }

    pub fn add_group(&mut self, start: u32, count: u32, material_index: usize) {
        self.groups.push(GeometryGroup {
            start,
            count,
            material_index,
        });
        self.data_version = self.data_version.wrapping_add(1);
    }

    /// Number of vertices, taken from the position attribute or the UVs.
    pub fn vertex_count(&self) -> u32 {
        self.get_attribute(ATTR_POSITION)
            .or_else(|| self.get_attribute(ATTR_UV))
            .map_or(0, |a| a.count)
    }

    /// Length of the element stream groups index into: the index buffer when
    /// present, otherwise the vertex list.
    pub fn element_count(&self) -> u32 {
        self.index_attribute
            .as_ref()
            .map_or_else(|| self.vertex_count(), |a| a.count)
    }

    /// Resolves element `i` of the draw stream to a vertex index.
    pub fn vertex_at(&self, i: u32) -> Option<u32> {
        match &self.index_attribute {
            Some(index) => index.read_index(i),
            None => (i < self.vertex_count()).then_some(i),
        }
    }
}
