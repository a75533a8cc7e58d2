//! CPU-side resource definitions
//!
//! The data the decal engine reads and rewrites. Nothing here depends on a
//! GPU implementation:
//! - Mesh: geometry plus single or multi material slots
//! - Material: unlit / standard PBR variants with optional channel maps
//! - Texture: immutable original image, optional override, UV transform
//! - Image: shared immutable RGBA8 buffers
//! - Geometry: vertex attributes, index buffer, draw groups

pub mod geometry;
pub mod image;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod texture;

// Re-exports
pub use geometry::{Attribute, Geometry, GeometryGroup, VertexFormat};
pub use image::{Image, decode_rgba};
pub use material::{
    MapChannel, Material, MaterialData, MaterialFeatures, MaterialRef, StandardMaterial,
    UnlitMaterial,
};
pub use mesh::{Mesh, MeshMaterial};
pub use texture::{Texture, TextureTransform};
