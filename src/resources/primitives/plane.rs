use glam::Vec2;

use crate::resources::geometry::{ATTR_NORMAL, ATTR_POSITION, ATTR_UV, Attribute, Geometry, VertexFormat};

pub struct PlaneOptions {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// UV rectangle `(min, max)` the plane is unwrapped onto. Defaults to
    /// the unit square; a sub-rectangle models an island inside an atlas.
    pub uv_rect: (Vec2, Vec2),
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
            uv_rect: (Vec2::ZERO, Vec2::ONE),
        }
    }
}

#[must_use]
pub fn create_plane(options: PlaneOptions) -> Geometry {
    let width_half = options.width / 2.0;
    let height_half = options.height / 2.0;

    let grid_x = options.width_segments.max(1);
    let grid_y = options.height_segments.max(1);

    let grid_x1 = grid_x + 1;
    let grid_y1 = grid_y + 1;

    let segment_width = options.width / grid_x as f32;
    let segment_height = options.height / grid_y as f32;

    let (uv_min, uv_max) = options.uv_rect;
    let uv_span = uv_max - uv_min;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for iy in 0..grid_y1 {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..grid_x1 {
            let x = ix as f32 * segment_width - width_half;

            positions.push([x, -y, 0.0]); // -y so V grows upward
            normals.push([0.0, 0.0, 1.0]);

            let local = Vec2::new(ix as f32 / grid_x as f32, 1.0 - (iy as f32 / grid_y as f32));
            uvs.push((uv_min + local * uv_span).to_array());
        }
    }

    // Indices
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + grid_x1 * iy;
            let b = ix + grid_x1 * (iy + 1);
            let c = (ix + 1) + grid_x1 * (iy + 1);
            let d = (ix + 1) + grid_x1 * iy;

            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    let mut geo = Geometry::new();
    geo.set_attribute(
        ATTR_POSITION,
        Attribute::new_planar(&positions, VertexFormat::Float32x3),
    );
    geo.set_attribute(
        ATTR_NORMAL,
        Attribute::new_planar(&normals, VertexFormat::Float32x3),
    );
    geo.set_attribute(ATTR_UV, Attribute::new_planar(&uvs, VertexFormat::Float32x2));
    geo.set_indices_u32(&indices);

    geo
}
