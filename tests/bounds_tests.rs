//! UV Bounds Tests
//!
//! Tests for:
//! - Raw UV bounds of single-group and multi-group geometry
//! - Index buffers (u16 / u32) and non-indexed geometry
//! - Transformed bounds under repeat / offset / rotation
//! - Missing UV attributes

use std::sync::Arc;

use glam::Vec2;

use myth_decal::decal::bounds::{
    UvBounds, compute_bounds_with, compute_raw_bounds, compute_transformed_bounds,
};
use myth_decal::resources::geometry::{ATTR_POSITION, ATTR_UV, Attribute, Geometry, VertexFormat};
use myth_decal::resources::primitives::{PlaneOptions, create_plane};
use myth_decal::resources::texture::{Texture, TextureTransform};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn bounds_approx(b: &UvBounds, min_u: f32, min_v: f32, max_u: f32, max_v: f32) -> bool {
    approx(b.min_u, min_u) && approx(b.min_v, min_v) && approx(b.max_u, max_u) && approx(b.max_v, max_v)
}

fn island_plane(min: Vec2, max: Vec2) -> Geometry {
    create_plane(PlaneOptions {
        width_segments: 3,
        height_segments: 2,
        uv_rect: (min, max),
        ..Default::default()
    })
}

/// Two quads: vertices 0..4 span `a`, vertices 4..8 span `b`.
/// Group 0 draws the first quad, group 1 the second.
fn two_island_geometry(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> Geometry {
    let corners = |(min, max): (Vec2, Vec2)| {
        [
            [min.x, min.y],
            [max.x, min.y],
            [max.x, max.y],
            [min.x, max.y],
        ]
    };
    let mut uvs: Vec<[f32; 2]> = corners(a).to_vec();
    uvs.extend_from_slice(&corners(b));
    let positions: Vec<[f32; 3]> = uvs.iter().map(|uv| [uv[0], uv[1], 0.0]).collect();

    let mut geo = Geometry::new();
    geo.set_attribute(ATTR_POSITION, Attribute::new_planar(&positions, VertexFormat::Float32x3));
    geo.set_attribute(ATTR_UV, Attribute::new_planar(&uvs, VertexFormat::Float32x2));
    geo.set_indices(&[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    geo.add_group(0, 6, 0);
    geo.add_group(6, 6, 1);
    geo
}

// ============================================================================
// Raw Bounds Tests
// ============================================================================

#[test]
fn raw_bounds_of_full_plane() {
    let geo = create_plane(PlaneOptions::default());
    let b = compute_raw_bounds(&geo, 0).unwrap();
    assert!(bounds_approx(&b, 0.0, 0.0, 1.0, 1.0));
}

#[test]
fn raw_bounds_of_atlas_island() {
    let geo = island_plane(Vec2::new(0.2, 0.1), Vec2::new(0.4, 0.3));
    let b = compute_raw_bounds(&geo, 0).unwrap();
    assert!(bounds_approx(&b, 0.2, 0.1, 0.4, 0.3));
}

#[test]
fn raw_bounds_are_ordered_and_finite() {
    let geo = island_plane(Vec2::new(0.7, 0.9), Vec2::new(0.1, 0.05));
    let b = compute_raw_bounds(&geo, 0).unwrap();
    assert!(b.is_finite());
    assert!(b.min_u <= b.max_u);
    assert!(b.min_v <= b.max_v);
}

#[test]
fn raw_bounds_follow_material_groups() {
    let geo = two_island_geometry(
        (Vec2::new(0.0, 0.0), Vec2::new(0.25, 0.25)),
        (Vec2::new(0.5, 0.6), Vec2::new(0.9, 0.8)),
    );

    let first = compute_raw_bounds(&geo, 0).unwrap();
    assert!(bounds_approx(&first, 0.0, 0.0, 0.25, 0.25));

    let second = compute_raw_bounds(&geo, 1).unwrap();
    assert!(bounds_approx(&second, 0.5, 0.6, 0.9, 0.8));
}

#[test]
fn raw_bounds_without_matching_group_cover_everything() {
    let geo = two_island_geometry(
        (Vec2::new(0.0, 0.0), Vec2::new(0.25, 0.25)),
        (Vec2::new(0.5, 0.6), Vec2::new(0.9, 0.8)),
    );
    let b = compute_raw_bounds(&geo, 7).unwrap();
    assert!(bounds_approx(&b, 0.0, 0.0, 0.9, 0.8));
}

#[test]
fn raw_bounds_non_indexed_geometry() {
    let uvs: Vec<[f32; 2]> = vec![[0.1, 0.2], [0.3, 0.2], [0.3, 0.6]];
    let mut geo = Geometry::new();
    geo.set_attribute(ATTR_UV, Attribute::new_planar(&uvs, VertexFormat::Float32x2));

    let b = compute_raw_bounds(&geo, 0).unwrap();
    assert!(bounds_approx(&b, 0.1, 0.2, 0.3, 0.6));
}

#[test]
fn raw_bounds_u32_indices_skip_unreferenced_vertices() {
    let uvs: Vec<[f32; 2]> = vec![[0.1, 0.1], [0.2, 0.1], [0.2, 0.2], [0.95, 0.95]];
    let mut geo = Geometry::new();
    geo.set_attribute(ATTR_UV, Attribute::new_planar(&uvs, VertexFormat::Float32x2));
    geo.set_indices_u32(&[0, 1, 2]);

    let b = compute_raw_bounds(&geo, 0).unwrap();
    assert!(bounds_approx(&b, 0.1, 0.1, 0.2, 0.2));
}

#[test]
fn raw_bounds_read_interleaved_uvs() {
    // position (12 bytes) followed by uv (8 bytes) per vertex.
    let vertices: [[f32; 5]; 4] = [
        [0.0, 0.0, 0.0, 0.1, 0.2],
        [1.0, 0.0, 0.0, 0.3, 0.2],
        [1.0, 1.0, 0.0, 0.3, 0.5],
        [0.0, 1.0, 0.0, 0.1, 0.5],
    ];
    let data: Arc<Vec<u8>> = Arc::new(bytemuck::cast_slice(&vertices).to_vec());

    let mut geo = Geometry::new();
    geo.set_attribute(
        ATTR_POSITION,
        Attribute::new_interleaved(data.clone(), VertexFormat::Float32x3, 0, 4, 20),
    );
    geo.set_attribute(
        ATTR_UV,
        Attribute::new_interleaved(data, VertexFormat::Float32x2, 12, 4, 20),
    );
    geo.set_indices(&[0, 1, 2, 0, 2, 3]);

    let b = compute_raw_bounds(&geo, 0).unwrap();
    assert!(bounds_approx(&b, 0.1, 0.2, 0.3, 0.5));
}

#[test]
fn raw_bounds_without_uvs_is_none() {
    let mut geo = create_plane(PlaneOptions::default());
    geo.remove_attribute(ATTR_UV);
    assert!(compute_raw_bounds(&geo, 0).is_none());
}

// ============================================================================
// Transformed Bounds Tests
// ============================================================================

#[test]
fn transformed_bounds_identity_matches_raw() {
    let geo = island_plane(Vec2::new(0.2, 0.1), Vec2::new(0.4, 0.3));
    let texture = Texture::create_solid_color("white", [255; 4]);
    let raw = compute_raw_bounds(&geo, 0).unwrap();
    let sampled = compute_transformed_bounds(&geo, 0, &texture).unwrap();
    assert_eq!(raw, sampled);
}

#[test]
fn transformed_bounds_apply_repeat_then_offset() {
    let geo = island_plane(Vec2::new(0.2, 0.1), Vec2::new(0.4, 0.3));
    let transform = TextureTransform {
        repeat: Vec2::new(2.0, 0.5),
        offset: Vec2::new(0.1, 0.25),
        ..Default::default()
    };
    let b = compute_bounds_with(&geo, 0, &transform).unwrap();
    assert!(bounds_approx(&b, 0.5, 0.3, 0.9, 0.4));
}

#[test]
fn transformed_bounds_rotate_about_center() {
    let geo = island_plane(Vec2::new(0.0, 0.0), Vec2::new(0.5, 0.5));
    let texture = Texture::create_solid_color("white", [255; 4]).with_transform(TextureTransform {
        rotation: std::f32::consts::PI,
        ..Default::default()
    });
    let b = compute_transformed_bounds(&geo, 0, &texture).unwrap();
    assert!(bounds_approx(&b, 0.5, 0.5, 1.0, 1.0));
}

#[test]
fn transformed_bounds_follow_the_override_transform() {
    let geo = island_plane(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
    let mut texture = Texture::create_solid_color("white", [255; 4]);
    let canvas = texture.image().clone();
    texture.set_override(canvas, Some(TextureTransform::remap(Vec2::new(0.25, 0.5), Vec2::splat(0.25))));

    let b = compute_transformed_bounds(&geo, 0, &texture).unwrap();
    assert!(bounds_approx(&b, 0.25, 0.5, 0.5, 0.75));
}
