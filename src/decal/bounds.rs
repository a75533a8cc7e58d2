//! UV bounds of a mesh region.
//!
//! Walks the triangles drawn with one material slot and accumulates the UV
//! rectangle they cover, either as authored (raw) or as the sampler sees it
//! after the texture transform.

use std::ops::Range;

use glam::Vec2;
use smallvec::SmallVec;

use crate::resources::geometry::{ATTR_UV, Geometry};
use crate::resources::texture::{Texture, TextureTransform};

/// Axis-aligned UV rectangle. `min <= max` on both axes; values may lie
/// outside `[0, 1]` until [`UvBounds::clamped`] is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvBounds {
    pub min_u: f32,
    pub min_v: f32,
    pub max_u: f32,
    pub max_v: f32,
}

impl UvBounds {
    /// Builds bounds from two corners in any order.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            min_u: min.x,
            min_v: min.y,
            max_u: max.x,
            max_v: max.y,
        }
    }

    #[must_use]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.min_u, self.min_v)
    }

    #[must_use]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.max_u, self.max_v)
    }

    #[must_use]
    pub fn span(&self) -> Vec2 {
        self.max() - self.min()
    }

    #[must_use]
    pub fn clamped(&self) -> Self {
        Self::new(
            self.min().clamp(Vec2::ZERO, Vec2::ONE),
            self.max().clamp(Vec2::ZERO, Vec2::ONE),
        )
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min().is_finite() && self.max().is_finite()
    }
}

struct BoundsAccumulator {
    min: Vec2,
    max: Vec2,
}

impl BoundsAccumulator {
    fn new() -> Self {
        Self {
            min: Vec2::splat(f32::INFINITY),
            max: Vec2::splat(f32::NEG_INFINITY),
        }
    }

    fn push(&mut self, uv: Vec2) {
        if uv.is_finite() {
            self.min = self.min.min(uv);
            self.max = self.max.max(uv);
        }
    }

    fn finish(self) -> Option<UvBounds> {
        (self.min.is_finite() && self.max.is_finite()).then(|| UvBounds::new(self.min, self.max))
    }
}

/// Element ranges drawn with `slot`. Geometry without groups, or without a
/// group for this slot, is treated as one group covering everything.
fn slot_ranges(geometry: &Geometry, slot: usize) -> SmallVec<[Range<u32>; 4]> {
    let total = geometry.element_count();
    let ranges: SmallVec<[Range<u32>; 4]> = geometry
        .groups()
        .iter()
        .filter(|g| g.material_index == slot)
        .map(|g| g.start.min(total)..g.start.saturating_add(g.count).min(total))
        .filter(|r| !r.is_empty())
        .collect();

    if ranges.is_empty() {
        let mut full = SmallVec::new();
        full.push(0..total);
        full
    } else {
        ranges
    }
}

fn accumulate(
    geometry: &Geometry,
    slot: usize,
    mut map: impl FnMut(Vec2) -> Vec2,
) -> Option<UvBounds> {
    let uv = geometry.get_attribute(ATTR_UV)?;
    let mut acc = BoundsAccumulator::new();

    for range in slot_ranges(geometry, slot) {
        for element in range {
            let Some(vertex) = geometry.vertex_at(element) else {
                continue;
            };
            if let Some(sample) = uv.read_vec2(vertex) {
                acc.push(map(sample));
            }
        }
    }

    acc.finish()
}

/// UV rectangle covered by the triangles of `slot`, as authored.
///
/// Returns `None` if the geometry has no UV attribute or no vertex was
/// reached.
#[must_use]
pub fn compute_raw_bounds(geometry: &Geometry, slot: usize) -> Option<UvBounds> {
    accumulate(geometry, slot, |uv| uv)
}

/// UV rectangle the sampler addresses for `slot` once `texture`'s transform
/// is applied.
#[must_use]
pub fn compute_transformed_bounds(
    geometry: &Geometry,
    slot: usize,
    texture: &Texture,
) -> Option<UvBounds> {
    compute_bounds_with(geometry, slot, &texture.transform())
}

#[must_use]
pub fn compute_bounds_with(
    geometry: &Geometry,
    slot: usize,
    transform: &TextureTransform,
) -> Option<UvBounds> {
    if transform.is_identity() {
        return compute_raw_bounds(geometry, slot);
    }
    accumulate(geometry, slot, |uv| transform.apply(uv))
}
