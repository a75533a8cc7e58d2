//! Flattens PBR channel maps under a decal.
//!
//! Baked normal, roughness, metalness and occlusion detail belongs to the
//! old artwork. Left in place it would emboss or shade the new decal, so the
//! region is reset: normal maps to the flat normal, scalar maps to the value
//! found just around the region.

use image::{Rgba, RgbaImage};

use crate::decal::bounds::UvBounds;
use crate::decal::config::DecalConfig;
use crate::decal::segment::{PixelRect, pixel_rect_with_min};
use crate::errors::Result;
use crate::resources::image::Image;
use crate::resources::material::{MapChannel, MaterialData};
use crate::resources::mesh::Mesh;
use crate::resources::texture::Texture;

/// Tangent-space normal (0, 0, 1) encoded as RGBA8.
pub const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

/// Packed channel a scalar map stores its value in (glTF ORM convention).
#[must_use]
pub fn packed_channel(channel: MapChannel) -> Option<usize> {
    match channel {
        MapChannel::AmbientOcclusion => Some(0),
        MapChannel::Roughness => Some(1),
        MapChannel::Metalness => Some(2),
        _ => None,
    }
}

/// What happened to one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeutralizedMap {
    pub channel: MapChannel,
    pub rect: PixelRect,
    /// Value written into the packed channel (`None` for normal maps).
    pub value: Option<u8>,
}

/// Builds neutralized replacements for every present normal, roughness,
/// metalness and AO map without touching `material`.
///
/// Each map is handled in its own pixel space, since channel maps rarely
/// share the base map's resolution.
#[must_use]
pub fn plan_neutralize(
    material: &MaterialData,
    bounds: &UvBounds,
    config: &DecalConfig,
) -> Vec<(NeutralizedMap, Image)> {
    let mut planned = Vec::new();
    for channel in [
        MapChannel::Normal,
        MapChannel::Roughness,
        MapChannel::Metalness,
        MapChannel::AmbientOcclusion,
    ] {
        let Some(texture) = material.texture(channel) else {
            continue;
        };
        if let Some(result) = neutralize_texture(texture, channel, bounds, config) {
            planned.push(result);
        }
    }
    planned
}

/// Flattens the channel maps of `material` inside `bounds` by installing
/// texture overrides. Missing maps are skipped.
pub fn neutralize(material: &mut MaterialData, bounds: &UvBounds, config: &DecalConfig) -> Vec<NeutralizedMap> {
    let planned = plan_neutralize(material, bounds, config);
    install(material, planned)
}

/// [`neutralize`] applied to the material at `slot` of `mesh`, under its
/// write lock. Callers should isolate the material first; siblings sharing
/// it would see the edit.
pub fn neutralize_slot(
    mesh: &Mesh,
    slot: usize,
    bounds: &UvBounds,
    config: &DecalConfig,
) -> Result<Vec<NeutralizedMap>> {
    let material = mesh.try_material_at(slot)?;
    let mut guard = material.write();
    Ok(neutralize(&mut guard, bounds, config))
}

/// Installs replacements produced by [`plan_neutralize`].
pub fn install(material: &mut MaterialData, planned: Vec<(NeutralizedMap, Image)>) -> Vec<NeutralizedMap> {
    planned
        .into_iter()
        .filter_map(|(report, image)| {
            let texture = material.texture_mut(report.channel)?;
            texture.set_override(image, None);
            Some(report)
        })
        .collect()
}

fn neutralize_texture(
    texture: &Texture,
    channel: MapChannel,
    bounds: &UvBounds,
    config: &DecalConfig,
) -> Option<(NeutralizedMap, Image)> {
    let source = texture.image();
    let pixels = source.pixels();
    let (w, h) = pixels.dimensions();
    if w == 0 || h == 0 {
        return None;
    }

    let rect = pixel_rect_with_min(bounds, w, h, texture.flip_y, config.min_rect_size);
    let mut out = pixels.clone();

    let value = if channel == MapChannel::Normal {
        let flat = Rgba(FLAT_NORMAL);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                out.put_pixel(x, y, flat);
            }
        }
        None
    } else {
        let index = packed_channel(channel)?;
        let avg = ring_average(pixels, &rect, config.neutralize_border, index);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                out.get_pixel_mut(x, y).0[index] = avg;
            }
        }
        Some(avg)
    };

    log::debug!("neutralized {channel:?} map in {rect:?} ({value:?})");
    let label = format!("{}:neutralized", texture.name);
    Some((
        NeutralizedMap {
            channel,
            rect,
            value,
        },
        Image::new(Some(&label), out),
    ))
}

/// Mean of channel `index` over the `border`-pixel ring around `rect`,
/// clipped to the image. Falls back to the rect itself when the ring is
/// empty (the rect covers the whole image).
fn ring_average(image: &RgbaImage, rect: &PixelRect, border: u32, index: usize) -> u8 {
    let (w, h) = image.dimensions();
    let x0 = rect.x.saturating_sub(border);
    let y0 = rect.y.saturating_sub(border);
    let x1 = rect.right().saturating_add(border).min(w);
    let y1 = rect.bottom().saturating_add(border).min(h);

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            if !rect.contains(x, y) {
                sum += u64::from(image.get_pixel(x, y).0[index]);
                count += 1;
            }
        }
    }

    if count == 0 {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                sum += u64::from(image.get_pixel(x, y).0[index]);
                count += 1;
            }
        }
    }

    if count == 0 {
        return 0;
    }
    ((sum + count / 2) / count) as u8
}
