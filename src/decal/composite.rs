//! Decal compositing.
//!
//! Two ways to place an image on a mesh region:
//!
//! - **Direct atlas**: the region is large enough in the shared atlas. A copy
//!   of the atlas is made, the old artwork is erased to the background color
//!   and the new image is fitted inside the region. Pixels outside the region
//!   are untouched, so siblings sampling the same atlas keep their look.
//! - **Tiny island**: the region covers too few atlas pixels to hold a
//!   legible image. A dedicated canvas is painted instead and the texture
//!   transform is remapped so the canvas lands exactly on the island's UV
//!   footprint.
//!
//! A third, geometry-free path paints a centered square on a dedicated
//! canvas. It is used when a mesh has no UVs or when the UV-aware path fails.
//!
//! All paths return fresh buffers. The source atlas is never written.

use image::{Rgb, Rgba, RgbaImage, imageops};
use thiserror::Error;

use crate::decal::bounds::UvBounds;
use crate::decal::config::DecalConfig;
use crate::decal::segment::{PixelRect, estimate_background, pixel_rect_with_min};
use crate::resources::texture::TextureTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeStrategy {
    /// Drawn into a copy of the shared atlas.
    DirectAtlas,
    /// Drawn onto a dedicated, upscaled canvas.
    TinyIsland,
    /// Geometry-free centered square on a dedicated canvas.
    CenteredSquare,
}

/// Failures of the UV-aware path. Never surfaced to callers: the engine
/// logs them and switches to [`composite_centered_square`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositeError {
    #[error("source image is empty")]
    EmptySource,

    #[error("atlas image is empty")]
    EmptyAtlas,

    #[error("rectangle {rect:?} lies outside the {width}x{height} atlas")]
    OutsideAtlas {
        rect: PixelRect,
        width: u32,
        height: u32,
    },

    #[error("UV bounds are not finite: {0:?}")]
    NonFiniteBounds(UvBounds),

    #[error("centered square strategy is not UV-aware")]
    NotUvAware,
}

/// Inputs of one UV-aware composite.
#[derive(Debug, Clone, Copy)]
pub struct CompositeRequest<'a> {
    pub atlas: &'a RgbaImage,
    pub source: &'a RgbaImage,
    /// Region of the atlas the sampler reads for this mesh slot.
    pub target: PixelRect,
    /// Existing artwork inside `target`, in atlas coordinates.
    pub detected: Option<PixelRect>,
    pub background: Rgb<u8>,
    /// Untransformed UV footprint of the mesh slot.
    pub raw_bounds: UvBounds,
    pub flip_y: bool,
    pub strategy: CompositeStrategy,
}

#[derive(Debug, Clone)]
pub struct CompositeOutput {
    pub image: RgbaImage,
    /// Transform to install with the image; `None` keeps the texture's own.
    pub transform: Option<TextureTransform>,
    pub strategy: CompositeStrategy,
    /// Pixels of `image` covered by the drawn decal.
    pub footprint: PixelRect,
}

/// Picks the strategy from the raw (untransformed) UV footprint projected
/// onto the atlas.
#[must_use]
pub fn select_strategy(
    raw_bounds: &UvBounds,
    atlas_w: u32,
    atlas_h: u32,
    flip_y: bool,
    config: &DecalConfig,
) -> CompositeStrategy {
    let island = island_rect(raw_bounds, atlas_w, atlas_h, flip_y);
    if island.w < config.tiny_island_threshold || island.h < config.tiny_island_threshold {
        CompositeStrategy::TinyIsland
    } else {
        CompositeStrategy::DirectAtlas
    }
}

/// Raw footprint in atlas pixels, without the minimum-size inflation.
fn island_rect(raw_bounds: &UvBounds, atlas_w: u32, atlas_h: u32, flip_y: bool) -> PixelRect {
    pixel_rect_with_min(raw_bounds, atlas_w, atlas_h, flip_y, 1)
}

pub fn composite(
    request: &CompositeRequest<'_>,
    config: &DecalConfig,
) -> Result<CompositeOutput, CompositeError> {
    if request.source.width() == 0 || request.source.height() == 0 {
        return Err(CompositeError::EmptySource);
    }
    if request.atlas.width() == 0 || request.atlas.height() == 0 {
        return Err(CompositeError::EmptyAtlas);
    }
    if !request.raw_bounds.is_finite() {
        return Err(CompositeError::NonFiniteBounds(request.raw_bounds));
    }

    match request.strategy {
        CompositeStrategy::TinyIsland => Ok(composite_tiny_island(request, config)),
        CompositeStrategy::DirectAtlas => composite_direct(request, config),
        CompositeStrategy::CenteredSquare => Err(CompositeError::NotUvAware),
    }
}

fn composite_tiny_island(request: &CompositeRequest<'_>, config: &DecalConfig) -> CompositeOutput {
    let size = config.canvas_size;
    let mut canvas = RgbaImage::from_pixel(size, size, opaque(request.background));

    let island = island_rect(
        &request.raw_bounds,
        request.atlas.width(),
        request.atlas.height(),
        request.flip_y,
    );
    let overfill = config.overfill_for(island.w.min(island.h));

    // Fitted so that even the weakest overfill spills past the canvas.
    let fit_box = size as f32 / config.overfill_min;
    let (w, h) = fit_scaled(request.source, fit_box, fit_box, overfill);
    let footprint = draw_centered(&mut canvas, request.source, w, h, config);

    let raw = request.raw_bounds;
    log::debug!(
        "tiny island {island:?}: {size}x{size} canvas, overfill {overfill:.3}, drawn {w}x{h}"
    );

    CompositeOutput {
        image: canvas,
        transform: Some(TextureTransform::remap(raw.min(), raw.span())),
        strategy: CompositeStrategy::TinyIsland,
        footprint,
    }
}

fn composite_direct(
    request: &CompositeRequest<'_>,
    config: &DecalConfig,
) -> Result<CompositeOutput, CompositeError> {
    let (aw, ah) = request.atlas.dimensions();
    let atlas_rect = PixelRect::new(0, 0, aw, ah);
    let target = request.target;
    if target.w == 0 || target.h == 0 || !atlas_rect.contains_rect(&target) {
        return Err(CompositeError::OutsideAtlas {
            rect: target,
            width: aw,
            height: ah,
        });
    }

    let erase = request.detected.unwrap_or(target);
    if !atlas_rect.contains_rect(&erase) {
        return Err(CompositeError::OutsideAtlas {
            rect: erase,
            width: aw,
            height: ah,
        });
    }

    let mut out = request.atlas.clone();
    fill_rect(&mut out, &erase, opaque(request.background));

    // Draw inside a cut-out so nothing outside the target can change.
    let mut region = imageops::crop_imm(&out, target.x, target.y, target.w, target.h).to_image();
    let (w, h) = fit_scaled(request.source, target.w as f32, target.h as f32, 1.0);
    let drawn = draw_centered(&mut region, request.source, w, h, config);
    imageops::replace(&mut out, &region, i64::from(target.x), i64::from(target.y));

    Ok(CompositeOutput {
        image: out,
        transform: None,
        strategy: CompositeStrategy::DirectAtlas,
        footprint: drawn.translated(&target),
    })
}

/// Geometry-free fallback: a dedicated canvas filled with the base image's
/// border color (opaque white without a base), with the source fitted into a
/// centered square.
#[must_use]
pub fn composite_centered_square(
    source: &RgbaImage,
    base: Option<&RgbaImage>,
    config: &DecalConfig,
) -> CompositeOutput {
    let size = config.canvas_size;
    let background = base
        .filter(|b| b.width() > 0 && b.height() > 0)
        .map_or(Rgb([255, 255, 255]), estimate_background);
    let mut canvas = RgbaImage::from_pixel(size, size, opaque(background));

    let side = (size as f32 * config.fallback_fill).round().max(1.0);
    let footprint = if source.width() == 0 || source.height() == 0 {
        PixelRect::new(0, 0, size, size)
    } else {
        let (w, h) = fit_scaled(source, side, side, 1.0);
        draw_centered(&mut canvas, source, w, h, config)
    };

    CompositeOutput {
        image: canvas,
        transform: Some(TextureTransform::default()),
        strategy: CompositeStrategy::CenteredSquare,
        footprint,
    }
}

fn opaque(color: Rgb<u8>) -> Rgba<u8> {
    let [r, g, b] = color.0;
    Rgba([r, g, b, 255])
}

/// Proportional fit of `source` into `box_w`×`box_h`, multiplied by `scale`.
fn fit_scaled(source: &RgbaImage, box_w: f32, box_h: f32, scale: f32) -> (u32, u32) {
    let (sw, sh) = (source.width() as f32, source.height() as f32);
    let fit = (box_w / sw).min(box_h / sh) * scale;
    let w = (sw * fit).round().max(1.0) as u32;
    let h = (sh * fit).round().max(1.0) as u32;
    (w, h)
}

fn fill_rect(image: &mut RgbaImage, rect: &PixelRect, color: Rgba<u8>) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            image.put_pixel(x, y, color);
        }
    }
}

/// Resizes `source` to `w`×`h` and alpha-composites it centered on `canvas`.
/// Returns the covered part of the canvas.
fn draw_centered(canvas: &mut RgbaImage, source: &RgbaImage, w: u32, h: u32, config: &DecalConfig) -> PixelRect {
    let scaled = imageops::resize(source, w, h, config.resample.into());
    let (cw, ch) = canvas.dimensions();
    let x = (i64::from(cw) - i64::from(w)) / 2;
    let y = (i64::from(ch) - i64::from(h)) / 2;
    imageops::overlay(canvas, &scaled, x, y);

    let x0 = x.clamp(0, i64::from(cw)) as u32;
    let y0 = y.clamp(0, i64::from(ch)) as u32;
    let x1 = (x + i64::from(w)).clamp(0, i64::from(cw)) as u32;
    let y1 = (y + i64::from(h)).clamp(0, i64::from(ch)) as u32;
    PixelRect::new(x0, y0, (x1 - x0).max(1), (y1 - y0).max(1))
}
