//! Atlas segmentation.
//!
//! Converts UV bounds into atlas pixels and separates whatever artwork is
//! already painted there from the flat background around it.
//!
//! The classifier is a plain per-pixel color distance test against the
//! border average. It is not connectivity-aware: isolated noise pixels can
//! be classified as foreground, and gradient-heavy regions may be flagged
//! entirely.

use image::{Rgb, RgbaImage, imageops};

use crate::decal::bounds::UvBounds;

/// Default RGB distance for [`build_foreground_mask`].
pub const DEFAULT_FOREGROUND_THRESHOLD: u8 = 28;
/// Default minimum edge of a converted rectangle.
pub const MIN_RECT_SIZE: u32 = 8;
/// Default padding of [`bounding_box`], as a fraction of the box size.
pub const DEFAULT_BBOX_PADDING: f32 = 0.08;

/// Integer pixel rectangle inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    #[must_use]
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    #[must_use]
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    #[must_use]
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        (x1 > x0 && y1 > y0).then(|| PixelRect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Moves a rect expressed relative to `origin` into origin's space.
    #[must_use]
    pub fn translated(&self, origin: &PixelRect) -> PixelRect {
        PixelRect::new(self.x + origin.x, self.y + origin.y, self.w, self.h)
    }

    /// Inverse of [`pixel_rect`]: the UV rectangle covered by these pixels.
    #[must_use]
    pub fn to_uv_bounds(&self, image_w: u32, image_h: u32, flip_y: bool) -> UvBounds {
        let iw = f64::from(image_w.max(1));
        let ih = f64::from(image_h.max(1));
        let u0 = f64::from(self.x) / iw;
        let u1 = f64::from(self.right()) / iw;
        let (v0, v1) = if flip_y {
            (
                1.0 - f64::from(self.bottom()) / ih,
                1.0 - f64::from(self.y) / ih,
            )
        } else {
            (f64::from(self.y) / ih, f64::from(self.bottom()) / ih)
        };
        UvBounds {
            min_u: u0 as f32,
            min_v: v0 as f32,
            max_u: u1 as f32,
            max_v: v1 as f32,
        }
    }
}

/// Converts UV bounds to an image-pixel rectangle with the default 8×8 minimum.
///
/// With `flip_y` set, V grows upward and rows are `(1 - v) * height`;
/// otherwise rows are `v * height`.
#[must_use]
pub fn pixel_rect(bounds: &UvBounds, image_w: u32, image_h: u32, flip_y: bool) -> PixelRect {
    pixel_rect_with_min(bounds, image_w, image_h, flip_y, MIN_RECT_SIZE)
}

/// [`pixel_rect`] with an explicit minimum edge length.
#[must_use]
pub fn pixel_rect_with_min(
    bounds: &UvBounds,
    image_w: u32,
    image_h: u32,
    flip_y: bool,
    min_size: u32,
) -> PixelRect {
    let iw = image_w.max(1);
    let ih = image_h.max(1);
    let b = bounds.clamped();

    // Edges are rounded independently so neighbouring islands share edges.
    let to_px = |t: f32, extent: u32| (f64::from(t) * f64::from(extent)).round() as u32;

    let x0 = to_px(b.min_u, iw).min(iw);
    let x1 = to_px(b.max_u, iw).min(iw);
    let (y0, y1) = if flip_y {
        (to_px(1.0 - b.max_v, ih), to_px(1.0 - b.min_v, ih))
    } else {
        (to_px(b.min_v, ih), to_px(b.max_v, ih))
    };
    let (y0, y1) = (y0.min(ih), y1.min(ih));

    let (x, w) = enforce_min(x0, x1.saturating_sub(x0), min_size, iw);
    let (y, h) = enforce_min(y0, y1.saturating_sub(y0), min_size, ih);
    PixelRect::new(x, y, w, h)
}

/// Grows `len` around its center up to `min_size` (capped by `extent`), then
/// shifts the span back inside `[0, extent)`.
fn enforce_min(start: u32, len: u32, min_size: u32, extent: u32) -> (u32, u32) {
    let min_len = min_size.clamp(1, extent);
    let (start, len) = if len < min_len {
        let grow = min_len - len;
        (start.saturating_sub(grow / 2), min_len)
    } else {
        (start, len.min(extent))
    };
    (start.min(extent - len), len)
}

/// Copies the pixels under `rect` out of `image`.
#[must_use]
pub fn crop_region(image: &RgbaImage, rect: &PixelRect) -> RgbaImage {
    imageops::crop_imm(image, rect.x, rect.y, rect.w, rect.h).to_image()
}

/// Calls `f` once for every pixel on the outer border of a `w`×`h` grid.
fn for_each_border_pixel(w: u32, h: u32, mut f: impl FnMut(u32, u32)) {
    if w == 0 || h == 0 {
        return;
    }
    for x in 0..w {
        f(x, 0);
        if h > 1 {
            f(x, h - 1);
        }
    }
    for y in 1..h.saturating_sub(1) {
        f(0, y);
        if w > 1 {
            f(w - 1, y);
        }
    }
}

/// Average color of the outermost ring of `region`.
#[must_use]
pub fn estimate_background(region: &RgbaImage) -> Rgb<u8> {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for_each_border_pixel(region.width(), region.height(), |x, y| {
        let p = region.get_pixel(x, y);
        for (acc, c) in sum.iter_mut().zip(p.0) {
            *acc += u64::from(c);
        }
        count += 1;
    });
    if count == 0 {
        return Rgb([0, 0, 0]);
    }
    Rgb(sum.map(|s| ((s + count / 2) / count) as u8))
}

/// Per-pixel foreground flags of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl ForegroundMask {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            self.bits[(y * self.width + x) as usize] = value;
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

/// Marks every pixel whose squared RGB distance to `background` exceeds
/// `threshold²`.
#[must_use]
pub fn build_foreground_mask(region: &RgbaImage, background: Rgb<u8>, threshold: u8) -> ForegroundMask {
    let limit = u32::from(threshold).pow(2);
    let mut mask = ForegroundMask::new(region.width(), region.height());
    for (x, y, p) in region.enumerate_pixels() {
        let dist: u32 = p.0[..3]
            .iter()
            .zip(background.0)
            .map(|(a, b)| u32::from(a.abs_diff(b)).pow(2))
            .sum();
        if dist > limit {
            mask.set(x, y, true);
        }
    }
    mask
}

/// Tightest box around the foreground, grown by `padding` of its size on
/// each side and clamped to the mask. `None` if nothing is foreground.
#[must_use]
pub fn bounding_box(mask: &ForegroundMask, padding: f32) -> Option<PixelRect> {
    let mut min = (u32::MAX, u32::MAX);
    let mut max = (0u32, 0u32);
    let mut found = false;
    for y in 0..mask.height {
        for x in 0..mask.width {
            if mask.get(x, y) {
                found = true;
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
            }
        }
    }
    if !found {
        return None;
    }

    let bw = max.0 - min.0 + 1;
    let bh = max.1 - min.1 + 1;
    let pad_x = (bw as f32 * padding).ceil() as u32;
    let pad_y = (bh as f32 * padding).ceil() as u32;

    let x0 = min.0.saturating_sub(pad_x);
    let y0 = min.1.saturating_sub(pad_y);
    let x1 = (max.0 + 1 + pad_x).min(mask.width);
    let y1 = (max.1 + 1 + pad_y).min(mask.height);
    Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Result of segmenting one atlas rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmentation {
    pub background: Rgb<u8>,
    /// Existing artwork, in atlas coordinates.
    pub detected: Option<PixelRect>,
}

/// Estimates the background of `rect` and locates artwork inside it.
#[must_use]
pub fn segment_region(atlas: &RgbaImage, rect: &PixelRect, threshold: u8, padding: f32) -> Segmentation {
    let region = crop_region(atlas, rect);
    let background = estimate_background(&region);
    let mask = build_foreground_mask(&region, background, threshold);
    let detected = bounding_box(&mask, padding).map(|b| b.translated(rect));
    log::debug!(
        "segmented {rect:?}: background {:?}, {} foreground px, box {detected:?}",
        background.0,
        mask.count()
    );
    Segmentation { background, detected }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_visits_each_pixel_once() {
        let mut visits = 0;
        for_each_border_pixel(5, 4, |_, _| visits += 1);
        assert_eq!(visits, 2 * 5 + 2 * 2);

        let mut single = 0;
        for_each_border_pixel(1, 1, |_, _| single += 1);
        assert_eq!(single, 1);

        let mut column = 0;
        for_each_border_pixel(1, 3, |_, _| column += 1);
        assert_eq!(column, 3);
    }

    #[test]
    fn min_size_grows_around_center() {
        assert_eq!(enforce_min(100, 2, 8, 1000), (97, 8));
        assert_eq!(enforce_min(0, 0, 8, 1000), (0, 8));
        assert_eq!(enforce_min(998, 2, 8, 1000), (992, 8));
        assert_eq!(enforce_min(0, 0, 8, 4), (0, 4));
    }
}
