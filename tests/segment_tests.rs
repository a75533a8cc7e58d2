//! Atlas Segmentation Tests
//!
//! Tests for:
//! - UV → pixel rectangle conversion (flip, clamping, minimum size)
//! - Background estimation from the region border
//! - Foreground mask threshold
//! - Bounding box detection and padding
//! - Region segmentation in atlas coordinates

use image::{Rgb, Rgba, RgbaImage};

use myth_decal::decal::bounds::UvBounds;
use myth_decal::decal::segment::{
    ForegroundMask, PixelRect, bounding_box, build_foreground_mask, crop_region,
    estimate_background, pixel_rect, pixel_rect_with_min, segment_region,
};

fn uv(min_u: f32, min_v: f32, max_u: f32, max_v: f32) -> UvBounds {
    UvBounds {
        min_u,
        min_v,
        max_u,
        max_v,
    }
}

fn fill(image: &mut RgbaImage, rect: PixelRect, color: [u8; 4]) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            image.put_pixel(x, y, Rgba(color));
        }
    }
}

// ============================================================================
// Pixel Rect Tests
// ============================================================================

#[test]
fn pixel_rect_with_flip() {
    let rect = pixel_rect(&uv(0.2, 0.1, 0.4, 0.3), 1000, 1000, true);
    assert_eq!(rect, PixelRect::new(200, 700, 200, 200));
}

#[test]
fn pixel_rect_without_flip() {
    let rect = pixel_rect(&uv(0.2, 0.1, 0.4, 0.3), 1000, 1000, false);
    assert_eq!(rect, PixelRect::new(200, 100, 200, 200));
}

#[test]
fn pixel_rect_non_square_image() {
    let rect = pixel_rect(&uv(0.5, 0.0, 1.0, 0.25), 2048, 512, true);
    assert_eq!(rect, PixelRect::new(1024, 384, 1024, 128));
}

#[test]
fn pixel_rect_clamps_out_of_range_uvs() {
    let rect = pixel_rect(&uv(-0.5, -1.0, 1.5, 2.0), 256, 128, true);
    assert_eq!(rect, PixelRect::new(0, 0, 256, 128));
}

#[test]
fn pixel_rect_degenerate_is_min_size() {
    let rect = pixel_rect(&uv(0.5, 0.5, 0.5, 0.5), 1000, 1000, true);
    assert_eq!((rect.w, rect.h), (8, 8));
    assert_eq!(rect, PixelRect::new(496, 496, 8, 8));
}

#[test]
fn pixel_rect_min_size_stays_inside_image() {
    let corner = pixel_rect(&uv(1.0, 1.0, 1.0, 1.0), 1000, 1000, true);
    assert_eq!(corner, PixelRect::new(992, 0, 8, 8));

    let origin = pixel_rect(&uv(0.0, 0.0, 0.0, 0.0), 1000, 1000, false);
    assert_eq!(origin, PixelRect::new(0, 0, 8, 8));
}

#[test]
fn pixel_rect_min_size_capped_by_tiny_image() {
    let rect = pixel_rect(&uv(0.0, 0.0, 0.1, 0.1), 4, 4, true);
    assert_eq!(rect, PixelRect::new(0, 0, 4, 4));
}

#[test]
fn pixel_rect_custom_min_size() {
    let rect = pixel_rect_with_min(&uv(0.5, 0.5, 0.5, 0.5), 100, 100, false, 1);
    assert_eq!(rect, PixelRect::new(50, 50, 1, 1));
}

#[test]
fn pixel_rect_to_uv_bounds_inverts_conversion() {
    let rect = PixelRect::new(200, 700, 200, 200);
    let back = rect.to_uv_bounds(1000, 1000, true);
    assert_eq!(pixel_rect(&back, 1000, 1000, true), rect);
}

#[test]
fn pixel_rect_intersect_and_contains() {
    let a = PixelRect::new(0, 0, 10, 10);
    let b = PixelRect::new(5, 5, 10, 10);
    assert_eq!(a.intersect(&b), Some(PixelRect::new(5, 5, 5, 5)));
    assert_eq!(a.intersect(&PixelRect::new(10, 0, 2, 2)), None);
    assert!(a.contains(9, 9));
    assert!(!a.contains(10, 9));
    assert!(a.contains_rect(&PixelRect::new(2, 2, 8, 8)));
    assert!(!a.contains_rect(&b));
}

// ============================================================================
// Background Estimation Tests
// ============================================================================

#[test]
fn background_of_uniform_border_is_exact() {
    let mut region = RgbaImage::from_pixel(40, 30, Rgba([200, 100, 50, 255]));
    fill(&mut region, PixelRect::new(5, 5, 30, 20), [0, 255, 0, 255]);
    assert_eq!(estimate_background(&region), Rgb([200, 100, 50]));
}

#[test]
fn background_averages_mixed_border() {
    let mut region = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
    region.put_pixel(0, 0, Rgba([100, 40, 10, 255]));
    region.put_pixel(1, 1, Rgba([100, 40, 11, 255]));
    // (200 + 2) / 4, (80 + 2) / 4, (21 + 2) / 4
    assert_eq!(estimate_background(&region), Rgb([50, 20, 5]));
}

#[test]
fn background_of_single_pixel() {
    let region = RgbaImage::from_pixel(1, 1, Rgba([9, 8, 7, 255]));
    assert_eq!(estimate_background(&region), Rgb([9, 8, 7]));
}

// ============================================================================
// Foreground Mask Tests
// ============================================================================

#[test]
fn foreground_threshold_is_strict() {
    let mut region = RgbaImage::from_pixel(5, 5, Rgba([100, 100, 100, 255]));
    region.put_pixel(1, 1, Rgba([128, 100, 100, 255]));
    region.put_pixel(2, 2, Rgba([129, 100, 100, 255]));

    let mask = build_foreground_mask(&region, Rgb([100, 100, 100]), 28);
    assert!(!mask.get(1, 1));
    assert!(mask.get(2, 2));
    assert_eq!(mask.count(), 1);
}

#[test]
fn foreground_ignores_alpha() {
    let mut region = RgbaImage::from_pixel(3, 3, Rgba([10, 10, 10, 255]));
    region.put_pixel(1, 1, Rgba([10, 10, 10, 0]));
    let mask = build_foreground_mask(&region, Rgb([10, 10, 10]), 28);
    assert_eq!(mask.count(), 0);
}

#[test]
fn mask_dimensions_match_region() {
    let region = RgbaImage::new(7, 3);
    let mask = build_foreground_mask(&region, Rgb([0, 0, 0]), 28);
    assert_eq!((mask.width(), mask.height()), (7, 3));
    assert!(!mask.get(100, 100));
}

// ============================================================================
// Bounding Box Tests
// ============================================================================

#[test]
fn bounding_box_of_block() {
    let mut mask = ForegroundMask::new(64, 64);
    for y in 30..40 {
        for x in 20..30 {
            mask.set(x, y, true);
        }
    }
    assert_eq!(bounding_box(&mask, 0.0), Some(PixelRect::new(20, 30, 10, 10)));
}

#[test]
fn bounding_box_padding_rounds_up() {
    let mut mask = ForegroundMask::new(64, 64);
    for y in 30..40 {
        for x in 20..30 {
            mask.set(x, y, true);
        }
    }
    // 8% of 10 px is 0.8, rounded up to one pixel per side.
    assert_eq!(bounding_box(&mask, 0.08), Some(PixelRect::new(19, 29, 12, 12)));
}

#[test]
fn bounding_box_padding_clamped_to_mask() {
    let mut mask = ForegroundMask::new(16, 16);
    mask.set(0, 0, true);
    mask.set(15, 15, true);
    assert_eq!(bounding_box(&mask, 0.5), Some(PixelRect::new(0, 0, 16, 16)));
}

#[test]
fn bounding_box_empty_mask_is_none() {
    let mask = ForegroundMask::new(32, 32);
    assert_eq!(bounding_box(&mask, 0.08), None);
}

// ============================================================================
// Segmentation Tests
// ============================================================================

#[test]
fn segment_region_reports_atlas_coordinates() {
    let mut atlas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
    fill(&mut atlas, PixelRect::new(50, 50, 10, 10), [200, 0, 0, 255]);

    let seg = segment_region(&atlas, &PixelRect::new(40, 40, 30, 30), 28, 0.0);
    assert_eq!(seg.background, Rgb([255, 255, 255]));
    assert_eq!(seg.detected, Some(PixelRect::new(50, 50, 10, 10)));
}

#[test]
fn segment_region_ignores_artwork_outside_rect() {
    let mut atlas = RgbaImage::from_pixel(100, 100, Rgba([30, 30, 30, 255]));
    fill(&mut atlas, PixelRect::new(0, 0, 20, 20), [250, 250, 250, 255]);

    let seg = segment_region(&atlas, &PixelRect::new(50, 50, 20, 20), 28, 0.08);
    assert_eq!(seg.background, Rgb([30, 30, 30]));
    assert_eq!(seg.detected, None);
}

#[test]
fn crop_region_copies_pixels() {
    let mut atlas = RgbaImage::new(8, 8);
    atlas.put_pixel(3, 4, Rgba([1, 2, 3, 4]));
    let region = crop_region(&atlas, &PixelRect::new(2, 2, 4, 4));
    assert_eq!(region.dimensions(), (4, 4));
    assert_eq!(region.get_pixel(1, 2), &Rgba([1, 2, 3, 4]));
}
