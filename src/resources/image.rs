use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{Rgba, RgbaImage};

use crate::errors::{DecalError, Result};

// Global Image ID generator (uses u64 for cheap identity comparisons)
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct ImageInner {
    pub id: u64,
    label: Cow<'static, str>,

    // Pixel content. Never written after construction: edits produce a new Image.
    pixels: RgbaImage,
}

impl ImageInner {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Shared handle to an immutable RGBA8 pixel buffer.
///
/// Cloning is cheap and keeps the same identity. Renderers holding a clone
/// keep observing the old buffer until the owning texture swaps in a new one.
#[derive(Debug, Clone)]
pub struct Image(Arc<ImageInner>);

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for Image {}
impl std::hash::Hash for Image {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Image {
    pub fn new(label: Option<&str>, pixels: RgbaImage) -> Self {
        Self(Arc::new(ImageInner {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            label: label.map_or(Cow::Borrowed("Unnamed Image"), |s| {
                Cow::Owned(s.to_string())
            }),
            pixels,
        }))
    }

    /// Wraps a tightly packed RGBA8 buffer. Returns `None` when the buffer
    /// length does not match `width * height * 4`.
    #[must_use]
    pub fn from_raw(label: Option<&str>, width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(|pixels| Self::new(label, pixels))
    }

    /// Image filled with a single color.
    #[must_use]
    pub fn solid(label: Option<&str>, width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::new(label, RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.pixels.width()
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.pixels.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.0.pixels
    }

    /// Byte-level comparison, independent of identity.
    #[must_use]
    pub fn same_pixels(&self, other: &Image) -> bool {
        self == other
            || (self.width() == other.width()
                && self.height() == other.height()
                && self.0.pixels.as_raw() == other.0.pixels.as_raw())
    }
}

// Deref for convenient read-only access to inner data
impl std::ops::Deref for Image {
    type Target = ImageInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Decodes an encoded image (PNG, JPEG, WebP) into an RGBA8 bitmap.
///
/// Empty bitmaps are reported as decode failures so nothing downstream has
/// to handle zero-sized sources.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(DecalError::ImageDecode("decoded image is empty".to_string()));
    }
    Ok(decoded)
}
