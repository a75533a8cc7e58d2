use glam::Vec2;
use image::RgbaImage;
use uuid::Uuid;

use crate::resources::image::Image;

// ============================================================================
// 1. UV Transform
// ============================================================================

/// 2D sampling transform applied to UVs before the atlas is addressed.
///
/// The order matches what the sampler does: rotate about `center`, scale by
/// `repeat`, then add `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub rotation: f32,
    pub center: Vec2,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
            center: Vec2::new(0.5, 0.5),
        }
    }
}

impl TextureTransform {
    /// Transform that maps the unit square onto `[origin, origin + span]`.
    #[must_use]
    pub fn remap(origin: Vec2, span: Vec2) -> Self {
        Self {
            offset: origin,
            repeat: span,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Maps a mesh UV to the coordinate the sampler actually reads.
    #[must_use]
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        let p = uv - self.center;
        let (s, c) = self.rotation.sin_cos();
        let rotated = Vec2::new(c * p.x - s * p.y, s * p.x + c * p.y) + self.center;
        rotated * self.repeat + self.offset
    }
}

// ============================================================================
// 2. Texture Asset
// ============================================================================

// Replacement content installed on top of the original.
#[derive(Debug, Clone)]
struct TextureOverride {
    image: Image,
    // `None` keeps the original transform.
    transform: Option<TextureTransform>,
}

/// A channel map: an immutable original image plus an optional override.
///
/// Edits never touch the original; they only swap the override.
#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,

    original: Image,
    original_transform: TextureTransform,
    current: Option<TextureOverride>,

    /// Rows are stored top-down while V grows upward (image-style textures).
    /// Set to `false` for glTF-style textures where V grows downward.
    pub flip_y: bool,

    version: u64,
}

impl Texture {
    /// Wraps an existing image with an identity transform.
    pub fn new(name: &str, image: Image) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            original: image,
            original_transform: TextureTransform::default(),
            current: None,
            flip_y: true,
            version: 0,
        }
    }

    pub fn from_rgba(name: &str, pixels: RgbaImage) -> Self {
        Self::new(name, Image::new(Some(name), pixels))
    }

    /// 1x1 texture of a single color.
    pub fn create_solid_color(name: &str, color: [u8; 4]) -> Self {
        Self::new(name, Image::solid(Some(name), 1, 1, color))
    }

    #[must_use]
    pub fn with_transform(mut self, transform: TextureTransform) -> Self {
        self.original_transform = transform;
        self
    }

    #[must_use]
    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Copy with a fresh identity that shares the (immutable) image data.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// The image the renderer should sample.
    #[must_use]
    pub fn image(&self) -> &Image {
        self.current.as_ref().map_or(&self.original, |o| &o.image)
    }

    /// The transform the renderer should apply.
    #[must_use]
    pub fn transform(&self) -> TextureTransform {
        self.current
            .as_ref()
            .and_then(|o| o.transform)
            .unwrap_or(self.original_transform)
    }

    #[must_use]
    pub fn has_override(&self) -> bool {
        self.current.is_some()
    }

    pub fn set_override(&mut self, image: Image, transform: Option<TextureTransform>) {
        self.current = Some(TextureOverride { image, transform });
        self.needs_update();
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Same sampled pixels, transform and orientation.
    #[must_use]
    pub fn content_eq(&self, other: &Texture) -> bool {
        self.flip_y == other.flip_y
            && self.transform() == other.transform()
            && self.image().same_pixels(other.image())
    }
}
