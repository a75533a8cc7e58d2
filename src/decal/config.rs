//! Tunable constants of the decal pipeline.
//!
//! Every value here was picked empirically. They are exposed as a
//! serializable config so deployments can override them without a rebuild:
//!
//! ```rust,ignore
//! let config = DecalConfig::from_json(r#"{ "tiny_island_threshold": 96 }"#)?;
//! ```

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::errors::{DecalError, Result};

/// Resampling filter used when scaling the user image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecalConfig {
    /// RGB distance above which a pixel counts as existing artwork.
    pub foreground_threshold: u8,
    /// Smallest pixel rectangle a UV region is converted to.
    pub min_rect_size: u32,
    /// Padding added around detected artwork, as a fraction of its size.
    pub bbox_padding: f32,
    /// Regions narrower or shorter than this (in atlas pixels) get a
    /// dedicated canvas instead of being drawn into the atlas.
    pub tiny_island_threshold: u32,
    /// Edge length of the dedicated canvas (tiny islands and fallback).
    pub canvas_size: u32,
    /// Overfill applied to the largest tiny islands.
    pub overfill_min: f32,
    /// Overfill applied to the smallest tiny islands.
    pub overfill_max: f32,
    /// Width of the ring sampled around a region when flattening scalar maps.
    pub neutralize_border: u32,
    /// Share of the fallback canvas covered by the centered square.
    pub fallback_fill: f32,
    pub resample: ResampleFilter,
}

impl Default for DecalConfig {
    fn default() -> Self {
        Self {
            foreground_threshold: 28,
            min_rect_size: 8,
            bbox_padding: 0.08,
            tiny_island_threshold: 64,
            canvas_size: 512,
            overfill_min: 1.8,
            overfill_max: 2.5,
            neutralize_border: 2,
            fallback_fill: 0.8,
            resample: ResampleFilter::default(),
        }
    }
}

impl DecalConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_size == 0 {
            return Err(DecalError::InvalidConfig("canvas_size must be positive".into()));
        }
        if self.min_rect_size == 0 {
            return Err(DecalError::InvalidConfig("min_rect_size must be positive".into()));
        }
        if !(self.overfill_min > 0.0 && self.overfill_min <= self.overfill_max) {
            return Err(DecalError::InvalidConfig(format!(
                "overfill range [{}, {}] is empty or non-positive",
                self.overfill_min, self.overfill_max
            )));
        }
        if !(self.fallback_fill > 0.0 && self.fallback_fill <= 1.0) {
            return Err(DecalError::InvalidConfig("fallback_fill must be in (0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.bbox_padding) {
            return Err(DecalError::InvalidConfig("bbox_padding must be in [0, 1]".into()));
        }
        Ok(())
    }

    /// Overfill factor for an island whose smaller side is `island_px`
    /// atlas pixels. The tinier the island, the stronger the overfill.
    #[must_use]
    pub fn overfill_for(&self, island_px: u32) -> f32 {
        let threshold = self.tiny_island_threshold.max(1) as f32;
        let t = (island_px as f32 / threshold).clamp(0.0, 1.0);
        self.overfill_max + (self.overfill_min - self.overfill_max) * t
    }
}
