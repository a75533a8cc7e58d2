//! Decal engine.
//!
//! Glues the pipeline stages together for one `(mesh, slot)` request:
//!
//! 1. isolate the slot's material behind a [`FeatureTag::LogoOverlay`] clone,
//! 2. resolve UV bounds and segment the base-color atlas,
//! 3. composite (direct atlas, tiny island, or centered-square fallback),
//! 4. flatten PBR channel maps under the footprint,
//! 5. snapshot and install everything under one write guard.
//!
//! Every upload composites against the pre-decal state of the material, so
//! repeated uploads replace the previous decal instead of stacking on it.

use image::RgbaImage;
use uuid::Uuid;

use crate::decal::bounds::{UvBounds, compute_raw_bounds, compute_transformed_bounds};
use crate::decal::composite::{
    CompositeError, CompositeOutput, CompositeRequest, CompositeStrategy, composite,
    composite_centered_square, select_strategy,
};
use crate::decal::config::DecalConfig;
use crate::decal::isolation::{FeatureTag, IsolationManager};
use crate::decal::neutralize::{NeutralizedMap, install, plan_neutralize};
use crate::decal::segment::{PixelRect, pixel_rect_with_min, segment_region};
use crate::errors::{DecalError, Result};
use crate::resources::geometry::Geometry;
use crate::resources::image::{Image, decode_rgba};
use crate::resources::material::{MapChannel, MaterialData};
use crate::resources::mesh::Mesh;
use crate::resources::texture::Texture;
use crate::scene::model::Model;

/// Why the UV-aware path was not used.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The geometry has no UV attribute, or no vertex was reached.
    NoUvs,
    /// The material has no base-color map to composite into.
    NoBaseMap,
    /// The UV-aware composite failed.
    Failed(CompositeError),
}

/// Summary of one applied decal.
#[derive(Debug, Clone, PartialEq)]
pub struct DecalReport {
    /// The exclusive clone the decal was installed on.
    pub material: Uuid,
    pub strategy: CompositeStrategy,
    /// Atlas rectangle the slot samples (UV-aware path only).
    pub target_rect: Option<PixelRect>,
    /// Existing artwork found inside `target_rect`.
    pub detected_box: Option<PixelRect>,
    /// Pixels of the installed base image covered by the decal.
    pub footprint: PixelRect,
    pub fallback: Option<FallbackReason>,
    pub neutralized: Vec<NeutralizedMap>,
}

impl DecalReport {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

// Everything computed before the write guard is taken.
struct Plan {
    output: CompositeOutput,
    target_rect: Option<PixelRect>,
    detected_box: Option<PixelRect>,
    fallback: Option<FallbackReason>,
    neutralize: Vec<(NeutralizedMap, Image)>,
    mirror_emissive: bool,
}

/// Per-model decal state: configuration plus the clone and snapshot
/// registries. Dispose together with the model.
#[derive(Debug, Default)]
pub struct DecalEngine {
    config: DecalConfig,
    isolation: IsolationManager,
}

impl DecalEngine {
    pub fn new(config: DecalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            isolation: IsolationManager::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DecalConfig {
        &self.config
    }

    #[must_use]
    pub fn isolation(&self) -> &IsolationManager {
        &self.isolation
    }

    /// Decodes `bytes` and applies the result. A decode failure leaves the
    /// mesh and its materials untouched.
    pub fn apply_decal_bytes(&mut self, mesh: &mut Mesh, slot: usize, bytes: &[u8]) -> Result<DecalReport> {
        let decoded = decode_rgba(bytes)?;
        self.apply_decal(mesh, slot, &decoded)
    }

    /// Composites `decoded` onto the material at `slot` of `mesh`.
    ///
    /// Only input errors are returned. Geometry or atlas problems degrade to
    /// the centered-square fallback.
    ///
    /// Meshes that shared a material share its decal clone, so a decal on
    /// one of them replaces the decal previously applied through another.
    pub fn apply_decal(&mut self, mesh: &mut Mesh, slot: usize, decoded: &RgbaImage) -> Result<DecalReport> {
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(DecalError::ImageDecode("decoded image is empty".into()));
        }

        let material = self
            .isolation
            .ensure_exclusive(mesh, slot, FeatureTag::LogoOverlay)?;

        let (material_id, plan) = {
            let guard = material.read();
            let mut baseline = guard.data.clone();
            if let Some(snapshot) = self.isolation.snapshot_of(guard.uuid) {
                snapshot.apply(&mut baseline);
            }
            (guard.uuid, self.plan(&mesh.geometry, slot, &baseline, decoded))
        };

        let Plan {
            output,
            target_rect,
            detected_box,
            fallback,
            neutralize,
            mirror_emissive,
        } = plan;

        let neutralized = {
            let mut guard = material.write();
            self.isolation.snapshot(&guard);

            let label = format!("{}:decal", guard.name());
            let image = Image::new(Some(&label), output.image);
            match guard.texture_mut(MapChannel::BaseColor) {
                Some(map) => map.set_override(image.clone(), output.transform),
                None => {
                    let mut map = Texture::new(&label, image.clone());
                    if let Some(transform) = output.transform {
                        map = map.with_transform(transform);
                    }
                    guard.set_texture(MapChannel::BaseColor, Some(map));
                }
            }
            if mirror_emissive
                && let Some(emissive) = guard.texture_mut(MapChannel::Emissive)
            {
                emissive.set_override(image, output.transform);
            }
            install(&mut guard, neutralize)
        };

        log::info!(
            "decal applied to '{}' slot {slot}: {:?}, footprint {:?}",
            mesh.name,
            output.strategy,
            output.footprint
        );

        Ok(DecalReport {
            material: material_id,
            strategy: output.strategy,
            target_rect,
            detected_box,
            footprint: output.footprint,
            fallback,
            neutralized,
        })
    }

    fn plan(&self, geometry: &Geometry, slot: usize, baseline: &MaterialData, decoded: &RgbaImage) -> Plan {
        let base = baseline.texture(MapChannel::BaseColor);
        let raw = compute_raw_bounds(geometry, slot);

        let uv_aware = match (base, raw) {
            (None, _) => Err(FallbackReason::NoBaseMap),
            (Some(_), None) => Err(FallbackReason::NoUvs),
            (Some(texture), Some(raw)) => self
                .plan_uv_aware(geometry, slot, texture, raw, decoded)
                .map_err(|err| {
                    log::warn!("UV-aware decal failed, using centered square: {err}");
                    FallbackReason::Failed(err)
                }),
        };

        match uv_aware {
            Ok((output, target, detected, footprint_uv)) => {
                let neutralize = plan_neutralize(baseline, &footprint_uv, &self.config);
                let mirror_emissive = shares_base_image(baseline);
                Plan {
                    output,
                    target_rect: Some(target),
                    detected_box: detected,
                    fallback: None,
                    neutralize,
                    mirror_emissive,
                }
            }
            Err(reason) => {
                log::debug!("centered-square fallback: {reason:?}");
                let output = composite_centered_square(
                    decoded,
                    base.map(|t| t.image().pixels()),
                    &self.config,
                );
                Plan {
                    output,
                    target_rect: None,
                    detected_box: None,
                    fallback: Some(reason),
                    neutralize: Vec::new(),
                    mirror_emissive: false,
                }
            }
        }
    }

    /// Segments and composites against the sampled atlas. Returns the output
    /// plus target, detected box and the decal footprint in sampler UVs.
    fn plan_uv_aware(
        &self,
        geometry: &Geometry,
        slot: usize,
        texture: &Texture,
        raw: UvBounds,
        decoded: &RgbaImage,
    ) -> std::result::Result<(CompositeOutput, PixelRect, Option<PixelRect>, UvBounds), CompositeError> {
        let atlas = texture.image().pixels();
        let (aw, ah) = atlas.dimensions();
        if aw == 0 || ah == 0 {
            return Err(CompositeError::EmptyAtlas);
        }
        if !raw.is_finite() {
            return Err(CompositeError::NonFiniteBounds(raw));
        }

        let flip_y = texture.flip_y;
        let sampled = compute_transformed_bounds(geometry, slot, texture).unwrap_or(raw);
        if !sampled.is_finite() {
            return Err(CompositeError::NonFiniteBounds(sampled));
        }

        let target = pixel_rect_with_min(&sampled, aw, ah, flip_y, self.config.min_rect_size);
        let segmentation = segment_region(
            atlas,
            &target,
            self.config.foreground_threshold,
            self.config.bbox_padding,
        );
        let strategy = select_strategy(&raw, aw, ah, flip_y, &self.config);

        let request = CompositeRequest {
            atlas,
            source: decoded,
            target,
            detected: segmentation.detected,
            background: segmentation.background,
            raw_bounds: raw,
            flip_y,
            strategy,
        };
        let output = composite(&request, &self.config)?;

        let footprint_uv = match output.strategy {
            CompositeStrategy::DirectAtlas => output.footprint.to_uv_bounds(aw, ah, flip_y),
            _ => sampled,
        };
        Ok((output, target, segmentation.detected, footprint_uv))
    }

    /// Undoes every decal edit on the material at `slot`. Calling it again,
    /// or on a material that was never edited, changes nothing.
    pub fn restore_original(&mut self, mesh: &Mesh, slot: usize) -> bool {
        let Some(material) = mesh.material_at(slot) else {
            return false;
        };
        let mut guard = material.write();
        let restored = self.isolation.restore(&mut guard);
        if restored {
            log::info!("restored '{}' on '{}' slot {slot}", guard.name(), mesh.name);
        }
        restored
    }

    /// Restores every slot of every mesh. Returns the number of materials
    /// that changed.
    pub fn restore_model(&mut self, model: &Model) -> usize {
        model
            .material_slots()
            .into_iter()
            .filter(|&(index, slot)| {
                model
                    .mesh(index)
                    .is_some_and(|mesh| self.restore_original(mesh, slot))
            })
            .count()
    }

    /// Drops all clones and snapshots. Call when the model is unloaded.
    pub fn dispose(&mut self) {
        log::debug!(
            "disposing decal state: {} clone(s), {} snapshot(s)",
            self.isolation.clone_count(),
            self.isolation.snapshot_count()
        );
        self.isolation.dispose();
    }
}

// Baked emissive atlases are often the base-color image reused; such a map
// would keep glowing with the old artwork.
fn shares_base_image(material: &MaterialData) -> bool {
    match (
        material.texture(MapChannel::BaseColor),
        material.texture(MapChannel::Emissive),
    ) {
        (Some(base), Some(emissive)) => base.image() == emissive.image(),
        _ => false,
    }
}
