use std::borrow::Cow;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use bitflags::bitflags;
use glam::{Vec3, Vec4};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::resources::texture::Texture;

/// Shared material handle. Several meshes may point at the same instance.
pub type MaterialRef = Arc<RwLock<Material>>;

// Channel-map flags
bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFeatures: u32 {
        const USE_MAP           = 1 << 0;
        const USE_NORMAL_MAP    = 1 << 1;
        const USE_ROUGHNESS_MAP = 1 << 2;
        const USE_METALNESS_MAP = 1 << 3;
        const USE_EMISSIVE_MAP  = 1 << 4;
        const USE_AO_MAP        = 1 << 5;
    }
}

/// A channel-map slot on a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapChannel {
    BaseColor,
    Normal,
    Roughness,
    Metalness,
    AmbientOcclusion,
    Emissive,
}

impl MapChannel {
    pub const ALL: [MapChannel; 6] = [
        MapChannel::BaseColor,
        MapChannel::Normal,
        MapChannel::Roughness,
        MapChannel::Metalness,
        MapChannel::AmbientOcclusion,
        MapChannel::Emissive,
    ];

    #[must_use]
    pub fn feature(self) -> MaterialFeatures {
        match self {
            MapChannel::BaseColor => MaterialFeatures::USE_MAP,
            MapChannel::Normal => MaterialFeatures::USE_NORMAL_MAP,
            MapChannel::Roughness => MaterialFeatures::USE_ROUGHNESS_MAP,
            MapChannel::Metalness => MaterialFeatures::USE_METALNESS_MAP,
            MapChannel::AmbientOcclusion => MaterialFeatures::USE_AO_MAP,
            MapChannel::Emissive => MaterialFeatures::USE_EMISSIVE_MAP,
        }
    }
}

// ============================================================================
// Specific Materials
// ============================================================================

/// Color-only material without lighting channels.
#[derive(Debug, Clone)]
pub struct UnlitMaterial {
    pub color: Vec4,
    pub map: Option<Texture>,
}

impl UnlitMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self { color, map: None }
    }
}

impl Default for UnlitMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

/// Metallic-roughness PBR material.
#[derive(Debug, Clone)]
pub struct StandardMaterial {
    pub color: Vec4,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Vec3,
    pub emissive_intensity: f32,

    pub map: Option<Texture>,
    pub normal_map: Option<Texture>,
    pub roughness_map: Option<Texture>,
    pub metalness_map: Option<Texture>,
    pub ao_map: Option<Texture>,
    pub emissive_map: Option<Texture>,
}

impl StandardMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Vec3::ZERO,
            emissive_intensity: 1.0,
            map: None,
            normal_map: None,
            roughness_map: None,
            metalness_map: None,
            ao_map: None,
            emissive_map: None,
        }
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

// ============================================================================
// Material Data Enum
// ============================================================================

/// Material variants. Channel availability is decided by the variant, so
/// asking an unlit material for its normal map is a checked `None`.
#[derive(Debug, Clone)]
pub enum MaterialData {
    Unlit(UnlitMaterial),
    Standard(StandardMaterial),
}

impl MaterialData {
    #[must_use]
    pub fn texture(&self, channel: MapChannel) -> Option<&Texture> {
        match (self, channel) {
            (Self::Unlit(m), MapChannel::BaseColor) => m.map.as_ref(),
            (Self::Unlit(_), _) => None,
            (Self::Standard(m), MapChannel::BaseColor) => m.map.as_ref(),
            (Self::Standard(m), MapChannel::Normal) => m.normal_map.as_ref(),
            (Self::Standard(m), MapChannel::Roughness) => m.roughness_map.as_ref(),
            (Self::Standard(m), MapChannel::Metalness) => m.metalness_map.as_ref(),
            (Self::Standard(m), MapChannel::AmbientOcclusion) => m.ao_map.as_ref(),
            (Self::Standard(m), MapChannel::Emissive) => m.emissive_map.as_ref(),
        }
    }

    pub fn texture_mut(&mut self, channel: MapChannel) -> Option<&mut Texture> {
        self.slot_mut(channel).and_then(Option::as_mut)
    }

    /// Replaces the texture in `channel`. Returns `false` when the variant
    /// has no such channel.
    pub fn set_texture(&mut self, channel: MapChannel, texture: Option<Texture>) -> bool {
        match self.slot_mut(channel) {
            Some(slot) => {
                *slot = texture;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn supports(&self, channel: MapChannel) -> bool {
        match self {
            Self::Unlit(_) => channel == MapChannel::BaseColor,
            Self::Standard(_) => true,
        }
    }

    fn slot_mut(&mut self, channel: MapChannel) -> Option<&mut Option<Texture>> {
        match (self, channel) {
            (Self::Unlit(m), MapChannel::BaseColor) => Some(&mut m.map),
            (Self::Unlit(_), _) => None,
            (Self::Standard(m), MapChannel::BaseColor) => Some(&mut m.map),
            (Self::Standard(m), MapChannel::Normal) => Some(&mut m.normal_map),
            (Self::Standard(m), MapChannel::Roughness) => Some(&mut m.roughness_map),
            (Self::Standard(m), MapChannel::Metalness) => Some(&mut m.metalness_map),
            (Self::Standard(m), MapChannel::AmbientOcclusion) => Some(&mut m.ao_map),
            (Self::Standard(m), MapChannel::Emissive) => Some(&mut m.emissive_map),
        }
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        MapChannel::ALL
            .iter()
            .filter(|c| self.texture(**c).is_some())
            .fold(MaterialFeatures::empty(), |acc, c| acc | c.feature())
    }

    /// Emissive color and intensity, for variants that have them.
    #[must_use]
    pub fn emissive(&self) -> Option<(Vec3, f32)> {
        match self {
            Self::Unlit(_) => None,
            Self::Standard(m) => Some((m.emissive, m.emissive_intensity)),
        }
    }

    pub fn set_emissive(&mut self, color: Vec3, intensity: f32) {
        if let Self::Standard(m) = self {
            m.emissive = color;
            m.emissive_intensity = intensity;
        }
    }
}

// ============================================================================
// Material Wrapper
// ============================================================================

#[derive(Debug)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Option<Cow<'static, str>>,
    pub data: MaterialData,
}

impl Material {
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            data,
        }
    }

    pub fn new_unlit(color: Vec4) -> Self {
        Self::from(UnlitMaterial::new(color))
    }

    pub fn new_standard(color: Vec4) -> Self {
        Self::from(StandardMaterial::new(color))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("Material")
    }

    /// Wraps the material in a shared handle.
    pub fn into_ref(self) -> MaterialRef {
        Arc::new(RwLock::new(self))
    }

    /// Structural copy with a new identity: every channel map becomes a new
    /// texture (sharing immutable pixels), scalar properties are copied.
    #[must_use]
    pub fn clone_for(&self, suffix: &str) -> Material {
        let mut data = self.data.clone();
        for channel in MapChannel::ALL {
            if let Some(tex) = data.texture_mut(channel) {
                *tex = tex.duplicate();
            }
        }
        Material {
            uuid: Uuid::new_v4(),
            name: Some(Cow::Owned(format!("{}#{suffix}", self.name()))),
            data,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut StandardMaterial> {
        match &mut self.data {
            MaterialData::Standard(m) => Some(m),
            MaterialData::Unlit(_) => None,
        }
    }
}

// ============================================================================
// Conversions from concrete materials
// ============================================================================

impl From<UnlitMaterial> for Material {
    fn from(data: UnlitMaterial) -> Self {
        Material::new(MaterialData::Unlit(data))
    }
}

impl From<StandardMaterial> for Material {
    fn from(data: StandardMaterial) -> Self {
        Material::new(MaterialData::Standard(data))
    }
}

impl Deref for Material {
    type Target = MaterialData;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Material {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}
