//! Copy-on-write material isolation.
//!
//! Materials are shared between meshes. Before a feature edits one, the mesh
//! slot is switched to a clone owned by that feature, so siblings keep the
//! untouched original. Clones are tracked in an identity-keyed registry
//! (`(material uuid, tag) -> clone`); nothing is flagged on the material
//! itself.
//!
//! Snapshots record what a material looked like before its first edit and
//! are replayed by [`IsolationManager::restore`].

use std::fmt;

use glam::Vec3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::errors::Result;
use crate::resources::material::{MapChannel, Material, MaterialData, MaterialRef};
use crate::resources::mesh::Mesh;
use crate::resources::texture::Texture;

/// Owner of a material clone. Distinct features use distinct tags so their
/// clones never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureTag {
    BakedTexture,
    MaterialToggle,
    LogoOverlay,
    Custom(&'static str),
}

impl FeatureTag {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureTag::BakedTexture => "baked",
            FeatureTag::MaterialToggle => "toggle",
            FeatureTag::LogoOverlay => "logo",
            FeatureTag::Custom(name) => *name,
        }
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SCALAR_CHANNELS: [MapChannel; 4] = [
    MapChannel::Normal,
    MapChannel::Roughness,
    MapChannel::Metalness,
    MapChannel::AmbientOcclusion,
];

/// Pre-edit state of a material.
#[derive(Debug, Clone)]
pub struct MaterialSnapshot {
    /// Base-color map, including its image and transform.
    pub map: Option<Texture>,
    /// Emissive color and intensity (`None` for unlit materials).
    pub emissive: Option<(Vec3, f32)>,
    pub emissive_map: Option<Texture>,
    /// Normal / roughness / metalness / AO maps.
    pub channel_maps: SmallVec<[(MapChannel, Option<Texture>); 4]>,
}

impl MaterialSnapshot {
    #[must_use]
    pub fn capture(material: &Material) -> Self {
        Self {
            map: material.texture(MapChannel::BaseColor).cloned(),
            emissive: material.emissive(),
            emissive_map: material.texture(MapChannel::Emissive).cloned(),
            channel_maps: SCALAR_CHANNELS
                .into_iter()
                .filter(|c| material.supports(*c))
                .map(|c| (c, material.texture(c).cloned()))
                .collect(),
        }
    }

    /// Writes the captured state back. Works on bare [`MaterialData`] so a
    /// baseline copy can be rebuilt without touching the live material.
    pub fn apply(&self, material: &mut MaterialData) {
        material.set_texture(MapChannel::BaseColor, self.map.clone());
        if let Some((color, intensity)) = self.emissive {
            material.set_emissive(color, intensity);
        }
        material.set_texture(MapChannel::Emissive, self.emissive_map.clone());
        for (channel, texture) in &self.channel_maps {
            material.set_texture(*channel, texture.clone());
        }
    }
}

/// Clone and snapshot registries of one loaded model.
#[derive(Debug, Default)]
pub struct IsolationManager {
    clones: FxHashMap<(Uuid, FeatureTag), MaterialRef>,
    // clone uuid -> the key it was registered under
    origins: FxHashMap<Uuid, (Uuid, FeatureTag)>,
    snapshots: FxHashMap<Uuid, MaterialSnapshot>,
}

impl IsolationManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure the material at `slot` is owned by `tag`, cloning and
    /// substituting it on first use. Idempotent per `(material, tag)`.
    ///
    /// Clones are keyed by the original material, not the mesh: every mesh
    /// that shared the original receives the same clone for a given tag.
    pub fn ensure_exclusive(&mut self, mesh: &mut Mesh, slot: usize, tag: FeatureTag) -> Result<MaterialRef> {
        let current = mesh.try_material_at(slot)?.clone();
        let current_id = current.read().uuid;

        if self
            .origins
            .get(&current_id)
            .is_some_and(|(_, owner)| *owner == tag)
        {
            return Ok(current);
        }

        let key = (current_id, tag);
        let exclusive = match self.clones.get(&key) {
            Some(existing) => existing.clone(),
            None => {
                let clone = current.read().clone_for(tag.as_str());
                log::debug!(
                    "isolating material '{}' for '{tag}' as '{}'",
                    current.read().name(),
                    clone.name()
                );
                let clone_id = clone.uuid;
                let clone = clone.into_ref();
                self.clones.insert(key, clone.clone());
                self.origins.insert(clone_id, key);
                clone
            }
        };

        mesh.set_material_at(slot, exclusive.clone());
        Ok(exclusive)
    }

    /// The clone registered for `original` under `tag`, if any.
    #[must_use]
    pub fn exclusive_clone(&self, original: Uuid, tag: FeatureTag) -> Option<&MaterialRef> {
        self.clones.get(&(original, tag))
    }

    /// Original material uuid a clone was made from.
    #[must_use]
    pub fn origin_of(&self, clone: Uuid) -> Option<Uuid> {
        self.origins.get(&clone).map(|(original, _)| *original)
    }

    /// Captures `material` unless a snapshot already exists.
    pub fn snapshot(&mut self, material: &Material) {
        self.snapshots
            .entry(material.uuid)
            .or_insert_with(|| MaterialSnapshot::capture(material));
    }

    /// Replays and discards the snapshot of `material`. Returns `false`
    /// (and changes nothing) if there is none.
    pub fn restore(&mut self, material: &mut Material) -> bool {
        match self.snapshots.remove(&material.uuid) {
            Some(snapshot) => {
                snapshot.apply(material);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn snapshot_of(&self, material: Uuid) -> Option<&MaterialSnapshot> {
        self.snapshots.get(&material)
    }

    #[must_use]
    pub fn has_snapshot(&self, material: Uuid) -> bool {
        self.snapshots.contains_key(&material)
    }

    #[must_use]
    pub fn clone_count(&self) -> usize {
        self.clones.len()
    }

    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Forgets all clones and snapshots (model disposal).
    pub fn dispose(&mut self) {
        self.clones.clear();
        self.origins.clear();
        self.snapshots.clear();
    }
}
