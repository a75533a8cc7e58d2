use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{DecalError, Result};
use crate::resources::geometry::Geometry;
use crate::resources::material::MaterialRef;

/// Material binding of a mesh: one material for the whole geometry, or one
/// per draw-group slot.
#[derive(Debug, Clone)]
pub enum MeshMaterial {
    Single(MaterialRef),
    Multi(Vec<MaterialRef>),
}

impl MeshMaterial {
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, slot: usize) -> Option<&MaterialRef> {
        match self {
            Self::Single(m) => (slot == 0).then_some(m),
            Self::Multi(list) => list.get(slot),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialRef> {
        let (single, multi) = match self {
            Self::Single(m) => (Some(m), &[][..]),
            Self::Multi(list) => (None, list.as_slice()),
        };
        single.into_iter().chain(multi.iter())
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub uuid: Uuid,
    pub name: String,

    // Resources
    pub geometry: Arc<Geometry>,
    material: MeshMaterial,

    pub visible: bool,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, material: MaterialRef) -> Self {
        Self::with_materials(geometry, MeshMaterial::Single(material))
    }

    pub fn new_multi(geometry: Arc<Geometry>, materials: Vec<MaterialRef>) -> Self {
        Self::with_materials(geometry, MeshMaterial::Multi(materials))
    }

    fn with_materials(geometry: Arc<Geometry>, material: MeshMaterial) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn material(&self) -> &MeshMaterial {
        &self.material
    }

    pub fn is_multi_material(&self) -> bool {
        matches!(self.material, MeshMaterial::Multi(_))
    }

    pub fn slot_count(&self) -> usize {
        self.material.len()
    }

    pub fn material_at(&self, slot: usize) -> Option<&MaterialRef> {
        self.material.get(slot)
    }

    /// Like [`Mesh::material_at`] but reports a missing slot as an error.
    pub fn try_material_at(&self, slot: usize) -> Result<&MaterialRef> {
        self.material_at(slot)
            .ok_or_else(|| DecalError::MaterialSlotOutOfRange {
                mesh: self.name.clone(),
                slot,
                available: self.slot_count(),
            })
    }

    /// Replaces the material at `slot`, keeping the single/multi shape.
    /// Returns `false` if the slot does not exist.
    pub fn set_material_at(&mut self, slot: usize, material: MaterialRef) -> bool {
        match &mut self.material {
            MeshMaterial::Single(m) if slot == 0 => {
                *m = material;
                true
            }
            MeshMaterial::Single(_) => false,
            MeshMaterial::Multi(list) => match list.get_mut(slot) {
                Some(m) => {
                    *m = material;
                    true
                }
                None => false,
            },
        }
    }
}
