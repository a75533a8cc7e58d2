use crate::resources::mesh::Mesh;

/// Meshes of one loaded model, in load order.
#[derive(Debug, Default)]
pub struct Model {
    pub name: String,
    meshes: Vec<Mesh>,
}

impl Model {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            meshes: Vec::new(),
        }
    }

    /// Appends a mesh and returns its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    #[must_use]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    #[must_use]
    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    /// First mesh with the given name.
    #[must_use]
    pub fn find_mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    /// Every `(mesh index, slot)` pair, covering single- and multi-material
    /// meshes alike.
    #[must_use]
    pub fn material_slots(&self) -> Vec<(usize, usize)> {
        self.meshes
            .iter()
            .enumerate()
            .flat_map(|(index, mesh)| (0..mesh.slot_count()).map(move |slot| (index, slot)))
            .collect()
    }
}
