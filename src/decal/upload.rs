//! Serialized decal uploads.
//!
//! Uploads are decoded outside any lock and applied one at a time. Each
//! `(mesh, slot)` keeps a generation counter: [`UploadCoordinator::begin`]
//! bumps it, and a ticket whose generation is no longer current is dropped
//! at apply time. A newer upload therefore always wins, even if an older
//! one finishes decoding later.

use image::RgbaImage;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::decal::engine::{DecalEngine, DecalReport};
use crate::errors::Result;
use crate::resources::image::decode_rgba;
use crate::resources::mesh::Mesh;

/// Handle of one pending upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    pub mesh: Uuid,
    pub slot: usize,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Applied(DecalReport),
    /// A newer upload (or a restore) was started for the same slot.
    Superseded,
}

#[derive(Debug, Default)]
pub struct UploadCoordinator {
    engine: Mutex<DecalEngine>,
    generations: Mutex<FxHashMap<(Uuid, usize), u64>>,
}

impl UploadCoordinator {
    #[must_use]
    pub fn new(engine: DecalEngine) -> Self {
        Self {
            engine: Mutex::new(engine),
            generations: Mutex::new(FxHashMap::default()),
        }
    }

    /// Starts an upload, superseding every earlier ticket for the slot.
    pub fn begin(&self, mesh: &Mesh, slot: usize) -> UploadTicket {
        let generation = self.bump(mesh.uuid, slot);
        UploadTicket {
            mesh: mesh.uuid,
            slot,
            generation,
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &UploadTicket) -> bool {
        self.generations
            .lock()
            .get(&(ticket.mesh, ticket.slot))
            .is_some_and(|g| *g == ticket.generation)
    }

    /// Decodes `bytes` and applies them if `ticket` is still current.
    /// Decode errors are returned whether or not the ticket is current.
    pub fn submit(&self, ticket: UploadTicket, mesh: &mut Mesh, bytes: &[u8]) -> Result<UploadOutcome> {
        let decoded = decode_rgba(bytes)?;
        self.submit_decoded(ticket, mesh, &decoded)
    }

    pub fn submit_decoded(
        &self,
        ticket: UploadTicket,
        mesh: &mut Mesh,
        decoded: &RgbaImage,
    ) -> Result<UploadOutcome> {
        let mut engine = self.engine.lock();

        if ticket.mesh != mesh.uuid {
            log::warn!("upload ticket for mesh {} submitted against '{}'", ticket.mesh, mesh.name);
            return Ok(UploadOutcome::Superseded);
        }
        if !self.is_current(&ticket) {
            log::debug!(
                "dropping superseded upload for '{}' slot {} (generation {})",
                mesh.name,
                ticket.slot,
                ticket.generation
            );
            return Ok(UploadOutcome::Superseded);
        }

        engine
            .apply_decal(mesh, ticket.slot, decoded)
            .map(UploadOutcome::Applied)
    }

    /// Restores the slot and invalidates pending uploads for it.
    pub fn restore(&self, mesh: &Mesh, slot: usize) -> bool {
        let mut engine = self.engine.lock();
        self.bump(mesh.uuid, slot);
        engine.restore_original(mesh, slot)
    }

    /// Runs `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut DecalEngine) -> R) -> R {
        f(&mut self.engine.lock())
    }

    pub fn into_inner(self) -> DecalEngine {
        self.engine.into_inner()
    }

    fn bump(&self, mesh: Uuid, slot: usize) -> u64 {
        let mut generations = self.generations.lock();
        let generation = generations.entry((mesh, slot)).or_insert(0);
        *generation += 1;
        *generation
    }
}
