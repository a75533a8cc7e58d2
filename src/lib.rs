#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod resources;
pub mod scene;
pub mod decal;
pub mod errors;

pub use resources::{Mesh, Material, MaterialRef, MapChannel, Texture, TextureTransform, Image, Geometry};
pub use resources::primitives::*;
pub use scene::Model;
pub use decal::{DecalConfig, DecalEngine, DecalReport, UploadCoordinator, UploadOutcome};
pub use errors::{DecalError, Result};
