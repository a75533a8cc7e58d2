//! Texture-space decal compositing
//!
//! Places a user image on a chosen region of a textured mesh by rewriting
//! the texture data itself:
//! - bounds: UV rectangle of a mesh slot, raw or as sampled
//! - segment: UV → pixel conversion, background estimate, artwork detection
//! - composite: direct-atlas, tiny-island and centered-square paths
//! - isolation: per-feature material clones and pre-edit snapshots
//! - neutralize: flattening of normal / roughness / metalness / AO maps
//! - engine: the end-to-end apply / restore entry points
//! - upload: serialized uploads with newest-wins supersession

pub mod bounds;
pub mod composite;
pub mod config;
pub mod engine;
pub mod isolation;
pub mod neutralize;
pub mod segment;
pub mod upload;

pub use bounds::{UvBounds, compute_raw_bounds, compute_transformed_bounds};
pub use composite::{CompositeError, CompositeOutput, CompositeStrategy};
pub use config::{DecalConfig, ResampleFilter};
pub use engine::{DecalEngine, DecalReport, FallbackReason};
pub use isolation::{FeatureTag, IsolationManager, MaterialSnapshot};
pub use neutralize::{NeutralizedMap, neutralize_slot};
pub use segment::{ForegroundMask, PixelRect, Segmentation, pixel_rect};
pub use upload::{UploadCoordinator, UploadOutcome, UploadTicket};
