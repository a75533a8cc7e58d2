//! Scene containers.
//!
//! A loaded model is a flat list of meshes. Hierarchy and transforms play
//! no part in texture-space edits, so only the container is kept here.

pub mod model;

pub use model::Model;
