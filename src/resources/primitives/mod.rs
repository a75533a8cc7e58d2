pub mod plane;

pub use plane::{create_plane, PlaneOptions};
