//! Error Types
//!
//! This module defines the error types used throughout the decal engine.
//!
//! # Overview
//!
//! Only a handful of conditions are surfaced to callers:
//! - Decoding the user-supplied image failed (or produced an empty bitmap)
//! - The requested material slot does not exist on the mesh
//! - A configuration document could not be parsed or is inconsistent
//!
//! Geometry and atlas anomalies are recovered locally with a degraded
//! composite and never reach the caller.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, DecalError>`.
//!
//! ```rust,ignore
//! use myth_decal::errors::{DecalError, Result};
//!
//! fn upload(bytes: &[u8]) -> Result<()> {
//!     let _image = myth_decal::resources::image::decode_rgba(bytes)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the decal engine.
#[derive(Error, Debug)]
pub enum DecalError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// The mesh has no material at the requested slot.
    #[error("Material slot out of range: mesh '{mesh}' has {available} slot(s), requested {slot}")]
    MaterialSlotOutOfRange {
        /// Name of the mesh being addressed
        mesh: String,
        /// The requested slot
        slot: usize,
        /// Number of slots the mesh actually carries
        available: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration values are inconsistent.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for DecalError {
    fn from(err: image::ImageError) -> Self {
        DecalError::ImageDecode(err.to_string())
    }
}

/// Alias for `Result<T, DecalError>`.
pub type Result<T> = std::result::Result<T, DecalError>;
