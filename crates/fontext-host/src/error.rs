//! Host graph errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to load UFO {path}: {message}")]
    Load { path: String, message: String },

    #[error("Failed to write UFO {path}: {message}")]
    Write { path: String, message: String },

    #[error("Glyph already exists: {0}")]
    DuplicateGlyph(String),

    #[error("Glyph not found: {0}")]
    UnknownGlyph(String),

    #[error("Invalid name for UFO: {0:?}")]
    InvalidName(String),

    #[error("Font has been closed")]
    Closed,
}

impl From<HostError> for fontext_core::ExtError {
    fn from(err: HostError) -> Self {
        fontext_core::ExtError::Host(err.to_string())
    }
}
