//! Error types for island generation and export

use thiserror::Error;

/// Errors produced while configuring, generating, or exporting an island.
#[derive(Debug, Error)]
pub enum IslandError {
    /// A caller-supplied parameter violates its documented constraint.
    /// Always raised before any per-pixel work starts.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An output surface could not be allocated.
    #[error("Failed to create resource: {0}")]
    ResourceCreation(String),

    /// The image encoder rejected the pixel buffer.
    #[error("Encoding failed: {0}")]
    Encoding(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Config format error: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

impl IslandError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        IslandError::InvalidConfiguration(msg.into())
    }

    /// True for errors caused by bad input rather than the environment.
    pub fn is_configuration(&self) -> bool {
        matches!(self, IslandError::InvalidConfiguration(_) | IslandError::ConfigFormat(_))
    }
}

pub type Result<T> = std::result::Result<T, IslandError>;
