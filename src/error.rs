//! Error types for the card generation pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a result card
#[derive(Error, Debug)]
pub enum Error {
    /// The rendering engine could not be acquired ("generation unavailable")
    #[error("Card generation unavailable: {0}")]
    Unavailable(String),

    /// The card document failed to load or never reached content-stable
    #[error("Failed to load card document: {0}")]
    LoadError(String),

    /// Capturing the rendered card failed ("generation failed")
    #[error("Card rendering failed: {0}")]
    RenderError(String),

    /// The title enrichment collaborator failed; absorbed by the adapter,
    /// never surfaced across the generation boundary
    #[error("Title enrichment failed: {0}")]
    EnrichmentError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the engine never started (callers may retry
    /// later without having consumed rendering capacity).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}

#[cfg(feature = "chrome")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::RenderError(err.to_string())
    }
}
