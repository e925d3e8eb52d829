//! Error types for the card engine

use thiserror::Error;

/// Result type alias for card engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, capturing, or exporting a card
#[derive(Error, Debug)]
pub enum Error {
    /// The rasterizer backend failed to produce a surface
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The capture pipeline failed around the rasterization step
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// A second export was requested while one is still in flight
    #[error("An export is already in flight")]
    ExportInFlight,

    /// No export format is selected and no default is available
    #[error("No export format selected")]
    NoFormatSelected,

    /// Encoding a raster surface to an output format failed
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// A config bundle could not be parsed or applied
    #[error("Config import failed: {0}")]
    ImportError(String),

    /// The imported bundle's major version differs from ours
    #[error("Config version {found} is not compatible with {current}")]
    VersionMismatch { found: String, current: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The content cache could not be read or written
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Network error while fetching remote config
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Other(err.to_string())
    }
}
