//! Error types for terrain loading, configuration and export.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a terrain build.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// A height-map image could not be opened or decoded.
    #[error("failed to decode height map {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A height-map image decoded but has the wrong size.
    #[error("height map {path} is {width}x{height}, expected {expected}x{expected}")]
    LayerSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: usize,
    },

    /// Requested voxel resolution is not one of the supported detail levels.
    #[error("unsupported detail size {0}, expected 128, 256 or 512")]
    UnknownDetailSize(usize),

    #[error("unknown detail level '{0}', expected low, medium or high")]
    UnknownDetailLevel(String),

    /// Configuration file could not be parsed.
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing an export failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
