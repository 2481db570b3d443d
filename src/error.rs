//! Error types for the presentation engine.
//!
//! Nothing here is fatal to the process: validation errors stay at the
//! controller boundary and audio errors only degrade the presentation to a
//! silent one.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rejections at the `Idle -> Starting` guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload at least one image.")]
    NoImages,

    #[error("Please upload at least {min} images ({got} selected).")]
    NotEnoughImages { min: usize, got: usize },

    #[error("You can upload up to {max} images. Your current selection was kept.")]
    TooManyImages { max: usize },

    #[error("Unknown track: {track}")]
    UnknownTrack { track: String },

    #[error("No track is available to play")]
    NoTrackAvailable,
}

/// Failures that keep the audio session from reaching `Playing`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioLoadError {
    #[error("Could not load music file {track} (tried {} locations)", tried.len())]
    NoCandidateResolved { track: String, tried: Vec<PathBuf> },

    #[error("Could not decode music file {track}: {reason}")]
    Decode { track: String, reason: String },

    #[error("Music fetch for {track} was abandoned")]
    Aborted { track: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    AudioLoad(#[from] AudioLoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
