//! Error types for race setup and configuration
//!
//! Geometric queries never fail: a miss is an ordinary `None`. Only building a
//! race can go wrong, and those failures are fatal for the race being set up.

use thiserror::Error;

/// Race setup failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// The smaller terrain dimension must be a power of two and divide the larger
    #[error(
        "invalid terrain dimensions {width}x{height}: smaller side must be a power of two dividing the larger"
    )]
    InvalidDimensions { width: usize, height: usize },

    /// Track row (and the row after it) must lie inside the heightfield
    #[error("track row {row} outside heightfield with {height} rows")]
    TrackRowOutOfRange { row: usize, height: usize },

    /// The heightfield has fewer columns than the track has vertices
    #[error("track needs {needed} terrain columns, heightfield has {available}")]
    TrackTooWide { needed: usize, available: usize },

    /// A race needs at least one craft
    #[error("race needs at least one craft")]
    NoCraft,
}

/// Race configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
