//! Configuration errors
//!
//! The simulation has no I/O of its own; the only failures are degenerate
//! parameters, rejected at construction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("segment spacing must be positive, got {0}")]
    NonPositiveSpacing(f32),

    #[error("{what} radius must be positive, got {value}")]
    NonPositiveRadius { what: &'static str, value: f32 },

    #[error("invalid speed range: min {min}, base {base}, max {max}")]
    InvalidSpeedRange { min: f32, base: f32, max: f32 },

    #[error("turn rate must be positive, got {0}")]
    NonPositiveTurnRate(f32),

    #[error("world size must be positive, got {width}x{height}")]
    InvalidWorldSize { width: f32, height: f32 },

    #[error("viewport size must be positive, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("camera smoothing must be in (0, 1], got {0}")]
    InvalidSmoothing(f32),

    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),

    #[error("tile cache must hold at least one tile")]
    ZeroCacheSize,

    #[error("player needs at least one starting segment")]
    NoStartingSegments,

    #[error("starting lives must be at least 1")]
    NoLives,

    #[error("max frame delta must be positive, got {0}")]
    InvalidFrameDelta(f32),

    #[error("spawn distance band is invalid: min {min}, max {max}")]
    InvalidSpawnBand { min: f32, max: f32 },

    #[error("friction must be in (0, 1], got {0}")]
    InvalidFriction(f32),

    #[error("difficulty table is empty")]
    EmptyDifficultyTable,

    #[error("difficulty level {level} must start at time 0, starts at {min_time}")]
    DifficultyNotAnchored { level: u32, min_time: f32 },

    #[error("difficulty level {level} starts at {min_time} but the previous level ends at {previous_end:?}")]
    DifficultyGap {
        level: u32,
        min_time: f32,
        previous_end: Option<f32>,
    },

    #[error("difficulty level {level} has an empty window [{min_time}, {max_time})")]
    EmptyDifficultyWindow {
        level: u32,
        min_time: f32,
        max_time: f32,
    },

    #[error("difficulty level {level} has an invalid segment range {min}..={max}")]
    InvalidSegmentRange { level: u32, min: usize, max: usize },

    #[error("difficulty level {level} has a non-positive spawn interval {interval}")]
    InvalidSpawnInterval { level: u32, interval: f32 },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
