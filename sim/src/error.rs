//! Error types for the simulation boundary.
//!
//! Systems inside a frame never fail. Everything that can be wrong is
//! rejected here, before the pipeline runs, so a failed call leaves the
//! world exactly as it was.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown monster type index {index} (configured types: {configured})")]
    UnknownMonsterType { index: u32, configured: u32 },

    #[error("invalid monster level {level} (expected 1..={max})")]
    InvalidLevel { level: u32, max: u32 },

    #[error("position ({x}, {y}) is not finite")]
    NonFinitePosition { x: f32, y: f32 },

    #[error("timestamp {0} is not finite")]
    NonFiniteTimestamp(f64),

    #[error("timestamp went backwards: {current} ms after {previous} ms")]
    NonMonotonicTimestamp { previous: f64, current: f64 },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
