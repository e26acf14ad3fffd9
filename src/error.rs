//! Engine error type
//!
//! Game-domain edge cases (empty boards, exhausted depth, drawn terminals)
//! are handled as defined values, never as errors; this enum covers only the
//! configuration and weight-loading boundaries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("search depth must be at least 1 (got {0})")]
    InvalidDepth(u32),

    #[error("failed to parse evaluation weights: {0}")]
    WeightParse(#[from] serde_json::Error),

    #[error("evaluation weights need {expected} entries (got {got})")]
    WeightArity { expected: usize, got: usize },
}
