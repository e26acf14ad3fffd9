//! Abalone decision engine
//!
//! Alpha-beta search over an Abalone-style marble game on a 17x9 hex grid:
//! - Grid geometry (cells, directions, per-cell legal direction tables)
//! - Rules-engine seam (the `GameDynamics` trait)
//! - Search-tree adapter with max/min perspective and cached scores
//! - Cluster/strength position evaluation and a learned-feature path
//! - Zobrist fingerprinting with an in-search transposition table
//! - Mirrored alpha-beta with median move filtering and quiescence

pub mod error;
pub mod eval;
pub mod features;
pub mod grid;
pub mod node;
pub mod player;
pub mod rules;
pub mod search;
pub mod zobrist;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports for convenient access
pub use error::EngineError;
pub use eval::{evaluate, Cluster, ClusterAnalysis, Strength, WIN_VALUE};
pub use features::{FeatureVector, Weights, FEATURE_COUNT};
pub use grid::{Axis, Cell, Direction, CENTER, COLS, ROWS};
pub use node::{Outcome, Role, SearchNode};
pub use player::{AbalonePlayer, Decision};
pub use rules::{Color, GameDynamics};
pub use search::{AlphaBeta, SearchConfig, SearchOutcome, SearchStats};
pub use zobrist::{TranspositionTable, ZobristTable};
