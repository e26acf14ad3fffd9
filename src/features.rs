//! Feature extraction for learned evaluation
//!
//! A fixed-order 32-entry vector describing a position from the max player's
//! perspective, plus a weight vector that scores it by dot product. Sign
//! conventions are baked into the vector itself (min-side quantities enter
//! negated where they hurt max), so weights stay free of orientation logic.

use crate::error::EngineError;
use crate::eval::ClusterAnalysis;
use crate::grid::{self, Cell, COLS, ROWS};
use crate::node::SearchNode;
use crate::rules::{Color, GameDynamics};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Length of the feature vector
pub const FEATURE_COUNT: usize = 32;

// ============================================================================
// FACE-OFF
// ============================================================================

/// Signed strength differentials along each axis where enemy marbles touch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisTotals {
    pub total: i64,
    pub horizontal: i64,
    pub east_diagonal: i64,
    pub west_diagonal: i64,
}

/// For every max marble adjacent to a min marble, compare axial strengths
/// along the contact axis and accumulate ally minus enemy.
pub fn face_off(analysis: &ClusterAnalysis, max_color: Color) -> AxisTotals {
    let ours = analysis.strength(max_color);
    let theirs = analysis.strength(max_color.opponent());
    let mut totals = AxisTotals::default();
    for (&cell, ally) in ours {
        for &dir in grid::directions_at(cell) {
            let neighbor = cell.step(dir);
            if let Some(enemy) = theirs.get(&neighbor) {
                let axis = dir.axis();
                let delta = ally.along(axis) as i64 - enemy.along(axis) as i64;
                totals.total += delta;
                match axis {
                    grid::Axis::Horizontal => totals.horizontal += delta,
                    grid::Axis::EastDiagonal => totals.east_diagonal += delta,
                    grid::Axis::WestDiagonal => totals.west_diagonal += delta,
                }
            }
        }
    }
    totals
}

// ============================================================================
// PER-SIDE AGGREGATES
// ============================================================================

/// Sum over clusters of (cluster size / total marbles) squared. One compact
/// cluster scores 1, fully scattered marbles approach 1/n.
fn count_cohesion(analysis: &ClusterAnalysis, color: Color) -> f32 {
    let total = analysis.marble_count(color) as f32;
    if total == 0.0 {
        return 0.0;
    }
    analysis
        .clusters(color)
        .iter()
        .map(|c| {
            let share = c.len() as f32 / total;
            share * share
        })
        .sum()
}

/// Same concentration measure over per-marble strengths
fn strength_cohesion(analysis: &ClusterAnalysis, color: Color) -> f32 {
    let total = analysis.total_strength(color) as f32;
    if total == 0.0 {
        return 0.0;
    }
    analysis
        .strength(color)
        .values()
        .map(|s| {
            let share = s.total as f32 / total;
            share * share
        })
        .sum()
}

/// Sum over `color`'s marbles of the rectangle-edge distance
/// `min(row, 16 - row, col, 8 - col)`
fn total_edge_distance(strength: &FxHashMap<Cell, crate::eval::Strength>) -> f32 {
    strength
        .keys()
        .map(|cell| {
            let r = cell.row as f32;
            let c = cell.col as f32;
            r.min((ROWS - 1) as f32 - r).min(c).min((COLS - 1) as f32 - c)
        })
        .sum()
}

/// (total, mean, 1/(1+mean)) of hex distance over unordered marble pairs.
///
/// Unlike the evaluator's cohesion this counts each pair once; no pairs give
/// (0, 0, 1).
fn pairwise_distances(strength: &FxHashMap<Cell, crate::eval::Strength>) -> (f32, f32, f32) {
    let mut cells: Vec<Cell> = strength.keys().copied().collect();
    cells.sort();
    let n = cells.len();
    let pairs = (n * n.saturating_sub(1) / 2) as f32;
    let mut total = 0.0;
    for (i, &a) in cells.iter().enumerate() {
        for &b in &cells[i + 1..] {
            total += grid::hex_distance(a, b);
        }
    }
    let mean = if pairs > 0.0 { total / pairs } else { 0.0 };
    (total, mean, 1.0 / (1.0 + mean))
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// The position description fed to a learned scorer.
///
/// Field order is the vector order; [`FeatureVector::to_array`] is the single
/// place that fixes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub max_cluster_count: f32,
    pub min_cluster_count: f32,
    pub max_marbles: f32,
    pub min_marbles: f32,
    pub max_mean_cluster_size: f32,
    pub min_mean_cluster_size: f32,
    pub max_count_cohesion: f32,
    pub min_count_cohesion: f32,
    pub max_total_strength: f32,
    pub min_total_strength: f32,
    pub max_strength_cohesion: f32,
    pub min_strength_cohesion: f32,
    pub face_off_total: f32,
    pub face_off_horizontal: f32,
    pub face_off_east_diagonal: f32,
    pub face_off_west_diagonal: f32,
    pub max_total_edge_distance: f32,
    pub min_total_edge_distance: f32,
    pub max_total_pair_distance: f32,
    pub max_mean_pair_distance: f32,
    pub max_inverse_mean_pair_distance: f32,
    pub min_total_pair_distance: f32,
    pub min_mean_pair_distance: f32,
    pub min_inverse_mean_pair_distance: f32,
    pub max_center_distance: f32,
    pub min_center_distance: f32,
    pub min_score_is_six: f32,
    pub max_score_is_six: f32,
    pub max_has_higher_score: f32,
    pub min_has_higher_score: f32,
    pub max_is_closer_to_center: f32,
    pub min_is_closer_to_center: f32,
}

impl FeatureVector {
    /// Extract all features of one position
    pub fn extract<S: GameDynamics>(node: &SearchNode<S>) -> Self {
        let analysis = ClusterAnalysis::of(node.board());
        let max_color = node.max_color();
        let min_color = node.min_color();

        let max_clusters = analysis.clusters(max_color).len() as f32;
        let min_clusters = analysis.clusters(min_color).len() as f32;
        let max_marbles = analysis.marble_count(max_color) as f32;
        let min_marbles = analysis.marble_count(min_color) as f32;
        let max_mean = if max_clusters > 0.0 {
            max_marbles / max_clusters
        } else {
            0.0
        };
        let min_mean = if min_clusters > 0.0 {
            min_marbles / min_clusters
        } else {
            0.0
        };

        let facing = face_off(&analysis, max_color);
        let (max_total_pd, max_mean_pd, max_inv_pd) =
            pairwise_distances(analysis.strength(max_color));
        let (min_total_pd, min_mean_pd, min_inv_pd) =
            pairwise_distances(analysis.strength(min_color));

        let max_dist = node.max_center_distance();
        let min_dist = node.min_center_distance();
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        Self {
            max_cluster_count: max_clusters,
            min_cluster_count: min_clusters,
            max_marbles,
            min_marbles: -min_marbles,
            max_mean_cluster_size: max_mean,
            min_mean_cluster_size: -min_mean,
            max_count_cohesion: count_cohesion(&analysis, max_color),
            min_count_cohesion: -count_cohesion(&analysis, min_color),
            max_total_strength: analysis.total_strength(max_color) as f32,
            min_total_strength: -(analysis.total_strength(min_color) as f32),
            max_strength_cohesion: strength_cohesion(&analysis, max_color),
            min_strength_cohesion: -strength_cohesion(&analysis, min_color),
            face_off_total: facing.total as f32,
            face_off_horizontal: facing.horizontal as f32,
            face_off_east_diagonal: facing.east_diagonal as f32,
            face_off_west_diagonal: facing.west_diagonal as f32,
            max_total_edge_distance: total_edge_distance(analysis.strength(max_color)),
            min_total_edge_distance: -total_edge_distance(analysis.strength(min_color)),
            max_total_pair_distance: -max_total_pd,
            max_mean_pair_distance: -max_mean_pd,
            max_inverse_mean_pair_distance: max_inv_pd,
            min_total_pair_distance: min_total_pd,
            min_mean_pair_distance: min_mean_pd,
            min_inverse_mean_pair_distance: -min_inv_pd,
            max_center_distance: -max_dist,
            min_center_distance: min_dist,
            min_score_is_six: flag(node.min_score() == 6),
            max_score_is_six: flag(node.max_score() == 6),
            max_has_higher_score: flag(node.max_score() > node.min_score()),
            min_has_higher_score: flag(node.min_score() > node.max_score()),
            max_is_closer_to_center: flag(min_dist > max_dist),
            min_is_closer_to_center: flag(max_dist > min_dist),
        }
    }

    /// The fixed vector order
    pub fn to_array(self) -> [f32; FEATURE_COUNT] {
        [
            self.max_cluster_count,
            self.min_cluster_count,
            self.max_marbles,
            self.min_marbles,
            self.max_mean_cluster_size,
            self.min_mean_cluster_size,
            self.max_count_cohesion,
            self.min_count_cohesion,
            self.max_total_strength,
            self.min_total_strength,
            self.max_strength_cohesion,
            self.min_strength_cohesion,
            self.face_off_total,
            self.face_off_horizontal,
            self.face_off_east_diagonal,
            self.face_off_west_diagonal,
            self.max_total_edge_distance,
            self.min_total_edge_distance,
            self.max_total_pair_distance,
            self.max_mean_pair_distance,
            self.max_inverse_mean_pair_distance,
            self.min_total_pair_distance,
            self.min_mean_pair_distance,
            self.min_inverse_mean_pair_distance,
            self.max_center_distance,
            self.min_center_distance,
            self.min_score_is_six,
            self.max_score_is_six,
            self.max_has_higher_score,
            self.min_has_higher_score,
            self.max_is_closer_to_center,
            self.min_is_closer_to_center,
        ]
    }
}

// ============================================================================
// LEARNED WEIGHTS
// ============================================================================

/// A learned weight vector, one coefficient per feature
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights(Vec<f32>);

impl Weights {
    /// Parse a JSON array of 32 numbers
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let raw: Vec<f32> = serde_json::from_str(json)?;
        if raw.len() != FEATURE_COUNT {
            return Err(EngineError::WeightArity {
                expected: FEATURE_COUNT,
                got: raw.len(),
            });
        }
        Ok(Self(raw))
    }

    pub fn uniform(value: f32) -> Self {
        Self(vec![value; FEATURE_COUNT])
    }

    /// Dot product of weights and features
    pub fn score(&self, features: &FeatureVector) -> f32 {
        features
            .to_array()
            .iter()
            .zip(&self.0)
            .map(|(f, w)| f * w)
            .sum()
    }
}
