//! Position evaluation
//!
//! Connected-component analysis of the board: maximal same-color clusters
//! under hex adjacency, per-marble directional strength, and the scalar
//! heuristic the search uses at its leaves. All scores are from the max
//! player's perspective; positive is good for max.

use crate::grid::{self, Axis, Cell};
use crate::node::{Role, SearchNode};
use crate::rules::{Color, GameDynamics};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;

/// Terminal win value
pub const WIN_VALUE: f32 = 1000.0;

// ============================================================================
// STRENGTH
// ============================================================================

/// Same-color reinforcement counts for one marble.
///
/// `total` deliberately double-counts marbles backed along several axes; a
/// marble supported on two axes is harder to dislodge than the sum of parts
/// suggests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strength {
    pub total: u32,
    pub horizontal: u32,
    pub east_diagonal: u32,
    pub west_diagonal: u32,
}

impl Strength {
    /// A marble with no recorded support yet
    fn seed() -> Self {
        Self {
            total: 1,
            horizontal: 1,
            east_diagonal: 1,
            west_diagonal: 1,
        }
    }

    /// Baseline for a marble first seen as the far end of an edge
    fn seed_as_neighbor(axis: Axis) -> Self {
        let mut s = Self {
            total: 2,
            ..Self::seed()
        };
        *s.axis_mut(axis) = 2;
        s
    }

    pub fn along(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::EastDiagonal => self.east_diagonal,
            Axis::WestDiagonal => self.west_diagonal,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut u32 {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::EastDiagonal => &mut self.east_diagonal,
            Axis::WestDiagonal => &mut self.west_diagonal,
        }
    }

    fn credit(&mut self, axis: Axis) {
        self.total += 1;
        *self.axis_mut(axis) += 1;
    }
}

/// A maximal connected set of same-colored marbles
#[derive(Clone, Debug)]
pub struct Cluster {
    pub color: Color,
    pub cells: Vec<Cell>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ============================================================================
// CLUSTER DISCOVERY
// ============================================================================

/// Clusters and per-marble strengths for both colors of one position
#[derive(Clone, Debug, Default)]
pub struct ClusterAnalysis {
    clusters: [Vec<Cluster>; 2],
    strength: [FxHashMap<Cell, Strength>; 2],
}

impl ClusterAnalysis {
    /// Analyze an occupancy map
    pub fn of(board: &FxHashMap<Cell, Color>) -> Self {
        let mut analysis = ClusterAnalysis::default();
        let mut visited = FxHashSet::default();

        let mut cells: Vec<Cell> = board.keys().copied().collect();
        cells.sort();

        for cell in cells {
            if visited.contains(&cell) {
                continue;
            }
            let (cluster, strength) = find_cluster(board, &mut visited, cell);
            let idx = cluster.color.index();
            analysis.strength[idx].extend(strength);
            analysis.clusters[idx].push(cluster);
        }
        analysis
    }

    pub fn clusters(&self, color: Color) -> &[Cluster] {
        &self.clusters[color.index()]
    }

    /// Combined strength map over every cluster of `color`
    pub fn strength(&self, color: Color) -> &FxHashMap<Cell, Strength> {
        &self.strength[color.index()]
    }

    pub fn marble_count(&self, color: Color) -> usize {
        self.clusters[color.index()].iter().map(Cluster::len).sum()
    }

    pub fn total_strength(&self, color: Color) -> u32 {
        self.strength[color.index()].values().map(|s| s.total).sum()
    }
}

/// Flood-fill one cluster from `start`.
///
/// Iterative with an explicit stack so deep clusters cannot overflow the
/// call stack. While filling, every discovered same-color edge credits both
/// endpoints on the edge's axis; a deferred pass then credits the cell two
/// steps away along every axis direction recorded at each member, so strength
/// carries one step past the immediate neighbor.
fn find_cluster(
    board: &FxHashMap<Cell, Color>,
    visited: &mut FxHashSet<Cell>,
    start: Cell,
) -> (Cluster, FxHashMap<Cell, Strength>) {
    let color = board[&start];
    let mut strength = FxHashMap::default();
    strength.insert(start, Strength::seed());

    // Directions along which each member found a same-color neighbor
    let mut touched_axes: FxHashMap<Cell, Vec<crate::grid::Direction>> = FxHashMap::default();
    let mut members = FxHashSet::default();
    let mut cells = Vec::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if !members.insert(current) {
            continue;
        }
        visited.insert(current);
        cells.push(current);

        for &dir in grid::directions_at(current) {
            let neighbor = current.step(dir);
            if visited.contains(&neighbor) || board.get(&neighbor) != Some(&color) {
                continue;
            }
            stack.push(neighbor);

            let axis = dir.axis();
            touched_axes.entry(current).or_default().push(dir);
            if let Some(s) = strength.get_mut(&current) {
                s.credit(axis);
            }
            match strength.entry(neighbor) {
                Entry::Occupied(mut e) => e.get_mut().credit(axis),
                Entry::Vacant(v) => {
                    v.insert(Strength::seed_as_neighbor(axis));
                }
            }
        }
    }

    // Deferred pass: one extra step along every touched axis direction
    for (cell, dirs) in &touched_axes {
        for &dir in dirs {
            let two_away = cell.step_by(dir, 2);
            if let Some(s) = strength.get_mut(&two_away) {
                s.credit(dir.axis());
            }
        }
    }

    cells.sort();
    (Cluster { color, cells }, strength)
}

// ============================================================================
// COHESION
// ============================================================================

/// Mean hex Manhattan distance over all ordered marble pairs.
///
/// Fewer than two marbles give no pairs; the defined neutral value is 0.
pub fn mean_pairwise_distance(cells: &[Cell]) -> f32 {
    let n = cells.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for &a in cells {
        for &b in cells {
            total += grid::hex_distance(a, b);
        }
    }
    total / (n * (n - 1)) as f32
}

/// Cohesion penalty: `1 / (1 + mean pairwise distance)`.
///
/// Subtracted from the heuristic, so tightly packed marbles cost more; the
/// term discourages over-concentration.
pub fn cohesion(cells: &[Cell]) -> f32 {
    if cells.len() < 2 {
        return 0.0;
    }
    1.0 / (1.0 + mean_pairwise_distance(cells))
}

// ============================================================================
// HEURISTIC
// ============================================================================

/// Scalar desirability of a position for the max player
pub fn evaluate<S: GameDynamics>(node: &SearchNode<S>) -> f32 {
    let max_pieces = node.pieces(Role::Max);
    let score_diff = node.max_score() as f32 - node.min_score() as f32;
    -5.0 * node.max_center_distance() + node.min_center_distance() + 12.0 * score_diff
        - cohesion(&max_pieces)
}
