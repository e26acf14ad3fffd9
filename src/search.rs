//! Alpha-beta search engine
//!
//! Depth-limited minimax with mirrored max/min procedures, heuristic move
//! ordering with median filtering, a bounded quiescence extension, and an
//! optional per-search transposition table keyed by Zobrist fingerprint.

use crate::error::EngineError;
use crate::eval::{self, WIN_VALUE};
use crate::node::{Outcome, Role, SearchNode};
use crate::rules::GameDynamics;
use crate::zobrist::{Bound, TranspositionTable, TtEntry, ZobristTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Search engine configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Nominal search depth in plies
    pub depth: u32,
    /// Extra plies the quiescence extension may add past the nominal depth
    pub quiescence_margin: u32,
    /// Keep only moves at or beyond the sibling median heuristic value
    pub median_filter: bool,
    /// Alpha-beta cutoffs (off reproduces plain minimax over the same tree)
    pub alpha_beta_pruning: bool,
    /// Consult a per-search transposition table before recursing
    pub use_transposition: bool,
    /// Seed for the Zobrist token table (None = process random)
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            quiescence_margin: 1,
            median_filter: true,
            alpha_beta_pruning: true,
            use_transposition: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Config searching to the given depth
    pub fn at_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    /// Set a deterministic Zobrist seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.depth == 0 {
            return Err(EngineError::InvalidDepth(self.depth));
        }
        Ok(())
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Counters for one search call. Observational only; never consulted by the
/// decision logic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub pruned_max: u64,
    pub pruned_min: u64,
    pub root_branches: usize,
    pub tt_hits: u64,
    pub tt_misses: u64,
}

/// Result of one search call
#[derive(Clone, Debug)]
pub struct SearchOutcome<M> {
    pub value: f32,
    pub best_move: Option<M>,
    pub stats: SearchStats,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Alpha-beta engine.
///
/// The Zobrist table is built once here and immutable afterwards; it can be
/// shared read-only across parallel workers, while statistics are owned per
/// engine.
pub struct AlphaBeta {
    pub config: SearchConfig,
    zobrist: Arc<ZobristTable>,
    stats: SearchStats,
}

impl AlphaBeta {
    pub fn new(config: SearchConfig) -> Self {
        let zobrist = match config.seed {
            Some(seed) => ZobristTable::from_seed(seed),
            None => ZobristTable::new(),
        };
        Self {
            config,
            zobrist: Arc::new(zobrist),
            stats: SearchStats::default(),
        }
    }

    /// Statistics of the most recent search
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn zobrist(&self) -> &ZobristTable {
        &self.zobrist
    }

    /// Best value and move for the max player at the root.
    ///
    /// Statistics are reset on entry, so every call reports its own figures.
    pub fn search<S: GameDynamics>(&mut self, root: &SearchNode<S>) -> SearchOutcome<S::Move> {
        self.stats = SearchStats::default();
        self.stats.root_branches = root.actions().len();

        let mut table = self
            .config
            .use_transposition
            .then(TranspositionTable::new);
        let root_hash = self.zobrist.full_hash(root.board());
        let (value, best_move) = self.max_value(
            root,
            self.config.depth,
            f32::NEG_INFINITY,
            f32::INFINITY,
            0,
            root_hash,
            &mut table,
        );

        if let Some(t) = &table {
            self.stats.tt_hits = t.stats().hits;
            self.stats.tt_misses = t.stats().misses;
        }
        debug!(
            nodes_visited = self.stats.nodes_visited,
            pruned_max = self.stats.pruned_max,
            pruned_min = self.stats.pruned_min,
            root_branches = self.stats.root_branches,
            tt_hits = self.stats.tt_hits,
            tt_misses = self.stats.tt_misses,
            "search complete"
        );

        SearchOutcome {
            value,
            best_move,
            stats: self.stats,
        }
    }

    /// Root search with one rayon worker per surviving root move.
    ///
    /// Workers share the immutable Zobrist table and nothing else: each owns
    /// its statistics and, when enabled, its own transposition table.
    #[cfg(feature = "parallel")]
    pub fn search_parallel<S>(&mut self, root: &SearchNode<S>) -> SearchOutcome<S::Move>
    where
        S: GameDynamics + Send + Sync,
        S::Move: Send + Sync,
    {
        use rayon::prelude::*;

        self.stats = SearchStats::default();
        self.stats.root_branches = root.actions().len();

        let ordered = self.ordered_children(root, Role::Max);
        if ordered.is_empty() {
            return SearchOutcome {
                value: eval::evaluate(root),
                best_move: None,
                stats: self.stats,
            };
        }
        let root_hash = self.zobrist.full_hash(root.board());
        let child_depth = self.config.depth.saturating_sub(1);

        let results: Vec<(f32, SearchStats)> = ordered
            .par_iter()
            .map(|(_, child)| {
                let mut worker = AlphaBeta {
                    config: self.config,
                    zobrist: Arc::clone(&self.zobrist),
                    stats: SearchStats::default(),
                };
                let mut table = worker
                    .config
                    .use_transposition
                    .then(TranspositionTable::new);
                let child_hash = worker.zobrist.update(root_hash, root.board(), child.board());
                let (v, _) = worker.min_value(
                    child,
                    child_depth,
                    f32::NEG_INFINITY,
                    f32::INFINITY,
                    1,
                    child_hash,
                    &mut table,
                );
                (v, worker.stats)
            })
            .collect();

        self.stats.nodes_visited = 1;
        let mut value = f32::NEG_INFINITY;
        let mut best_index = 0;
        for (i, (v, worker_stats)) in results.iter().enumerate() {
            self.stats.nodes_visited += worker_stats.nodes_visited;
            self.stats.pruned_max += worker_stats.pruned_max;
            self.stats.pruned_min += worker_stats.pruned_min;
            if *v > value {
                value = *v;
                best_index = i;
            }
        }

        SearchOutcome {
            value,
            best_move: Some(ordered[best_index].0.clone()),
            stats: self.stats,
        }
    }

    // ========================================================================
    // MIRRORED VALUE FUNCTIONS
    // ========================================================================

    fn max_value<S: GameDynamics>(
        &mut self,
        node: &SearchNode<S>,
        depth: u32,
        mut alpha: f32,
        beta: f32,
        ply: u32,
        hash: u64,
        table: &mut Option<TranspositionTable<S::Move>>,
    ) -> (f32, Option<S::Move>) {
        self.stats.nodes_visited += 1;

        if node.is_terminal() {
            return (terminal_value(node), None);
        }
        if depth == 0 {
            return (self.horizon_value(node, Role::Max, alpha, beta, ply, hash, table), None);
        }

        if let Some(t) = table.as_mut() {
            if let Some(entry) = t.probe(hash, Role::Max, depth) {
                let usable = match entry.flag {
                    Bound::Exact => true,
                    Bound::Lower => entry.value >= beta,
                    Bound::Upper => entry.value <= alpha,
                };
                if usable {
                    return (entry.value, entry.best_move.clone());
                }
            }
        }

        let ordered = self.ordered_children(node, Role::Max);
        if ordered.is_empty() {
            // Every candidate was filtered away; exhausted search still
            // yields a defined value
            return (eval::evaluate(node), None);
        }

        let alpha_orig = alpha;
        let mut best = f32::NEG_INFINITY;
        let mut best_move = None;
        for (mv, child) in &ordered {
            let child_hash = self.zobrist.update(hash, node.board(), child.board());
            let (v, _) = self.min_value(child, depth - 1, alpha, beta, ply + 1, child_hash, table);
            if v > best {
                best = v;
                best_move = Some(mv.clone());
                alpha = alpha.max(best);
            }
            if self.config.alpha_beta_pruning && best >= beta {
                self.stats.pruned_max += 1;
                break;
            }
        }

        if let Some(t) = table.as_mut() {
            t.store(
                hash,
                TtEntry {
                    role: Role::Max,
                    depth,
                    value: best,
                    flag: bound_for(best, alpha_orig, beta),
                    best_move: best_move.clone(),
                },
            );
        }
        (best, best_move)
    }

    fn min_value<S: GameDynamics>(
        &mut self,
        node: &SearchNode<S>,
        depth: u32,
        alpha: f32,
        mut beta: f32,
        ply: u32,
        hash: u64,
        table: &mut Option<TranspositionTable<S::Move>>,
    ) -> (f32, Option<S::Move>) {
        self.stats.nodes_visited += 1;

        if node.is_terminal() {
            return (terminal_value(node), None);
        }
        if depth == 0 {
            return (self.horizon_value(node, Role::Min, alpha, beta, ply, hash, table), None);
        }

        if let Some(t) = table.as_mut() {
            if let Some(entry) = t.probe(hash, Role::Min, depth) {
                let usable = match entry.flag {
                    Bound::Exact => true,
                    Bound::Lower => entry.value >= beta,
                    Bound::Upper => entry.value <= alpha,
                };
                if usable {
                    return (entry.value, entry.best_move.clone());
                }
            }
        }

        let ordered = self.ordered_children(node, Role::Min);
        if ordered.is_empty() {
            return (eval::evaluate(node), None);
        }

        let beta_orig = beta;
        let mut best = f32::INFINITY;
        let mut best_move = None;
        for (mv, child) in &ordered {
            let child_hash = self.zobrist.update(hash, node.board(), child.board());
            let (v, _) = self.max_value(child, depth - 1, alpha, beta, ply + 1, child_hash, table);
            if v < best {
                best = v;
                best_move = Some(mv.clone());
                beta = beta.min(best);
            }
            if self.config.alpha_beta_pruning && best <= alpha {
                self.stats.pruned_min += 1;
                break;
            }
        }

        if let Some(t) = table.as_mut() {
            t.store(
                hash,
                TtEntry {
                    role: Role::Min,
                    depth,
                    value: best,
                    flag: bound_for(best, alpha, beta_orig),
                    best_move: best_move.clone(),
                },
            );
        }
        (best, best_move)
    }

    /// Value of a non-terminal node whose nominal depth is exhausted.
    ///
    /// Beyond the quiescence ply cap the static value is final. Otherwise a
    /// noisy (non-quiescent) position extends exactly one ply through the
    /// opposite role before this check runs again.
    fn horizon_value<S: GameDynamics>(
        &mut self,
        node: &SearchNode<S>,
        role: Role,
        alpha: f32,
        beta: f32,
        ply: u32,
        hash: u64,
        table: &mut Option<TranspositionTable<S::Move>>,
    ) -> f32 {
        if ply > self.config.depth + self.config.quiescence_margin {
            return eval::evaluate(node);
        }
        let candidates: Vec<S::Move> = self
            .ordered_children(node, role)
            .into_iter()
            .map(|(mv, _)| mv)
            .collect();
        if node.is_quiescent(&candidates, role) {
            return eval::evaluate(node);
        }
        let (v, _) = match role {
            Role::Max => self.min_value(node, 1, alpha, beta, ply + 1, hash, table),
            Role::Min => self.max_value(node, 1, alpha, beta, ply + 1, hash, table),
        };
        v
    }

    // ========================================================================
    // MOVE ORDERING
    // ========================================================================

    /// Children of `node` for `role`, ordered best-first for that role and,
    /// when the median filter is on, cut to the half at or beyond the sibling
    /// median heuristic value.
    fn ordered_children<S: GameDynamics>(
        &self,
        node: &SearchNode<S>,
        role: Role,
    ) -> Vec<(S::Move, SearchNode<S>)> {
        let mut scored: Vec<(S::Move, SearchNode<S>, f32)> = node
            .children(role)
            .into_iter()
            .map(|(mv, child)| {
                let value = eval::evaluate(&child);
                (mv, child, value)
            })
            .collect();

        // Stable sorts keep earlier moves first among equal values, which is
        // what makes the first-best tie-break reproducible
        match role {
            Role::Max => scored.sort_by(|a, b| b.2.total_cmp(&a.2)),
            Role::Min => scored.sort_by(|a, b| a.2.total_cmp(&b.2)),
        }

        if self.config.median_filter && !scored.is_empty() {
            let m = median(scored.iter().map(|s| s.2).collect());
            match role {
                Role::Max => scored.retain(|s| s.2 >= m),
                Role::Min => scored.retain(|s| s.2 <= m),
            }
        }

        scored.into_iter().map(|(mv, child, _)| (mv, child)).collect()
    }
}

/// Median of the sibling values (mean of the middle two for even counts)
fn median(mut values: Vec<f32>) -> f32 {
    values.sort_by(f32::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

fn terminal_value<S: GameDynamics>(node: &SearchNode<S>) -> f32 {
    match node.outcome() {
        Outcome::Win => WIN_VALUE,
        Outcome::Loss => -WIN_VALUE,
        Outcome::Undetermined => 0.0,
    }
}

fn bound_for(value: f32, alpha_orig: f32, beta_orig: f32) -> Bound {
    if value <= alpha_orig {
        Bound::Upper
    } else if value >= beta_orig {
        Bound::Lower
    } else {
        Bound::Exact
    }
}
