//! Zobrist fingerprinting and the in-search transposition table
//!
//! One independent random token per `(row, col, occupant)` triple, drawn once
//! at engine construction and immutable afterwards. A position's fingerprint
//! XORs the token of every cell's actual occupant over the whole 17x9
//! rectangle; empty cells contribute their own tokens, so skipping them
//! corrupts the fingerprint. XOR is self-inverse, which is why erasing and
//! applying a contribution are the same operation (`toggle`).

use crate::grid::{self, Cell, COLS};
use crate::node::Role;
use crate::rules::Color;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Number of occupant kinds per cell
pub const OCCUPANT_KINDS: usize = 3;

/// What a cell holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Empty,
    Black,
    White,
}

impl Occupant {
    pub const fn index(self) -> usize {
        match self {
            Occupant::Empty => 0,
            Occupant::Black => 1,
            Occupant::White => 2,
        }
    }

    pub fn of(color: Option<Color>) -> Self {
        match color {
            None => Occupant::Empty,
            Some(Color::Black) => Occupant::Black,
            Some(Color::White) => Occupant::White,
        }
    }
}

// ============================================================================
// ZOBRIST TABLE
// ============================================================================

/// Random token table, read-only after construction.
///
/// Safe to share across concurrent searches; only statistics are mutable and
/// those live elsewhere.
#[derive(Clone, Debug)]
pub struct ZobristTable {
    tokens: Vec<u64>,
}

impl ZobristTable {
    /// Table with process-random tokens
    pub fn new() -> Self {
        Self::from_seed(rand::random())
    }

    /// Deterministic table for reproducible runs
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tokens = (0..grid::ROWS as usize * COLS as usize * OCCUPANT_KINDS)
            .map(|_| rng.gen())
            .collect();
        Self { tokens }
    }

    fn token(&self, cell: Cell, occupant: Occupant) -> u64 {
        let idx =
            (cell.row as usize * COLS as usize + cell.col as usize) * OCCUPANT_KINDS
                + occupant.index();
        self.tokens[idx]
    }

    /// Fingerprint of a full occupancy map.
    ///
    /// Iterates every cell of the rectangle; empty cells are contributions,
    /// not omissions.
    pub fn full_hash(&self, board: &FxHashMap<Cell, Color>) -> u64 {
        grid::all_cells().fold(0, |h, cell| {
            h ^ self.token(cell, Occupant::of(board.get(&cell).copied()))
        })
    }

    /// Fold one cell contribution in or out. Self-inverse.
    pub fn toggle(&self, hash: u64, cell: Cell, occupant: Occupant) -> u64 {
        hash ^ self.token(cell, occupant)
    }

    /// Incrementally carry `hash` from the `before` occupancy to `after`.
    ///
    /// Walks the symmetric difference of the two assignments: for every cell
    /// that was vacated, newly occupied or recolored, the old contribution is
    /// toggled out and the new one toggled in.
    pub fn update(
        &self,
        hash: u64,
        before: &FxHashMap<Cell, Color>,
        after: &FxHashMap<Cell, Color>,
    ) -> u64 {
        let mut h = hash;
        for (&cell, &was) in before {
            let now = after.get(&cell).copied();
            if now != Some(was) {
                h = self.toggle(h, cell, Occupant::of(Some(was)));
                h = self.toggle(h, cell, Occupant::of(now));
            }
        }
        for (&cell, &now) in after {
            if !before.contains_key(&cell) {
                h = self.toggle(h, cell, Occupant::Empty);
                h = self.toggle(h, cell, Occupant::of(Some(now)));
            }
        }
        h
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TRANSPOSITION TABLE
// ============================================================================

/// How a stored value relates to the true minimax value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    Exact,
    /// Search failed high; value is a lower bound
    Lower,
    /// Search failed low; value is an upper bound
    Upper,
}

/// One cached search result
#[derive(Clone, Debug)]
pub struct TtEntry<M> {
    pub role: Role,
    pub depth: u32,
    pub value: f32,
    pub flag: Bound,
    pub best_move: Option<M>,
}

/// Lookup accounting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtStats {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
}

/// Fingerprint-keyed value cache for a single search call.
///
/// The map key is the full 64-bit fingerprint and entries also record the
/// role they were computed for; distinct positions hashing to the same
/// fingerprint can still alias, which the engine tolerates (the cache feeds
/// heuristic search, not proofs). Nothing persists across searches.
#[derive(Clone, Debug)]
pub struct TranspositionTable<M> {
    map: FxHashMap<u64, TtEntry<M>>,
    stats: TtStats,
}

impl<M: Clone> TranspositionTable<M> {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            stats: TtStats::default(),
        }
    }

    /// Usable entry for `key` at `role`, searched at least `depth` deep
    pub fn probe(&mut self, key: u64, role: Role, depth: u32) -> Option<&TtEntry<M>> {
        self.stats.lookups += 1;
        let usable = matches!(
            self.map.get(&key),
            Some(e) if e.role == role && e.depth >= depth
        );
        if usable {
            self.stats.hits += 1;
            self.map.get(&key)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Depth-preferred store: shallower results never evict deeper ones
    pub fn store(&mut self, key: u64, entry: TtEntry<M>) {
        self.stats.stores += 1;
        let replace = match self.map.get(&key) {
            Some(old) => entry.depth >= old.depth,
            None => true,
        };
        if replace {
            self.map.insert(key, entry);
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> TtStats {
        self.stats
    }
}

impl<M: Clone> Default for TranspositionTable<M> {
    fn default() -> Self {
        Self::new()
    }
}
