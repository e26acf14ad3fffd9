//! The rules-engine seam
//!
//! Move legality, move application and win bookkeeping belong to an external
//! rules engine. The search core only needs the capability set below: it
//! never inspects game-specific move encodings and never mutates a state in
//! place.

use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marble color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "B"),
            Color::White => write!(f, "W"),
        }
    }
}

/// What the engine consumes from the external rules engine.
///
/// States are immutable snapshots: `apply` returns a fresh state and leaves
/// the receiver untouched, so search-tree nodes never alias.
pub trait GameDynamics: Clone {
    /// Move encoding of the rules engine. Opaque to the search core.
    type Move: Clone + PartialEq + fmt::Debug;

    /// Legal moves from this state, in no guaranteed order
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Apply a legal move, producing the successor state
    fn apply(&self, mv: &Self::Move) -> Self;

    /// Whether the game is over
    fn is_done(&self) -> bool;

    /// Marbles of `color` pushed off the board so far.
    ///
    /// This is the opponent's point total against `color`.
    fn marbles_lost(&self, color: Color) -> u32;

    /// Occupied board cells with their owning color
    fn occupied_cells(&self) -> Vec<(Cell, Color)>;
}
