//! Board Adapter: search-tree nodes over an external game state
//!
//! A [`SearchNode`] pins a perspective onto a raw rules-engine state: one
//! player is "max", the only other player is "min". Scores, center distances
//! and the board map are computed once at construction and cached; nodes are
//! never mutated, so the search tree is a plain ownership tree with no shared
//! children.

use crate::grid::{self, Cell};
use crate::rules::{Color, GameDynamics};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Which side a recursion level plays for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Max,
    Min,
}

impl Role {
    pub fn flip(self) -> Role {
        match self {
            Role::Max => Role::Min,
            Role::Min => Role::Max,
        }
    }
}

/// Three-valued terminal verdict from the max player's perspective.
///
/// `Undetermined` is a legitimate outcome (a drawn terminal position), not an
/// error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Undetermined,
}

/// An immutable search-tree position
#[derive(Clone, Debug)]
pub struct SearchNode<S: GameDynamics> {
    state: S,
    max_color: Color,
    min_color: Color,
    /// Marbles the max player has pushed off (min's losses)
    max_score: u32,
    /// Marbles the min player has pushed off (max's losses)
    min_score: u32,
    max_center_distance: f32,
    min_center_distance: f32,
    board: FxHashMap<Cell, Color>,
    /// Move that produced this node, for traceability; `None` at the root
    via: Option<S::Move>,
}

impl<S: GameDynamics> SearchNode<S> {
    /// Wrap a rules-engine state, fixing `max_color` as the maximizing side
    pub fn root(state: S, max_color: Color) -> Self {
        Self::build(state, max_color, None)
    }

    fn build(state: S, max_color: Color, via: Option<S::Move>) -> Self {
        let min_color = max_color.opponent();
        let max_score = state.marbles_lost(min_color);
        let min_score = state.marbles_lost(max_color);

        let mut board = FxHashMap::default();
        let mut max_center_distance = 0.0;
        let mut min_center_distance = 0.0;
        for (cell, color) in state.occupied_cells() {
            let dist = grid::distance_to_center(cell);
            if color == max_color {
                max_center_distance += dist;
            } else {
                min_center_distance += dist;
            }
            board.insert(cell, color);
        }

        Self {
            state,
            max_color,
            min_color,
            max_score,
            min_score,
            max_center_distance,
            min_center_distance,
            board,
            via,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn max_color(&self) -> Color {
        self.max_color
    }

    pub fn min_color(&self) -> Color {
        self.min_color
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    pub fn max_center_distance(&self) -> f32 {
        self.max_center_distance
    }

    pub fn min_center_distance(&self) -> f32 {
        self.min_center_distance
    }

    /// Cached occupancy map of the underlying state
    pub fn board(&self) -> &FxHashMap<Cell, Color> {
        &self.board
    }

    /// Move that led here, if this is not the root
    pub fn via(&self) -> Option<&S::Move> {
        self.via.as_ref()
    }

    /// Cells owned by the given role's player
    pub fn pieces(&self, role: Role) -> Vec<Cell> {
        let color = match role {
            Role::Max => self.max_color,
            Role::Min => self.min_color,
        };
        let mut cells: Vec<Cell> = self
            .board
            .iter()
            .filter(|&(_, &c)| c == color)
            .map(|(&cell, _)| cell)
            .collect();
        cells.sort();
        cells
    }

    // ========================================================================
    // CONTRACT
    // ========================================================================

    pub fn is_terminal(&self) -> bool {
        self.state.is_done()
    }

    /// Terminal verdict: score first, then aggregate center distance where
    /// sitting farther from the center loses the tiebreak, else undetermined.
    pub fn outcome(&self) -> Outcome {
        if self.max_score != self.min_score {
            if self.max_score > self.min_score {
                Outcome::Win
            } else {
                Outcome::Loss
            }
        } else if self.max_center_distance != self.min_center_distance {
            if self.max_center_distance < self.min_center_distance {
                Outcome::Win
            } else {
                Outcome::Loss
            }
        } else {
            Outcome::Undetermined
        }
    }

    /// Legal moves from the underlying rules engine
    pub fn actions(&self) -> Vec<S::Move> {
        self.state.legal_moves()
    }

    /// Successor node for a legal move, preserving the max/min identities
    pub fn apply(&self, mv: &S::Move) -> SearchNode<S> {
        Self::build(self.state.apply(mv), self.max_color, Some(mv.clone()))
    }

    /// Successor nodes for the acting role.
    ///
    /// Moves that cost the actor one of their own marbles relative to this
    /// node are withheld; the rules engine has already guaranteed legality.
    pub fn children(&self, role: Role) -> Vec<(S::Move, SearchNode<S>)> {
        let mut children = Vec::new();
        for mv in self.actions() {
            let child = self.apply(&mv);
            let keeps_own = match role {
                Role::Max => child.min_score <= self.min_score,
                Role::Min => child.max_score <= self.max_score,
            };
            if keeps_own {
                children.push((mv, child));
            }
        }
        children
    }

    /// Whether applying `mv` increases the opponent's score as seen by `role`
    pub fn is_capturing_move(&self, mv: &S::Move, role: Role) -> bool {
        let child = self.apply(mv);
        match role {
            Role::Max => child.min_score > self.min_score,
            Role::Min => child.max_score > self.max_score,
        }
    }

    /// A non-terminal position is quiescent for `role` when none of the
    /// candidate moves is a capturing move for that role.
    pub fn is_quiescent(&self, candidates: &[S::Move], role: Role) -> bool {
        if self.is_terminal() {
            return true;
        }
        !candidates
            .iter()
            .any(|mv| self.is_capturing_move(mv, role))
    }
}
