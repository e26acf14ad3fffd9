//! Decision surface for a host game loop
//!
//! The host owns the rules engine and the clock; this module owns the choice.
//! [`AbalonePlayer`] wraps one search engine and turns a raw state plus the
//! acting color into a move.

use crate::error::EngineError;
use crate::node::SearchNode;
use crate::rules::{Color, GameDynamics};
use crate::search::{AlphaBeta, SearchConfig, SearchStats};
use tracing::debug;

/// A chosen move with its backing value and search figures
#[derive(Clone, Debug)]
pub struct Decision<M> {
    pub mv: M,
    pub value: f32,
    pub stats: SearchStats,
}

/// Alpha-beta player over any [`GameDynamics`] implementation
pub struct AbalonePlayer {
    engine: AlphaBeta,
}

impl AbalonePlayer {
    pub fn new(config: SearchConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            engine: AlphaBeta::new(config),
        })
    }

    pub fn config(&self) -> SearchConfig {
        self.engine.config
    }

    /// Statistics of the most recent decision
    pub fn stats(&self) -> SearchStats {
        self.engine.stats()
    }

    /// Pick a move for `color` in `state`.
    ///
    /// Returns `None` when the searched position offers no playable move
    /// (terminal, or every candidate was withheld); the host decides what a
    /// pass means.
    pub fn decide<S: GameDynamics>(&mut self, state: S, color: Color) -> Option<Decision<S::Move>> {
        let root = SearchNode::root(state, color);
        debug!(
            player = %color,
            score = root.max_score(),
            opponent_score = root.min_score(),
            "turn start"
        );

        let outcome = self.engine.search(&root);
        let mv = outcome.best_move?;
        debug!(player = %color, value = outcome.value, "move chosen");
        Some(Decision {
            mv,
            value: outcome.value,
            stats: outcome.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::testutil::MiniGame;

    fn config() -> SearchConfig {
        SearchConfig {
            depth: 2,
            use_transposition: false,
            seed: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_zero_depth() {
        let bad = SearchConfig {
            depth: 0,
            ..Default::default()
        };
        assert!(matches!(
            AbalonePlayer::new(bad),
            Err(EngineError::InvalidDepth(0))
        ));
    }

    #[test]
    fn test_decides_a_legal_move() {
        let game = MiniGame::new(
            &[
                (Cell::new(8, 4), Color::White),
                (Cell::new(12, 4), Color::Black),
            ],
            Color::White,
        );
        let legal = game.legal_moves();
        let mut player = AbalonePlayer::new(config()).unwrap();
        let decision = player.decide(game, Color::White).unwrap();
        assert!(legal.contains(&decision.mv));
        assert_eq!(player.stats(), decision.stats);
    }

    #[test]
    fn test_no_marbles_no_decision() {
        let game = MiniGame::new(&[(Cell::new(8, 4), Color::Black)], Color::White);
        let mut player = AbalonePlayer::new(config()).unwrap();
        assert!(player.decide(game, Color::White).is_none());
    }
}
