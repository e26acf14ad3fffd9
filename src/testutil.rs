//! Test fixture: a miniature single-marble pushing game.
//!
//! Real rules engines are external; the unit tests drive the core through
//! this toy implementation of [`GameDynamics`]. A marble may step to an
//! adjacent free cell, or push a lone adjacent enemy marble one cell (off the
//! board if there is no cell behind it, which scores a capture).

use crate::grid::{self, Cell, Direction};
use crate::rules::{Color, GameDynamics};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepMove {
    pub from: Cell,
    pub dir: Direction,
}

#[derive(Clone, Debug)]
pub struct MiniGame {
    pub board: FxHashMap<Cell, Color>,
    pub to_move: Color,
    pub lost: [u32; 2],
    pub plies: u32,
    pub max_plies: u32,
    pub capture_goal: u32,
}

impl MiniGame {
    pub fn new(marbles: &[(Cell, Color)], to_move: Color) -> Self {
        let mut board = FxHashMap::default();
        for &(cell, color) in marbles {
            assert!(cell.on_board(), "fixture marble off the board: {:?}", cell);
            board.insert(cell, color);
        }
        Self {
            board,
            to_move,
            lost: [0, 0],
            plies: 0,
            max_plies: 60,
            capture_goal: 2,
        }
    }
}

impl GameDynamics for MiniGame {
    type Move = StepMove;

    fn legal_moves(&self) -> Vec<StepMove> {
        let mut own: Vec<Cell> = self
            .board
            .iter()
            .filter(|&(_, &c)| c == self.to_move)
            .map(|(&cell, _)| cell)
            .collect();
        own.sort();

        let mut moves = Vec::new();
        for from in own {
            for &dir in grid::directions_at(from) {
                let target = from.step(dir);
                match self.board.get(&target) {
                    None => moves.push(StepMove { from, dir }),
                    Some(&c) if c != self.to_move => {
                        let beyond = target.step(dir);
                        if !beyond.on_board() || !self.board.contains_key(&beyond) {
                            moves.push(StepMove { from, dir });
                        }
                    }
                    _ => {}
                }
            }
        }
        moves
    }

    fn apply(&self, mv: &StepMove) -> Self {
        let mut next = self.clone();
        let mover = next
            .board
            .remove(&mv.from)
            .expect("move from an empty cell");
        let target = mv.from.step(mv.dir);
        if let Some(victim) = next.board.remove(&target) {
            let beyond = target.step(mv.dir);
            if beyond.on_board() {
                next.board.insert(beyond, victim);
            } else {
                next.lost[victim.index()] += 1;
            }
        }
        next.board.insert(target, mover);
        next.to_move = next.to_move.opponent();
        next.plies += 1;
        next
    }

    fn is_done(&self) -> bool {
        self.plies >= self.max_plies || self.lost.iter().any(|&l| l >= self.capture_goal)
    }

    fn marbles_lost(&self, color: Color) -> u32 {
        self.lost[color.index()]
    }

    fn occupied_cells(&self) -> Vec<(Cell, Color)> {
        let mut cells: Vec<(Cell, Color)> =
            self.board.iter().map(|(&c, &color)| (c, color)).collect();
        cells.sort_by_key(|&(c, _)| c);
        cells
    }
}
