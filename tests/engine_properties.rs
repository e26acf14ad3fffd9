//! End-to-end engine properties driven through toy rules engines.
//!
//! Two fixtures: `PushGame`, a single-marble shoving game on the real board
//! where shoving a friendly marble off the edge is legal but self-harmful
//! (the adapter must withhold it), and `ScriptedGame`, an explicit game tree
//! whose leaf values are staged through marble placement so exact minimax
//! values can be asserted.

use abalone_engine::{
    evaluate, grid, AlphaBeta, Cell, ClusterAnalysis, Color, Direction, GameDynamics, Role,
    SearchConfig, SearchNode, ZobristTable,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

// ============================================================================
// PUSH GAME
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    from: Cell,
    dir: Direction,
}

/// Single-marble steps on the real board. A marble may step to an adjacent
/// empty cell, or shove a lone adjacent marble of either color one cell
/// further; shoving it past the edge removes it and counts against its own
/// color. Friendly shoves off the edge are legal, which is exactly what the
/// adapter's children filter exists to withhold.
#[derive(Clone, Debug)]
struct PushGame {
    board: FxHashMap<Cell, Color>,
    to_move: Color,
    lost: [u32; 2],
    plies: u32,
}

impl PushGame {
    fn new(marbles: &[(Cell, Color)], to_move: Color) -> Self {
        Self {
            board: marbles.iter().copied().collect(),
            to_move,
            lost: [0, 0],
            plies: 0,
        }
    }
}

impl GameDynamics for PushGame {
    type Move = Step;

    fn legal_moves(&self) -> Vec<Step> {
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
                    None => moves.push(Step { from, dir }),
                    Some(_) => {
                        let beyond = target.step(dir);
                        if !beyond.on_board() || !self.board.contains_key(&beyond) {
                            moves.push(Step { from, dir });
                        }
                    }
                }
            }
        }
        moves
    }

    fn apply(&self, mv: &Step) -> Self {
        let mut next = self.clone();
        let mover = next.board.remove(&mv.from).unwrap();
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
        self.plies >= 40 || self.lost.iter().any(|&l| l >= 2)
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

// ============================================================================
// SCRIPTED GAME
// ============================================================================

#[derive(Clone, Debug)]
struct TreeNode {
    children: Vec<usize>,
    /// Min-color marbles; with no max marbles the heuristic of a state is
    /// exactly the summed center distance of these
    black: Vec<Cell>,
}

/// Explicit game tree with staged static values
#[derive(Clone, Debug)]
struct ScriptedGame {
    at: usize,
    tree: Arc<Vec<TreeNode>>,
}

impl ScriptedGame {
    fn new(tree: Vec<TreeNode>) -> Self {
        Self {
            at: 0,
            tree: Arc::new(tree),
        }
    }
}

impl GameDynamics for ScriptedGame {
    type Move = usize;

    fn legal_moves(&self) -> Vec<usize> {
        self.tree[self.at].children.clone()
    }

    fn apply(&self, mv: &usize) -> Self {
        Self {
            at: *mv,
            tree: Arc::clone(&self.tree),
        }
    }

    fn is_done(&self) -> bool {
        false
    }

    fn marbles_lost(&self, _color: Color) -> u32 {
        0
    }

    fn occupied_cells(&self) -> Vec<(Cell, Color)> {
        self.tree[self.at]
            .black
            .iter()
            .map(|&c| (c, Color::Black))
            .collect()
    }
}

/// Min-color marbles whose summed center distance is the wanted value
fn marbles_worth(value: u32) -> Vec<Cell> {
    // (0,4) and (16,4) are 4 away from the center, (7,5) is 1, (6,2) is 2,
    // (5,7) is 3
    match value {
        2 => vec![Cell::new(6, 2)],
        3 => vec![Cell::new(5, 7)],
        5 => vec![Cell::new(0, 4), Cell::new(7, 5)],
        9 => vec![Cell::new(0, 4), Cell::new(16, 4), Cell::new(7, 5)],
        _ => panic!("no staging for value {value}"),
    }
}

fn random_board(rng: &mut ChaCha8Rng, marbles_per_side: usize) -> Vec<(Cell, Color)> {
    let mut cells: Vec<Cell> = grid::board_cells().collect();
    cells.shuffle(rng);
    cells
        .into_iter()
        .take(2 * marbles_per_side)
        .enumerate()
        .map(|(i, cell)| {
            let color = if i % 2 == 0 { Color::White } else { Color::Black };
            (cell, color)
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn scripted_tree_minimax_value_and_move() {
    // Root (max) has two moves. Behind the first, min chooses between leaves
    // worth 3 and 5; behind the second, between 2 and 9. Min takes 3 and 2,
    // max prefers 3: root value 3 through the first branch.
    let tree = vec![
        TreeNode {
            children: vec![1, 2],
            black: vec![],
        },
        TreeNode {
            children: vec![3, 4],
            black: marbles_worth(5),
        },
        TreeNode {
            children: vec![5, 6],
            black: marbles_worth(5),
        },
        TreeNode {
            children: vec![],
            black: marbles_worth(3),
        },
        TreeNode {
            children: vec![],
            black: marbles_worth(5),
        },
        TreeNode {
            children: vec![],
            black: marbles_worth(2),
        },
        TreeNode {
            children: vec![],
            black: marbles_worth(9),
        },
    ];
    let root = SearchNode::root(ScriptedGame::new(tree), Color::White);
    let config = SearchConfig {
        depth: 2,
        median_filter: false,
        use_transposition: false,
        seed: Some(7),
        ..Default::default()
    };
    let mut engine = AlphaBeta::new(config);
    let outcome = engine.search(&root);
    assert_eq!(outcome.value, 3.0);
    assert_eq!(outcome.best_move, Some(1));
    assert_eq!(outcome.stats.root_branches, 2);
}

#[test]
fn static_values_back_the_scripted_staging() {
    // Sanity-check the staging trick itself: a state holding only min
    // marbles evaluates to their summed center distance.
    for value in [2_u32, 3, 5, 9] {
        let tree = vec![TreeNode {
            children: vec![],
            black: marbles_worth(value),
        }];
        let node = SearchNode::root(ScriptedGame::new(tree), Color::White);
        assert_eq!(evaluate(&node), value as f32);
    }
}

#[test]
fn pruning_preserves_the_root_value() {
    let marbles = [
        (Cell::new(8, 4), Color::White),
        (Cell::new(9, 3), Color::White),
        (Cell::new(6, 6), Color::Black),
        (Cell::new(12, 4), Color::Black),
    ];
    let root = SearchNode::root(PushGame::new(&marbles, Color::White), Color::White);
    let base = SearchConfig {
        depth: 2,
        median_filter: false,
        use_transposition: false,
        seed: Some(5),
        ..Default::default()
    };

    let mut pruned = AlphaBeta::new(base);
    let mut plain = AlphaBeta::new(SearchConfig {
        alpha_beta_pruning: false,
        ..base
    });
    let a = pruned.search(&root);
    let b = plain.search(&root);
    assert_eq!(a.value, b.value);
    assert!(a.stats.nodes_visited <= b.stats.nodes_visited);
}

#[test]
fn friendly_shoves_off_the_edge_are_withheld() {
    // White at (5,1) can legally shove its own marble at (6,0) west off the
    // board. The move is in the action list but must never appear among
    // max's children.
    let game = PushGame::new(
        &[
            (Cell::new(5, 1), Color::White),
            (Cell::new(6, 0), Color::White),
            (Cell::new(12, 4), Color::Black),
        ],
        Color::White,
    );
    let node = SearchNode::root(game, Color::White);
    let actions = node.actions();
    let harmful: Vec<&Step> = actions
        .iter()
        .filter(|&mv| node.apply(mv).min_score() > node.min_score())
        .collect();
    assert!(!harmful.is_empty());

    let children = node.children(Role::Max);
    assert_eq!(children.len(), actions.len() - harmful.len());
    for (mv, child) in &children {
        assert!(!harmful.contains(&mv));
        assert_eq!(child.min_score(), 0);
    }
}

#[test]
fn search_never_chooses_self_harm() {
    let game = PushGame::new(
        &[
            (Cell::new(5, 1), Color::White),
            (Cell::new(6, 0), Color::White),
            (Cell::new(2, 2), Color::Black),
        ],
        Color::White,
    );
    let root = SearchNode::root(game, Color::White);
    let mut engine = AlphaBeta::new(SearchConfig {
        depth: 2,
        seed: Some(13),
        ..Default::default()
    });
    let best = engine.search(&root).best_move.unwrap();
    assert_eq!(root.apply(&best).min_score(), 0);
}

#[test]
fn incremental_hash_tracks_a_full_playout() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let table = ZobristTable::from_seed(42);

    for _ in 0..5 {
        let mut game = PushGame::new(&random_board(&mut rng, 4), Color::White);
        let mut node = SearchNode::root(game.clone(), Color::White);
        let mut hash = table.full_hash(node.board());

        for _ in 0..30 {
            if game.is_done() {
                break;
            }
            let moves = game.legal_moves();
            let Some(mv) = moves.choose(&mut rng) else {
                break;
            };
            game = game.apply(mv);
            let next = SearchNode::root(game.clone(), Color::White);
            hash = table.update(hash, node.board(), next.board());
            assert_eq!(hash, table.full_hash(next.board()));
            node = next;
        }
    }
}

#[test]
fn clusters_partition_random_boards() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..20 {
        let marbles = random_board(&mut rng, 6);
        let board: FxHashMap<Cell, Color> = marbles.iter().copied().collect();
        let analysis = ClusterAnalysis::of(&board);

        for color in [Color::White, Color::Black] {
            let mut seen = FxHashSet::default();
            for cluster in analysis.clusters(color) {
                assert!(!cluster.is_empty());
                for &cell in &cluster.cells {
                    assert_eq!(board.get(&cell), Some(&color));
                    assert!(seen.insert(cell), "cell in two clusters");
                }
            }
            let expected = board.values().filter(|&&c| c == color).count();
            assert_eq!(seen.len(), expected);
            assert_eq!(analysis.marble_count(color), expected);
        }
    }
}

#[test]
fn noisy_horizons_still_terminate() {
    // Mutual push threats on both wings keep the horizon noisy; the ply cap
    // still bounds the extension and the search returns a finite value.
    let marbles = [
        (Cell::new(5, 1), Color::White),
        (Cell::new(6, 0), Color::Black),
        (Cell::new(10, 8), Color::Black),
        (Cell::new(11, 7), Color::White),
    ];
    for depth in 1..=3 {
        let root = SearchNode::root(PushGame::new(&marbles, Color::White), Color::White);
        let mut engine = AlphaBeta::new(SearchConfig {
            depth,
            quiescence_margin: 2,
            seed: Some(1),
            ..Default::default()
        });
        let outcome = engine.search(&root);
        assert!(outcome.value.is_finite());
        assert!(outcome.best_move.is_some());
    }
}

#[test]
fn transposition_reuse_keeps_moves_legal() {
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    for _ in 0..5 {
        let game = PushGame::new(&random_board(&mut rng, 3), Color::White);
        let legal = game.legal_moves();
        let root = SearchNode::root(game, Color::White);
        let mut engine = AlphaBeta::new(SearchConfig {
            depth: 3,
            use_transposition: true,
            seed: Some(21),
            ..Default::default()
        });
        let outcome = engine.search(&root);
        if let Some(mv) = outcome.best_move {
            assert!(legal.contains(&mv));
        }
    }
}
