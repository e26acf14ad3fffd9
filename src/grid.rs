//! Hex board geometry on the 17x9 staggered grid
//!
//! Abalone positions use a doubled-row representation: 17 rows by 9 columns,
//! where a cell belongs to the hex board when its coordinate sum is even and
//! falls inside the hexagonal envelope. Vertical steps move two rows at a
//! time, which is why the distance metric divides by two and needs explicit
//! corrections for a handful of boundary deltas.

use serde::{Deserialize, Serialize};

/// Number of rows in the grid representation
pub const ROWS: i8 = 17;

/// Number of columns in the grid representation
pub const COLS: i8 = 9;

/// Geometric center of the board
pub const CENTER: Cell = Cell::new(ROWS / 2, COLS / 2);

/// Grid coordinates (row, col)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i8,
    pub col: i8,
}

impl Cell {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this cell lies inside the 17x9 rectangle
    pub fn in_grid(&self) -> bool {
        self.row >= 0 && self.row < ROWS && self.col >= 0 && self.col < COLS
    }

    /// Check if this cell is a playable board cell (on the hexagonal envelope)
    pub fn on_board(&self) -> bool {
        let sum = self.row + self.col;
        let diff = self.row - self.col;
        self.in_grid() && (sum & 1) == 0 && (4..=20).contains(&sum) && (-4..=12).contains(&diff)
    }

    /// Step one hex in the given direction
    pub fn step(&self, dir: Direction) -> Cell {
        let (dr, dc) = dir.delta();
        Cell::new(self.row + dr, self.col + dc)
    }

    /// Step `n` hexes in the given direction
    pub fn step_by(&self, dir: Direction, n: i8) -> Cell {
        let (dr, dc) = dir.delta();
        Cell::new(self.row + n * dr, self.col + n * dc)
    }
}

// ============================================================================
// DIRECTIONS
// ============================================================================

/// The six hex directions in grid deltas
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// Grid delta (drow, dcol) for one step
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::East => (-1, 1),
            Direction::West => (1, -1),
            Direction::NorthEast => (-2, 0),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (2, 0),
        }
    }

    /// The board axis this direction runs along
    pub const fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::Horizontal,
            Direction::NorthEast | Direction::SouthEast => Axis::EastDiagonal,
            Direction::NorthWest | Direction::SouthWest => Axis::WestDiagonal,
        }
    }

    /// Recover a direction from a single-step grid delta
    pub fn from_delta(delta: (i8, i8)) -> Option<Direction> {
        ALL_DIRECTIONS.iter().copied().find(|d| d.delta() == delta)
    }
}

/// The three strength axes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    EastDiagonal,
    WestDiagonal,
}

pub const ALL_DIRECTIONS: [Direction; 6] = [
    Direction::East,
    Direction::West,
    Direction::NorthEast,
    Direction::NorthWest,
    Direction::SouthWest,
    Direction::SouthEast,
];

// ============================================================================
// PER-CELL DIRECTION TABLES
// ============================================================================

// Corner cells of the hexagonal envelope
const TOP_LEFT_CORNER: Cell = Cell::new(4, 0);
const BOTTOM_LEFT_CORNER: Cell = Cell::new(16, 4);
const TOP_RIGHT_CORNER: Cell = Cell::new(0, 4);
const BOTTOM_RIGHT_CORNER: Cell = Cell::new(12, 8);
const LEFT_CORNER: Cell = Cell::new(12, 0);
const RIGHT_CORNER: Cell = Cell::new(4, 8);

// Diagonal edge runs between corners
const TOP_LEFT_EDGE: [Cell; 3] = [Cell::new(6, 0), Cell::new(8, 0), Cell::new(10, 0)];
const BOTTOM_LEFT_EDGE: [Cell; 3] = [Cell::new(13, 1), Cell::new(14, 2), Cell::new(15, 3)];
const TOP_RIGHT_EDGE: [Cell; 3] = [Cell::new(1, 5), Cell::new(2, 6), Cell::new(3, 7)];
const BOTTOM_RIGHT_EDGE: [Cell; 3] = [Cell::new(6, 8), Cell::new(8, 8), Cell::new(10, 8)];

use Direction::{East, NorthEast, NorthWest, SouthEast, SouthWest, West};

const DIRS_TOP_LEFT_CORNER: &[Direction] = &[East, SouthEast, SouthWest];
const DIRS_BOTTOM_LEFT_CORNER: &[Direction] = &[East, NorthEast, NorthWest];
const DIRS_TOP_RIGHT_CORNER: &[Direction] = &[West, SouthEast, SouthWest];
const DIRS_BOTTOM_RIGHT_CORNER: &[Direction] = &[West, NorthWest, NorthEast];
const DIRS_LEFT_CORNER: &[Direction] = &[East, NorthEast, SouthEast];
const DIRS_RIGHT_CORNER: &[Direction] = &[West, NorthWest, SouthWest];
const DIRS_TOP_LEFT_EDGE: &[Direction] = &[East, NorthEast, SouthEast, SouthWest];
const DIRS_BOTTOM_LEFT_EDGE: &[Direction] = &[East, NorthEast, NorthWest, SouthEast];
const DIRS_TOP_RIGHT_EDGE: &[Direction] = &[West, NorthWest, SouthEast, SouthWest];
const DIRS_BOTTOM_RIGHT_EDGE: &[Direction] = &[West, NorthEast, NorthWest, SouthWest];
const DIRS_TOP_BORDER: &[Direction] = &[East, West, SouthEast, SouthWest];
const DIRS_BOTTOM_BORDER: &[Direction] = &[East, West, NorthEast, NorthWest];
const DIRS_INTERIOR: &[Direction] =
    &[East, West, NorthEast, NorthWest, SouthWest, SouthEast];

/// Directions that stay on the board from the given cell
pub fn directions_at(cell: Cell) -> &'static [Direction] {
    match cell {
        TOP_LEFT_CORNER => DIRS_TOP_LEFT_CORNER,
        BOTTOM_LEFT_CORNER => DIRS_BOTTOM_LEFT_CORNER,
        TOP_RIGHT_CORNER => DIRS_TOP_RIGHT_CORNER,
        BOTTOM_RIGHT_CORNER => DIRS_BOTTOM_RIGHT_CORNER,
        LEFT_CORNER => DIRS_LEFT_CORNER,
        RIGHT_CORNER => DIRS_RIGHT_CORNER,
        c if TOP_LEFT_EDGE.contains(&c) => DIRS_TOP_LEFT_EDGE,
        c if BOTTOM_LEFT_EDGE.contains(&c) => DIRS_BOTTOM_LEFT_EDGE,
        c if TOP_RIGHT_EDGE.contains(&c) => DIRS_TOP_RIGHT_EDGE,
        c if BOTTOM_RIGHT_EDGE.contains(&c) => DIRS_BOTTOM_RIGHT_EDGE,
        c if c.row + c.col == 20 => DIRS_BOTTOM_BORDER,
        c if c.row + c.col == 4 => DIRS_TOP_BORDER,
        _ => DIRS_INTERIOR,
    }
}

/// Neighboring cells reachable from the given cell
pub fn neighbors(cell: Cell) -> impl Iterator<Item = Cell> {
    directions_at(cell).iter().map(move |&d| cell.step(d))
}

// ============================================================================
// DISTANCE
// ============================================================================

// Absolute coordinate deltas whose base distance undercounts the hex walk
const PLUS_ONE_DELTAS: [(i8, i8); 3] = [(0, 2), (1, 3), (2, 4)];
const PLUS_TWO_DELTAS: [(i8, i8); 1] = [(0, 4)];

/// Hex Manhattan distance between two cells.
///
/// Base metric is `(|drow| + |dcol|) / 2`; the staggered packing makes a few
/// boundary deltas come out short, corrected by the exception tables above.
pub fn hex_distance(a: Cell, b: Cell) -> f32 {
    let dr = (b.row - a.row).abs();
    let dc = (b.col - a.col).abs();
    let mut dist = (dr + dc) as f32 / 2.0;
    if PLUS_ONE_DELTAS.contains(&(dr, dc)) {
        dist += 1.0;
    }
    if PLUS_TWO_DELTAS.contains(&(dr, dc)) {
        dist += 2.0;
    }
    dist
}

/// Distance from the board center
pub fn distance_to_center(cell: Cell) -> f32 {
    hex_distance(CENTER, cell)
}

/// All cells of the 17x9 rectangle, board and non-board alike.
///
/// The Zobrist full hash folds in a contribution for every one of these.
pub fn all_cells() -> impl Iterator<Item = Cell> {
    (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Cell::new(row, col)))
}

/// All playable board cells
pub fn board_cells() -> impl Iterator<Item = Cell> {
    all_cells().filter(Cell::on_board)
}
