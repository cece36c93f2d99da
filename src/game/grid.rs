use rand::Rng;
use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell coordinate on the board. Serialized as a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Move position by delta
    pub fn moved_by(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.delta();
        self.moved_by(d_row, d_col)
    }

    /// True if the two cells differ by exactly one unit along one axis
    pub fn is_adjacent(&self, other: Position) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl From<Position> for (i32, i32) {
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}

/// What occupies an in-bounds cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Snake,
    Green,
    Red,
}

/// Set of empty cells with O(1) insert, remove and uniform sampling.
///
/// `cells` holds the members in arbitrary order; `slots[i]` is the position of
/// cell `i` inside `cells`, if it is a member.
#[derive(Debug, Clone)]
struct FreeCells {
    cells: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl FreeCells {
    fn full(capacity: usize) -> Self {
        Self {
            cells: (0..capacity).collect(),
            slots: (0..capacity).map(Some).collect(),
        }
    }

    fn insert(&mut self, cell: usize) {
        if self.slots[cell].is_none() {
            self.slots[cell] = Some(self.cells.len());
            self.cells.push(cell);
        }
    }

    fn remove(&mut self, cell: usize) {
        if let Some(slot) = self.slots[cell].take() {
            self.cells.swap_remove(slot);
            if let Some(&moved) = self.cells.get(slot) {
                self.slots[moved] = Some(slot);
            }
        }
    }

    fn contains(&self, cell: usize) -> bool {
        self.slots[cell].is_some()
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.cells.is_empty() {
            None
        } else {
            Some(self.cells[rng.gen_range(0..self.cells.len())])
        }
    }
}

/// Square board of `size * size` cells.
///
/// Every cell holds exactly one [`Cell`] value, so the snake, the two apple
/// colours and the empty cells are disjoint and cover the board by
/// construction. Empty cells are additionally indexed for random sampling.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
    free: FreeCells,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
            free: FreeCells::full(size * size),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.size && (pos.col as usize) < self.size
    }

    /// Contents of `pos`, or `None` if it lies outside the board
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.offset(pos).map(|idx| self.cells[idx])
    }

    /// Overwrite the contents of an in-bounds cell
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        let Some(idx) = self.offset(pos) else {
            panic!("cell {pos:?} is outside a {0}x{0} board", self.size);
        };
        self.cells[idx] = cell;
        if cell == Cell::Empty {
            self.free.insert(idx);
        } else {
            self.free.remove(idx);
        }
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.offset(pos).is_some_and(|idx| self.free.contains(idx))
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Pick a uniformly random empty cell
    pub fn random_free<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        self.free.sample(rng).map(|idx| self.position(idx))
    }

    /// Iterate over every cell of the board in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(|idx| self.position(idx))
    }

    fn offset(&self, pos: Position) -> Option<usize> {
        self.is_in_bounds(pos)
            .then(|| pos.row as usize * self.size + pos.col as usize)
    }

    fn position(&self, idx: usize) -> Position {
        Position::new((idx / self.size) as i32, (idx % self.size) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::Down), Position::new(6, 5));
        assert_eq!(pos.moved_in_direction(Direction::Left), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::Right), Position::new(5, 6));
    }

    #[test]
    fn test_adjacency() {
        let pos = Position::new(2, 2);
        assert!(pos.is_adjacent(Position::new(2, 3)));
        assert!(pos.is_adjacent(Position::new(1, 2)));
        assert!(!pos.is_adjacent(Position::new(3, 3)));
        assert!(!pos.is_adjacent(pos));
    }

    #[test]
    fn test_position_serializes_as_pair() {
        let json = serde_json::to_string(&Position::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");
        let back: Position = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(back, Position::new(1, 2));
    }

    #[test]
    fn test_bounds_checking() {
        let board = Board::new(10);
        assert!(board.is_in_bounds(Position::new(0, 0)));
        assert!(board.is_in_bounds(Position::new(9, 9)));
        assert!(!board.is_in_bounds(Position::new(-1, 0)));
        assert!(!board.is_in_bounds(Position::new(10, 0)));
        assert!(!board.is_in_bounds(Position::new(0, 10)));
        assert_eq!(board.get(Position::new(0, -1)), None);
    }

    #[test]
    fn test_set_tracks_free_cells() {
        let mut board = Board::new(3);
        assert_eq!(board.free_count(), 9);

        board.set(Position::new(1, 1), Cell::Snake);
        board.set(Position::new(0, 2), Cell::Green);
        assert_eq!(board.free_count(), 7);
        assert!(!board.is_free(Position::new(1, 1)));
        assert_eq!(board.get(Position::new(0, 2)), Some(Cell::Green));

        board.set(Position::new(1, 1), Cell::Empty);
        assert_eq!(board.free_count(), 8);
        assert!(board.is_free(Position::new(1, 1)));

        // setting an occupied cell to another occupied kind keeps the count
        board.set(Position::new(0, 2), Cell::Red);
        assert_eq!(board.free_count(), 8);
    }

    #[test]
    fn test_random_free_only_returns_empty_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = Board::new(4);
        let occupied: Vec<Position> = board.positions().filter(|p| p.row != 2).collect();
        for pos in &occupied {
            board.set(*pos, Cell::Snake);
        }

        for _ in 0..50 {
            let pos = board.random_free(&mut rng).unwrap();
            assert_eq!(pos.row, 2);
            assert_eq!(board.get(pos), Some(Cell::Empty));
        }
    }

    #[test]
    fn test_random_free_on_full_board() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut board = Board::new(2);
        let all: Vec<Position> = board.positions().collect();
        for pos in all {
            board.set(pos, Cell::Snake);
        }
        assert_eq!(board.random_free(&mut rng), None);
    }
}
