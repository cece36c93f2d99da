use serde::{Deserialize, Serialize};
use std::fmt;

use super::action::Direction;
use super::config::GameConfig;
use super::grid::{Board, Cell, Position};
use crate::error::{Result, SnakeError};

/// What the head ran into during a tick.
///
/// Doubles as the reward signal for the learning layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Empty,
    Green,
    Red,
    Wall,
    SelfCollision,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Empty => "empty",
            Outcome::Green => "green",
            Outcome::Red => "red",
            Outcome::Wall => "wall",
            Outcome::SelfCollision => "snake",
        }
    }
}

/// Result of a single move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// False when the move ended the game
    pub success: bool,
    pub outcome: Outcome,
}

impl StepResult {
    pub fn alive(outcome: Outcome) -> Self {
        Self {
            success: true,
            outcome,
        }
    }

    pub fn dead(outcome: Outcome) -> Self {
        Self {
            success: false,
            outcome,
        }
    }
}

/// Full game state at one tick: the unit of history and of replay files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snake cells, head first
    pub body: Vec<Position>,
    pub direction: Direction,
    pub green_apples: Vec<Position>,
    pub red_apples: Vec<Position>,
}

impl Snapshot {
    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_snake(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    pub fn is_green(&self, pos: Position) -> bool {
        self.green_apples.contains(&pos)
    }

    pub fn is_red(&self, pos: Position) -> bool {
        self.red_apples.contains(&pos)
    }

    /// Lay the snapshot out on a board, checking it is a reachable game state
    ///
    /// The snake must be non-empty, on the board, connected and free of
    /// repeats. Apples must be on free cells and no more numerous than the
    /// game keeps.
    pub fn to_board(&self, config: &GameConfig) -> Result<Board> {
        let mut board = Board::new(config.board_size);
        if self.body.is_empty() {
            return Err(SnakeError::InvalidSnapshot("snake has no cells".to_string()));
        }

        for (i, &pos) in self.body.iter().enumerate() {
            if board.get(pos) != Some(Cell::Empty) {
                return Err(SnakeError::InvalidSnapshot(format!(
                    "snake cell {i} at {pos:?} is off the board or repeated"
                )));
            }
            if i > 0 && !self.body[i - 1].is_adjacent(pos) {
                return Err(SnakeError::InvalidSnapshot(format!(
                    "snake cells {} and {i} are not adjacent",
                    i - 1
                )));
            }
            board.set(pos, Cell::Snake);
        }

        for (apples, cell, limit) in [
            (&self.green_apples, Cell::Green, config.green_apples),
            (&self.red_apples, Cell::Red, config.red_apples),
        ] {
            if apples.len() > limit {
                return Err(SnakeError::InvalidSnapshot(format!(
                    "{} {cell:?} apples but the game keeps {limit}",
                    apples.len()
                )));
            }
            for &pos in apples {
                if board.get(pos) != Some(Cell::Empty) {
                    return Err(SnakeError::InvalidSnapshot(format!(
                        "{cell:?} apple at {pos:?} is off the board or overlaps another object"
                    )));
                }
                board.set(pos, cell);
            }
        }

        Ok(board)
    }

    pub fn validate(&self, config: &GameConfig) -> Result<()> {
        self.to_board(config).map(|_| ())
    }

    /// Text rendering of the board, one line per row
    pub fn to_ascii(&self, board_size: usize) -> String {
        let mut out = String::with_capacity((board_size + 1) * (board_size * 2 + 1));
        for row in 0..board_size as i32 {
            for col in 0..board_size as i32 {
                let pos = Position::new(row, col);
                let glyph = if pos == self.head() {
                    'H'
                } else if self.is_snake(pos) {
                    'S'
                } else if self.is_green(pos) {
                    'G'
                } else if self.is_red(pos) {
                    'R'
                } else {
                    '.'
                };
                out.push(glyph);
                if col + 1 < board_size as i32 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "head {:?} heading {:?}, length {}, green {:?}, red {:?}",
            (self.head().row, self.head().col),
            self.direction,
            self.len(),
            self.green_apples
                .iter()
                .map(|p| (p.row, p.col))
                .collect::<Vec<_>>(),
            self.red_apples
                .iter()
                .map(|p| (p.row, p.col))
                .collect::<Vec<_>>(),
        )
    }
}
