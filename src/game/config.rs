use serde::{Deserialize, Serialize};

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square board
    pub board_size: usize,
    /// Initial length of the snake
    pub initial_length: usize,
    /// Number of green (growth) apples kept on the board
    pub green_apples: usize,
    /// Number of red (shrink) apples kept on the board
    pub red_apples: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 10,
            initial_length: 3,
            green_apples: 2,
            red_apples: 1,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom board size
    pub fn new(board_size: usize) -> Self {
        Self {
            board_size,
            ..Default::default()
        }
    }

    /// Create a small board for testing
    pub fn small() -> Self {
        Self::new(5)
    }

    pub fn cell_count(&self) -> usize {
        self.board_size * self.board_size
    }

    /// Check that a game can actually be laid out with these settings
    ///
    /// The snake needs its whole body plus the cell ahead of the head in one
    /// straight line, so the initial length must be shorter than the board.
    pub fn validate(&self) -> Result<(), String> {
        if self.board_size < 2 {
            return Err(format!("board_size must be at least 2, got {}", self.board_size));
        }

        if self.initial_length == 0 {
            return Err("initial_length must be at least 1".to_string());
        }

        if self.initial_length >= self.board_size {
            return Err(format!(
                "initial_length ({}) must be smaller than board_size ({})",
                self.initial_length, self.board_size
            ));
        }

        let needed = self.initial_length + self.green_apples + self.red_apples;
        if needed > self.cell_count() {
            return Err(format!(
                "snake and apples need {} cells but the board only has {}",
                needed,
                self.cell_count()
            ));
        }

        Ok(())
    }
}
