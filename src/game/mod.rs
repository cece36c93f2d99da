//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies
//! apart from the replay file helpers in [`history`]. It is driven the same way by a
//! human player, the learning agent and the replay viewer.

pub mod action;
pub mod config;
pub mod engine;
pub mod grid;
pub mod history;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction, Turn};
pub use config::GameConfig;
pub use engine::SnakeGame;
pub use grid::{Board, Cell, Position};
pub use history::{load_history, save_history};
pub use state::{Outcome, Snapshot, StepResult};
