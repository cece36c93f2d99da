//! Snake on a square board with green and red apples, learned by a tabular
//! Q-learning agent
//!
//! This library provides:
//! - Core game logic (game module)
//! - Featurizers, the value table and the episode driver (rl module)
//! - TUI rendering behind a presenter interface (render, input modules)
//! - Execution modes: play, train, test, replay, visualize (modes module)

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;

pub use error::SnakeError;
