//! Presentation layer
//!
//! The game and the learning loop only talk to a [`Presenter`]. Headless runs
//! use [`NullPresenter`]; interactive runs draw with ratatui through
//! [`TerminalPresenter`].

pub mod renderer;
pub mod terminal;

pub use renderer::Renderer;
pub use terminal::TerminalPresenter;

use anyhow::Result;

use crate::game::{Direction, Outcome, Snapshot};

/// Text shown around the board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub title: String,
    pub score: i32,
    pub moves: usize,
    /// Free-form lines under the header, e.g. the current state label
    pub lines: Vec<String>,
    /// Set once the game shown has ended
    pub game_over: Option<Outcome>,
}

impl Hud {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// What a human player asked for since the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Direction(Direction),
    Restart,
    Quit,
    None,
}

/// What someone watching a game asked for since the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectatorInput {
    Quit,
    /// Move through the recording by this many frames
    Step(i64),
    /// Paused: keep showing the current frame
    Hold,
    None,
}

pub trait Presenter {
    fn render(&mut self, snapshot: &Snapshot, hud: &Hud) -> Result<()>;

    fn player_input(&mut self) -> Result<PlayerInput>;

    fn spectator_input(&mut self) -> Result<SpectatorInput>;

    /// Release whatever the presenter holds (terminal modes, screens)
    fn quit(&mut self) -> Result<()>;
}

/// Presenter for `--no-ui` runs: draws nothing and never interrupts
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render(&mut self, _snapshot: &Snapshot, _hud: &Hud) -> Result<()> {
        Ok(())
    }

    fn player_input(&mut self) -> Result<PlayerInput> {
        Ok(PlayerInput::None)
    }

    fn spectator_input(&mut self) -> Result<SpectatorInput> {
        Ok(SpectatorInput::None)
    }

    fn quit(&mut self) -> Result<()> {
        Ok(())
    }
}
