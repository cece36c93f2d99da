use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Instant;

use super::{Hud, PlayerInput, Presenter, Renderer, SpectatorInput};
use crate::game::{Direction, Snapshot};
use crate::input::{InputHandler, KeyAction, Speed};

pub type TuiTerminal = Terminal<CrosstermBackend<Stderr>>;

/// Put the terminal in raw mode on the alternate screen
pub fn setup_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Frames a spectator key moves through a recording
pub fn spectator_step(direction: Direction) -> i64 {
    match direction {
        Direction::Right => 1,
        Direction::Left => -1,
        Direction::Up => 10,
        Direction::Down => -10,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Player,
    Spectator,
}

/// Synchronous ratatui presenter
///
/// Each input call blocks for at most one tick of the current speed, which
/// is what paces the game loop.
pub struct TerminalPresenter {
    terminal: Option<TuiTerminal>,
    renderer: Renderer,
    input: InputHandler,
    role: Role,
    speed: Speed,
    paused: bool,
}

impl TerminalPresenter {
    /// Presenter for a human at the keyboard
    pub fn player(board_size: usize) -> Result<Self> {
        Self::new(board_size, Role::Player, Speed::Normal)
    }

    /// Presenter for watching an agent or a replay
    pub fn spectator(board_size: usize, speed: Speed) -> Result<Self> {
        Self::new(board_size, Role::Spectator, speed)
    }

    fn new(board_size: usize, role: Role, speed: Speed) -> Result<Self> {
        Ok(Self {
            terminal: Some(setup_terminal()?),
            renderer: Renderer::new(board_size),
            input: InputHandler::new(),
            role,
            speed,
            paused: false,
        })
    }

    fn footer(&self) -> String {
        match self.role {
            Role::Player => "↑↓←→ or WASD to move | R to restart | Q to quit".to_string(),
            Role::Spectator => format!(
                "Speed: {}{} | 1-4 speed | Space pause | ←→ step | Q quit",
                self.speed.as_str(),
                if self.paused { " (paused)" } else { "" }
            ),
        }
    }

    /// Next key press before `deadline`, if any
    fn next_key(&self, deadline: Instant) -> Result<Option<KeyAction>> {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            if !event::poll(deadline - now).context("Failed to poll terminal events")? {
                return Ok(None);
            }
            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                // Only process key press events, not release
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.input.handle_key_event(key)));
                }
            }
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, snapshot: &Snapshot, hud: &Hud) -> Result<()> {
        let footer = self.footer();
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };
        let renderer = &self.renderer;
        terminal
            .draw(|frame| renderer.render(frame, snapshot, hud, &footer))
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn player_input(&mut self) -> Result<PlayerInput> {
        let deadline = Instant::now() + self.speed.tick_interval();
        let mut steer = None;

        while let Some(action) = self.next_key(deadline)? {
            match action {
                KeyAction::Steer(direction) => steer = Some(direction),
                KeyAction::Restart => return Ok(PlayerInput::Restart),
                KeyAction::Quit => return Ok(PlayerInput::Quit),
                KeyAction::Speed(speed) => self.speed = speed,
                KeyAction::Pause | KeyAction::None => {}
            }
        }

        Ok(steer.map_or(PlayerInput::None, PlayerInput::Direction))
    }

    fn spectator_input(&mut self) -> Result<SpectatorInput> {
        let deadline = Instant::now() + self.speed.tick_interval();

        while let Some(action) = self.next_key(deadline)? {
            match action {
                KeyAction::Quit => return Ok(SpectatorInput::Quit),
                KeyAction::Steer(direction) => {
                    return Ok(SpectatorInput::Step(spectator_step(direction)));
                }
                KeyAction::Pause => self.paused = !self.paused,
                KeyAction::Speed(speed) => self.speed = speed,
                KeyAction::Restart | KeyAction::None => {}
            }
        }

        Ok(if self.paused {
            SpectatorInput::Hold
        } else {
            SpectatorInput::None
        })
    }

    fn quit(&mut self) -> Result<()> {
        match self.terminal.take() {
            Some(mut terminal) => restore_terminal(&mut terminal),
            None => Ok(()),
        }
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        if let Some(mut terminal) = self.terminal.take() {
            let _ = restore_terminal(&mut terminal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectator_steps() {
        assert_eq!(spectator_step(Direction::Right), 1);
        assert_eq!(spectator_step(Direction::Left), -1);
        assert_eq!(spectator_step(Direction::Up), 10);
        assert_eq!(spectator_step(Direction::Down), -10);
    }
}
