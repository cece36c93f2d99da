use anyhow::Result;
use rand::Rng;
use std::path::PathBuf;
use tracing::info;

use crate::game::{GameConfig, SnakeGame, save_history};
use crate::metrics::GameMetrics;
use crate::render::{Hud, PlayerInput, Presenter};

/// Human play: steer with the keyboard, restart or quit at will
///
/// Each finished game is written to `history_path` so it can be replayed.
pub struct PlayMode {
    config: GameConfig,
    history_path: PathBuf,
    metrics: GameMetrics,
}

impl PlayMode {
    pub fn new(config: GameConfig, history_path: PathBuf) -> Self {
        Self {
            config,
            history_path,
            metrics: GameMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    /// Play games until the player quits
    pub fn run<R: Rng>(&mut self, presenter: &mut dyn Presenter, rng: &mut R) -> Result<()> {
        'session: loop {
            let mut game = SnakeGame::new(self.config.clone(), &mut *rng)?;
            self.metrics.on_game_start();

            loop {
                self.metrics.update();
                presenter.render(&game.snapshot(), &self.hud(&game))?;

                match presenter.player_input()? {
                    PlayerInput::Quit => {
                        self.finish(&game)?;
                        break 'session;
                    }
                    PlayerInput::Restart => {
                        self.finish(&game)?;
                        continue 'session;
                    }
                    PlayerInput::Direction(direction) if !game.is_over() => {
                        game.set_direction(direction);
                    }
                    PlayerInput::Direction(_) | PlayerInput::None => {}
                }

                if !game.is_over() {
                    let result = game.step();
                    if !result.success {
                        self.metrics
                            .on_game_over(game.score(), game.len(), result.outcome);
                        info!(
                            score = game.score(),
                            outcome = result.outcome.as_str(),
                            "game over"
                        );
                        save_history(game.history(), &self.history_path)?;
                    }
                }
            }
        }

        presenter.quit()
    }

    /// Save an abandoned game; finished games were saved when they ended
    fn finish<R>(&self, game: &SnakeGame<R>) -> Result<()> {
        if game.is_over() {
            Ok(())
        } else {
            save_history(game.history(), &self.history_path)
        }
    }

    fn hud<R>(&self, game: &SnakeGame<R>) -> Hud {
        let mut hud = Hud::new("Snake");
        hud.score = game.score();
        hud.moves = game.history().len() - 1;
        hud.lines = vec![self.metrics.format_summary()];
        hud.game_over = game.terminal_result().map(|result| result.outcome);
        hud
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Snapshot, load_history};
    use crate::render::SpectatorInput;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    /// Plays back a fixed list of player inputs, then quits
    struct Keyboard {
        inputs: Vec<PlayerInput>,
        game_over_frames: usize,
    }

    impl Presenter for Keyboard {
        fn render(&mut self, _: &Snapshot, hud: &Hud) -> Result<()> {
            if hud.game_over.is_some() {
                self.game_over_frames += 1;
            }
            Ok(())
        }

        fn player_input(&mut self) -> Result<PlayerInput> {
            if self.inputs.is_empty() {
                Ok(PlayerInput::Quit)
            } else {
                Ok(self.inputs.remove(0))
            }
        }

        fn spectator_input(&mut self) -> Result<SpectatorInput> {
            Ok(SpectatorInput::None)
        }

        fn quit(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_game_runs_into_wall_and_is_saved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game_history.json");
        let mut mode = PlayMode::new(GameConfig::default(), path.clone());
        // Going straight hits a wall within a board's width
        let mut keyboard = Keyboard {
            inputs: vec![PlayerInput::None; 12],
            game_over_frames: 0,
        };

        mode.run(&mut keyboard, &mut StdRng::seed_from_u64(4)).unwrap();

        assert_eq!(mode.metrics().games_played, 1);
        assert!(keyboard.game_over_frames >= 1);
        let history = load_history(&path).unwrap();
        assert!(history.len() >= 2);
    }

    #[test]
    fn test_quit_saves_unfinished_game() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game_history.json");
        let mut mode = PlayMode::new(GameConfig::default(), path.clone());
        let mut keyboard = Keyboard {
            inputs: vec![PlayerInput::None],
            game_over_frames: 0,
        };

        mode.run(&mut keyboard, &mut StdRng::seed_from_u64(9)).unwrap();

        assert_eq!(mode.metrics().games_played, 0);
        assert_eq!(load_history(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_restart_starts_a_new_game() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game_history.json");
        let mut mode = PlayMode::new(GameConfig::default(), path.clone());
        let mut keyboard = Keyboard {
            inputs: vec![PlayerInput::None, PlayerInput::Restart],
            game_over_frames: 0,
        };

        mode.run(&mut keyboard, &mut StdRng::seed_from_u64(1)).unwrap();

        // The restarted game is quit before its first move
        assert_eq!(load_history(&path).unwrap().len(), 1);
    }
}
