//! Replay mode: step through a recorded game
//!
//! Frames advance one per tick. The spectator can pause, jump forwards or
//! backwards, and quit. When a model is given, the HUD also shows the state
//! each frame falls in and the model's action values for it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::game::{GameConfig, Snapshot, load_history};
use crate::render::{Hud, Presenter, SpectatorInput};
use crate::rl::{ModelMetadata, QTable, StateFeaturizer, format_action_values, load_model};

struct ReplayModel {
    featurizer: Box<dyn StateFeaturizer>,
    q_table: QTable,
}

impl std::fmt::Debug for ReplayModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayModel")
            .field("q_table", &self.q_table)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ReplayMode {
    history: Vec<Snapshot>,
    game_config: GameConfig,
    model: Option<ReplayModel>,
    /// Print every frame as text (for runs without a UI)
    print_frames: bool,
}

impl ReplayMode {
    /// Load a recording; `game_config` describes the board unless a model is
    /// given, in which case the model's own settings are used
    ///
    /// Every frame must be a state that game could be in.
    pub fn new(
        history_path: &Path,
        model_dir: Option<PathBuf>,
        game_config: GameConfig,
    ) -> Result<Self> {
        let history = load_history(history_path)?;

        let (game_config, model) = match model_dir {
            Some(dir) => {
                let (q_table, metadata): (QTable, ModelMetadata) = load_model(&dir)
                    .with_context(|| format!("Failed to load model from {:?}", dir))?;
                let featurizer = metadata.featurizer.build(&metadata.game);
                (metadata.game, Some(ReplayModel { featurizer, q_table }))
            }
            None => (game_config, None),
        };

        for (tick, snapshot) in history.iter().enumerate() {
            snapshot.validate(&game_config).with_context(|| {
                format!("Malformed replay {:?} at tick {tick}", history_path)
            })?;
        }

        Ok(Self {
            history,
            game_config,
            model,
            print_frames: false,
        })
    }

    pub fn with_printed_frames(mut self, print_frames: bool) -> Self {
        self.print_frames = print_frames;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.history.len()
    }

    pub fn board_size(&self) -> usize {
        self.game_config.board_size
    }

    /// Play the recording; returns the number of frames shown
    pub fn run(&mut self, presenter: &mut dyn Presenter) -> Result<usize> {
        let last = self.history.len() - 1;
        let mut cursor = 0;
        let mut shown = 0;

        loop {
            let snapshot = &self.history[cursor];
            presenter.render(snapshot, &self.hud(cursor))?;
            shown += 1;
            if self.print_frames {
                println!("Tick {}/{}", cursor, last);
                println!("{}", snapshot.to_ascii(self.game_config.board_size));
            }

            match presenter.spectator_input()? {
                SpectatorInput::Quit => break,
                SpectatorInput::Hold => {}
                SpectatorInput::Step(frames) => cursor = step_cursor(cursor, frames, last),
                SpectatorInput::None => {
                    if cursor == last {
                        break;
                    }
                    cursor += 1;
                }
            }
        }

        presenter.quit()?;
        Ok(shown)
    }

    fn hud(&self, cursor: usize) -> Hud {
        let snapshot = &self.history[cursor];
        let mut hud = Hud::new(format!("Replay {}/{}", cursor, self.history.len() - 1));
        hud.score = snapshot.len() as i32 - self.game_config.initial_length as i32;
        hud.moves = cursor;

        if let Some(model) = &self.model {
            let state = model.featurizer.state_index(snapshot);
            hud.lines = vec![
                format!("State {state}: {}", model.featurizer.describe(state)),
                format_action_values(&model.q_table, state),
            ];
        }
        hud
    }
}

/// Move `cursor` by `frames`, staying within `0..=last`
fn step_cursor(cursor: usize, frames: i64, last: usize) -> usize {
    let target = cursor as i64 + frames;
    target.clamp(0, last as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position, save_history};
    use crate::render::{NullPresenter, PlayerInput};
    use tempfile::TempDir;

    fn recording(frames: usize) -> Vec<Snapshot> {
        (0..frames as i32)
            .map(|i| Snapshot {
                body: vec![Position::new(0, i), Position::new(1, i)],
                direction: Direction::Right,
                green_apples: vec![Position::new(5, 5)],
                red_apples: vec![],
            })
            .collect()
    }

    /// Feeds a fixed script of spectator inputs, then quits
    struct Script {
        inputs: Vec<SpectatorInput>,
        frames: Vec<usize>,
    }

    impl Presenter for Script {
        fn render(&mut self, _: &Snapshot, hud: &Hud) -> Result<()> {
            self.frames.push(hud.moves);
            Ok(())
        }

        fn player_input(&mut self) -> Result<PlayerInput> {
            Ok(PlayerInput::None)
        }

        fn spectator_input(&mut self) -> Result<SpectatorInput> {
            if self.inputs.is_empty() {
                Ok(SpectatorInput::Quit)
            } else {
                Ok(self.inputs.remove(0))
            }
        }

        fn quit(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn replay_file(dir: &TempDir, frames: usize) -> PathBuf {
        let path = dir.path().join("game.json");
        save_history(&recording(frames), &path).unwrap();
        path
    }

    #[test]
    fn test_plays_to_the_end() {
        let temp_dir = TempDir::new().unwrap();
        let path = replay_file(&temp_dir, 5);

        let mut mode = ReplayMode::new(&path, None, GameConfig::default()).unwrap();
        assert_eq!(mode.frame_count(), 5);
        assert_eq!(mode.run(&mut NullPresenter).unwrap(), 5);
    }

    #[test]
    fn test_step_and_hold() {
        let temp_dir = TempDir::new().unwrap();
        let path = replay_file(&temp_dir, 6);
        let mut presenter = Script {
            inputs: vec![
                SpectatorInput::Step(10),
                SpectatorInput::Hold,
                SpectatorInput::Step(-2),
                SpectatorInput::None,
                SpectatorInput::Step(-100),
            ],
            frames: Vec::new(),
        };

        ReplayMode::new(&path, None, GameConfig::default())
            .unwrap()
            .run(&mut presenter)
            .unwrap();

        assert_eq!(presenter.frames, vec![0, 5, 5, 3, 4, 0]);
    }

    #[test]
    fn test_step_cursor_clamps() {
        assert_eq!(step_cursor(3, 1, 9), 4);
        assert_eq!(step_cursor(3, -10, 9), 0);
        assert_eq!(step_cursor(3, 10, 9), 9);
    }

    #[test]
    fn test_replay_must_fit_board() {
        let temp_dir = TempDir::new().unwrap();
        // The eleventh frame puts the head in column 10
        let path = replay_file(&temp_dir, 11);
        assert!(ReplayMode::new(&path, None, GameConfig::default()).is_err());
    }

    #[test]
    fn test_malformed_frames_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game.json");

        let mut frames = recording(3);
        frames[1].body.clear();
        save_history(&frames, &path).unwrap();
        let err = ReplayMode::new(&path, None, GameConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("tick 1"));

        // The default game keeps only two green apples
        let mut frames = recording(3);
        frames[2].green_apples = vec![
            Position::new(5, 0),
            Position::new(5, 9),
            Position::new(9, 5),
        ];
        save_history(&frames, &path).unwrap();
        assert!(ReplayMode::new(&path, None, GameConfig::default()).is_err());

        save_history(&[], &path).unwrap();
        assert!(ReplayMode::new(&path, None, GameConfig::default()).is_err());
    }

    #[test]
    fn test_missing_replay_file() {
        let path = Path::new("/no/such/replay.json");
        assert!(ReplayMode::new(path, None, GameConfig::default()).is_err());
    }
}
