//! Training mode for the Q-learning agent
//!
//! Runs exploring episodes against fresh games, learns from every move,
//! logs progress and periodically checkpoints the model to its directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use qsnake::modes::{TrainConfig, TrainMode};
//! use qsnake::render::NullPresenter;
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(10000, PathBuf::from("models/snake"));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run(&mut NullPresenter)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::game::{GameConfig, SnakeGame};
use crate::metrics::TrainingStats;
use crate::render::Presenter;
use crate::rl::{
    EpisodeDriver, FeaturizerKind, ModelMetadata, QLearningConfig, StateFeaturizer,
    TrainingSession, load_model, model_exists, save_model,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Directory the model is saved to
    pub model_dir: PathBuf,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// State abstraction for a new model (a resumed model keeps its own)
    pub featurizer: FeaturizerKind,

    /// Game configuration for a new model (a resumed model keeps its own)
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub learning: QLearningConfig,

    /// Continue from the model already in `model_dir`
    pub resume: bool,

    /// Seed for exploration and game layouts
    pub seed: Option<u64>,

    /// Print the header and periodic progress to stdout (off while a TUI is up)
    pub verbose: bool,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// ```rust
    /// use qsnake::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(10000, PathBuf::from("models/snake"));
    /// assert_eq!(config.checkpoint_frequency, 1000);
    /// ```
    pub fn new(num_episodes: usize, model_dir: PathBuf) -> Self {
        Self {
            num_episodes,
            model_dir,
            checkpoint_frequency: 1000,
            log_frequency: 100,
            featurizer: FeaturizerKind::default(),
            game_config: GameConfig::default(),
            learning: QLearningConfig::default(),
            resume: false,
            seed: None,
            verbose: true,
        }
    }
}

/// Training mode for the Q-learning agent
pub struct TrainMode {
    config: TrainConfig,
    featurizer_kind: FeaturizerKind,
    game_config: GameConfig,
    featurizer: Box<dyn StateFeaturizer>,
    session: TrainingSession,
    stats: TrainingStats,
    rng: StdRng,
}

impl TrainMode {
    /// Set up a fresh session, or pick up the saved one when resuming
    pub fn new(config: TrainConfig) -> Result<Self> {
        config
            .learning
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid learning configuration")?;

        let (featurizer_kind, game_config, session) =
            if config.resume && model_exists(&config.model_dir) {
                let (q_table, metadata) = load_model(&config.model_dir).with_context(|| {
                    format!("Failed to load model to resume from {:?}", config.model_dir)
                })?;
                info!(
                    episodes = metadata.episodes_trained,
                    epsilon = metadata.epsilon,
                    "resuming training"
                );
                let session = TrainingSession::resume(
                    config.learning.clone(),
                    q_table,
                    metadata.epsilon,
                    metadata.episodes_trained,
                    metadata.training_steps,
                );
                (metadata.featurizer, metadata.game, session)
            } else {
                if config.resume {
                    warn!(dir = ?config.model_dir, "no model to resume, starting fresh");
                }
                config
                    .game_config
                    .validate()
                    .map_err(anyhow::Error::msg)
                    .context("Invalid game configuration")?;
                let states = config.featurizer.build(&config.game_config).state_count();
                let session = TrainingSession::new(config.learning.clone(), states);
                (config.featurizer, config.game_config.clone(), session)
            };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            featurizer: featurizer_kind.build(&game_config),
            featurizer_kind,
            game_config,
            session,
            stats: TrainingStats::new(100),
            rng,
            config,
        })
    }

    /// Game settings in use; a resumed model keeps the ones it was trained on
    pub fn game_config(&self) -> &GameConfig {
        &self.game_config
    }

    pub fn session(&self) -> &TrainingSession {
        &self.session
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Run the training loop
    ///
    /// Stops early, saving what was learned so far, if the presenter quits.
    pub fn run(&mut self, presenter: &mut dyn Presenter) -> Result<()> {
        if self.config.verbose {
            self.print_header();
        }

        let driver = EpisodeDriver::new(self.featurizer.as_ref(), self.config.learning.max_moves);
        let first_episode = self.session.episodes_trained();

        for episode in 1..=self.config.num_episodes {
            let game = SnakeGame::new(
                self.game_config.clone(),
                StdRng::seed_from_u64(self.rng.r#gen()),
            )?;
            let title = format!(
                "Training {}/{} (ε {:.3})",
                episode,
                self.config.num_episodes,
                self.session.epsilon()
            );

            let report = driver.train(game, &mut self.session, &mut self.rng, presenter, &title)?;
            if report.interrupted() {
                info!(episodes = episode - 1, "training interrupted");
                break;
            }

            self.stats
                .record_episode(report.reward, report.moves, report.score);
            info!(
                episode = first_episode + episode,
                score = report.score,
                moves = report.moves,
                epsilon = self.session.epsilon(),
                "episode finished"
            );

            if self.config.verbose && episode % self.config.log_frequency == 0 {
                println!(
                    "[Episode {}/{}] {} | ε: {:.3}",
                    episode,
                    self.config.num_episodes,
                    self.stats.format_summary(),
                    self.session.epsilon()
                );
            }

            if episode % self.config.checkpoint_frequency == 0 {
                self.save()?;
                info!(episode, dir = ?self.config.model_dir, "checkpoint saved");
            }
        }

        self.save()?;
        presenter.quit()?;

        println!("\nTraining complete!");
        println!("Model saved to: {:?}", self.config.model_dir);
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());
        println!("{}", self.session.q_table().coverage().format_summary());

        Ok(())
    }

    fn save(&self) -> Result<()> {
        let metadata =
            ModelMetadata::new(self.featurizer_kind, self.game_config.clone(), &self.session);
        save_model(&self.config.model_dir, self.session.q_table(), &metadata)
            .with_context(|| format!("Failed to save model to {:?}", self.config.model_dir))
    }

    fn print_header(&self) {
        let rule = "=".repeat(70);
        let learning = &self.config.learning;
        println!("{rule}");
        println!("Q-Learning Training - Snake");
        println!("{rule}");
        println!("Episodes: {}", self.config.num_episodes);
        println!(
            "Game Config: {0}x{0} board, {1} green / {2} red apples",
            self.game_config.board_size, self.game_config.green_apples, self.game_config.red_apples
        );
        println!(
            "Featurizer: {} ({} states)",
            self.featurizer_kind.as_str(),
            self.featurizer.state_count()
        );
        println!("Learning Config:");
        println!("  Alpha: {}", learning.alpha);
        println!("  Gamma: {}", learning.gamma);
        println!(
            "  Epsilon: {} (decay {}, floor {})",
            self.session.epsilon(),
            learning.epsilon_decay,
            learning.epsilon_min
        );
        println!("  Move cap: {}", learning.max_moves);
        if self.session.episodes_trained() > 0 {
            println!(
                "Resuming after {} episodes",
                self.session.episodes_trained()
            );
        }
        println!("Checkpoints: Every {} episodes", self.config.checkpoint_frequency);
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Model directory: {:?}", self.config.model_dir);
        println!("{rule}");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullPresenter;
    use tempfile::TempDir;

    fn quick_config(dir: PathBuf, episodes: usize) -> TrainConfig {
        let mut config = TrainConfig::new(episodes, dir);
        config.seed = Some(5);
        config.learning.max_moves = 200;
        config.log_frequency = 10;
        config.checkpoint_frequency = 10;
        config
    }

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(1000, PathBuf::from("models/test"));
        assert_eq!(config.num_episodes, 1000);
        assert_eq!(config.featurizer, FeaturizerKind::LineOfSight);
        assert!(!config.resume);
    }

    #[test]
    fn test_training_saves_model() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("snake");

        let mut mode = TrainMode::new(quick_config(dir.clone(), 20)).unwrap();
        mode.run(&mut NullPresenter).unwrap();

        assert_eq!(mode.session().episodes_trained(), 20);
        assert_eq!(mode.stats().total_episodes(), 20);
        assert!(model_exists(&dir));

        let (table, metadata) = load_model(&dir).unwrap();
        assert_eq!(metadata.episodes_trained, 20);
        assert_eq!(&table, mode.session().q_table());
        assert!(table.coverage().visited_states > 0);
    }

    #[test]
    fn test_resume_keeps_counters() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("snake");

        TrainMode::new(quick_config(dir.clone(), 10))
            .unwrap()
            .run(&mut NullPresenter)
            .unwrap();
        let (_, first) = load_model(&dir).unwrap();

        let mut config = quick_config(dir.clone(), 10);
        config.resume = true;
        config.featurizer = FeaturizerKind::Danger;
        let mut mode = TrainMode::new(config).unwrap();
        mode.run(&mut NullPresenter).unwrap();

        let (_, second) = load_model(&dir).unwrap();
        assert_eq!(second.episodes_trained, 20);
        assert!(second.training_steps > first.training_steps);
        assert!(second.epsilon < first.epsilon);
        // The saved featurizer wins over the requested one
        assert_eq!(second.featurizer, FeaturizerKind::LineOfSight);
    }

    #[test]
    fn test_resume_without_model_starts_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("missing");

        let mut config = quick_config(dir.clone(), 5);
        config.resume = true;
        config.featurizer = FeaturizerKind::Danger;
        let mut mode = TrainMode::new(config).unwrap();
        assert_eq!(mode.session().episodes_trained(), 0);
        assert_eq!(mode.session().epsilon(), 1.0);
        assert_eq!(mode.session().q_table().state_count(), 8);

        mode.run(&mut NullPresenter).unwrap();
        let (_, metadata) = load_model(&dir).unwrap();
        assert_eq!(metadata.episodes_trained, 5);
        assert_eq!(metadata.featurizer, FeaturizerKind::Danger);
    }

    #[test]
    fn test_invalid_learning_config() {
        let mut config = TrainConfig::new(1, PathBuf::from("unused"));
        config.learning.alpha = 0.0;
        assert!(TrainMode::new(config).is_err());
    }
}
