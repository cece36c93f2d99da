//! Evaluation mode: play a trained model greedily and report how it does

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::info;

use crate::game::{GameConfig, SnakeGame, save_history};
use crate::metrics::TrainingStats;
use crate::render::Presenter;
use crate::rl::{EpisodeDriver, EpisodeEnd, ModelMetadata, QLearningConfig, QTable, load_model};

#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub model_dir: PathBuf,
    pub games: usize,
    /// Where each game's history is written, if anywhere
    pub replay_dir: Option<PathBuf>,
    pub learning: QLearningConfig,
    pub seed: Option<u64>,
}

impl EvaluateConfig {
    pub fn new(model_dir: PathBuf, games: usize) -> Self {
        Self {
            model_dir,
            games,
            replay_dir: None,
            learning: QLearningConfig::default(),
            seed: None,
        }
    }
}

pub struct EvaluateMode {
    config: EvaluateConfig,
    q_table: QTable,
    metadata: ModelMetadata,
    stats: TrainingStats,
    rng: StdRng,
}

impl EvaluateMode {
    pub fn new(config: EvaluateConfig) -> Result<Self> {
        let (q_table, metadata) = load_model(&config.model_dir)
            .with_context(|| format!("Failed to load model from {:?}", config.model_dir))?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            stats: TrainingStats::new(config.games.max(1)),
            config,
            q_table,
            metadata,
            rng,
        })
    }

    /// Game settings the model was trained on
    pub fn game_config(&self) -> &GameConfig {
        &self.metadata.game
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Play every game, printing one line per game and a summary at the end
    pub fn run(&mut self, presenter: &mut dyn Presenter) -> Result<()> {
        if let Some(dir) = &self.config.replay_dir {
            if dir.exists() {
                std::fs::remove_dir_all(dir)
                    .with_context(|| format!("Failed to clear replay directory {:?}", dir))?;
            }
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create replay directory {:?}", dir))?;
        }

        let featurizer = self.metadata.featurizer.build(&self.metadata.game);
        let driver = EpisodeDriver::new(featurizer.as_ref(), self.config.learning.max_moves);
        let mut results = Vec::with_capacity(self.config.games);

        for game_index in 0..self.config.games {
            let game = SnakeGame::new(
                self.metadata.game.clone(),
                StdRng::seed_from_u64(self.rng.r#gen()),
            )?;
            let title = format!("Test game {}/{}", game_index + 1, self.config.games);
            let report = driver.evaluate(
                game,
                &self.q_table,
                &self.config.learning.rewards,
                presenter,
                &title,
            )?;
            if report.interrupted() {
                break;
            }

            if let Some(dir) = &self.config.replay_dir {
                save_history(&report.history, &dir.join(format!("game_{game_index}.json")))?;
            }

            let ending = match report.end {
                EpisodeEnd::GameOver(outcome) => outcome.as_str(),
                EpisodeEnd::MoveCap => "move cap",
                EpisodeEnd::Quit => "quit",
            };
            info!(
                game = game_index,
                score = report.score,
                moves = report.moves,
                ending,
                "game finished"
            );
            results.push(format!(
                "Game {}: score {}, length {}, {} moves, ended by {}",
                game_index + 1,
                report.score,
                report.length,
                report.moves,
                ending
            ));
            self.stats
                .record_episode(report.reward, report.moves, report.score);
        }

        presenter.quit()?;

        for line in &results {
            println!("{line}");
        }
        println!();
        println!(
            "Average score over {} games: {:.2}",
            self.stats.total_episodes(),
            self.stats.mean_episode_score()
        );
        println!("{}", self.stats.format_summary());
        println!("{}", self.q_table.coverage().format_summary());
        if let Some(dir) = &self.config.replay_dir {
            println!("Replays saved to {:?}", dir);
        }

        Ok(())
    }
}
