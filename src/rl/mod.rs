//! Tabular Q-learning for Snake
//!
//! Provides:
//! - State featurizers mapping a snapshot to a value-table row
//! - The value table and its one-step TD update
//! - Training sessions carrying epsilon and counters between episodes
//! - The episode driver for training and greedy evaluation
//! - Model persistence

pub mod config;
pub mod driver;
pub mod featurizer;
pub mod persistence;
pub mod q_table;
pub mod session;

pub use config::{QLearningConfig, RewardConfig};
pub use driver::{EpisodeDriver, EpisodeEnd, EpisodeReport, format_action_values};
pub use featurizer::{
    DangerFeaturizer, FeaturizerKind, HeadPositionFeaturizer, LineOfSightFeaturizer,
    StateFeaturizer,
};
pub use persistence::{ModelMetadata, load_model, model_dir, model_exists, save_model};
pub use q_table::{Coverage, QTable};
pub use session::TrainingSession;
