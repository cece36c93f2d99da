//! Settings file for a run, loaded with `--config FILE`
//!
//! ```json
//! {
//!   "game": { "board_size": 12, "red_apples": 2 },
//!   "learning": { "alpha": 0.2, "rewards": { "death": -100 } }
//! }
//! ```
//!
//! Every field is optional and falls back to its default.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::game::GameConfig;
use crate::rl::QLearningConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub game: GameConfig,
    pub learning: QLearningConfig,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: RunConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed config file {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid settings in {:?}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.game.validate().map_err(|e| anyhow!(e))?;
        self.learning.validate().map_err(|e| anyhow!(e))?;
        Ok(())
    }
}
