//! Replay files: a game's history as a JSON array of snapshots, oldest first

use anyhow::{Context, Result};
use std::path::Path;

use super::state::Snapshot;

/// Write a recorded game to `path`, creating parent directories if needed
pub fn save_history(history: &[Snapshot], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let json = serde_json::to_string(history).context("Failed to serialize game history")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write replay to {:?}", path))?;

    tracing::debug!(?path, ticks = history.len(), "saved replay");
    Ok(())
}

/// Load a recorded game from `path`
pub fn load_history(path: &Path) -> Result<Vec<Snapshot>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay from {:?}", path))?;
    let history: Vec<Snapshot> =
        serde_json::from_str(&json).with_context(|| format!("Malformed replay file {:?}", path))?;

    if history.is_empty() {
        anyhow::bail!("Replay file {:?} contains no ticks", path);
    }

    Ok(history)
}
