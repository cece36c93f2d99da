//! Model persistence for saving and loading trained value tables
//!
//! A model lives in its own directory under the models root:
//! - `q_table.bin` - the value table (bincode)
//! - `q_table.meta.json` - training metadata as JSON
//!
//! The metadata records which featurizer and game settings the table was
//! trained with, so a loaded table can be checked against the index space it
//! is about to be used with.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::featurizer::{FeaturizerKind, StateFeaturizer};
use super::q_table::QTable;
use super::session::TrainingSession;
use crate::game::{Action, GameConfig};

pub const TABLE_FILE: &str = "q_table.bin";
pub const METADATA_FILE: &str = "q_table.meta.json";

/// Metadata saved with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// State abstraction the table is indexed by
    pub featurizer: FeaturizerKind,

    /// Game settings used during training
    pub game: GameConfig,

    pub state_count: usize,
    pub action_count: usize,

    pub episodes_trained: usize,
    pub training_steps: usize,

    /// Exploration rate when the model was saved, picked up by `--resume`
    pub epsilon: f32,

    /// Crate version that wrote the model
    pub version: String,
}

impl ModelMetadata {
    pub fn new(featurizer: FeaturizerKind, game: GameConfig, session: &TrainingSession) -> Self {
        Self {
            featurizer,
            game,
            state_count: session.q_table().state_count(),
            action_count: session.q_table().action_count(),
            episodes_trained: session.episodes_trained(),
            training_steps: session.training_steps(),
            epsilon: session.epsilon(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Directory holding the model called `name`
pub fn model_dir(models_dir: &Path, name: &str) -> PathBuf {
    models_dir.join(name)
}

pub fn model_exists(dir: &Path) -> bool {
    dir.join(TABLE_FILE).is_file() && dir.join(METADATA_FILE).is_file()
}

/// Save a value table and its metadata into `dir`, creating it if needed
pub fn save_model(dir: &Path, q_table: &QTable, metadata: &ModelMetadata) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;

    let table_path = dir.join(TABLE_FILE);
    let encoded = bincode::serialize(q_table).context("Failed to serialize value table")?;
    std::fs::write(&table_path, encoded)
        .with_context(|| format!("Failed to write value table to {:?}", table_path))?;

    let meta_path = dir.join(METADATA_FILE);
    let meta_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    tracing::debug!(?dir, states = q_table.state_count(), "saved model");
    Ok(())
}

/// Load a value table and its metadata from `dir`
///
/// Fails if the table's shape does not match the index space of the
/// featurizer recorded in the metadata.
pub fn load_model(dir: &Path) -> Result<(QTable, ModelMetadata)> {
    let meta_path = dir.join(METADATA_FILE);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    let table_path = dir.join(TABLE_FILE);
    let bytes = std::fs::read(&table_path)
        .with_context(|| format!("Failed to read value table from {:?}", table_path))?;
    let q_table: QTable = bincode::deserialize(&bytes)
        .with_context(|| format!("Failed to decode value table {:?}", table_path))?;

    if !q_table.is_well_formed() {
        bail!("Value table {:?} is corrupt", table_path);
    }

    let expected = metadata.featurizer.build(&metadata.game).state_count();
    if q_table.state_count() != expected || metadata.state_count != expected {
        bail!(
            "Value table {:?} has {} states but the {} featurizer needs {}",
            table_path,
            q_table.state_count(),
            metadata.featurizer.as_str(),
            expected
        );
    }
    if metadata.action_count != Action::COUNT {
        bail!(
            "Model {:?} was saved with {} actions, expected {}",
            dir,
            metadata.action_count,
            Action::COUNT
        );
    }

    Ok((q_table, metadata))
}
