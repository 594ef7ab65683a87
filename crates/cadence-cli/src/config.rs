//! Layered experiment configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional TOML/JSON/YAML
//! file given with `--config`, then `CADENCE_*` environment variables with
//! `__` between nested keys (`CADENCE_TRAINING__EPOCHS=20`). Command-line
//! flags are applied on top by the caller.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use cadence_core::ColumnSpec;
use cadence_nn::TrainConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Share of events, taken from the end, held out for testing.
    pub test_fraction: f64,
    /// Keep only the most active actors.
    pub top_actors: Option<usize>,
    pub columns: ColumnSpec,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            top_actors: None,
            columns: ColumnSpec::lastfm(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub data: DataConfig,
    pub training: TrainConfig,
}

impl ExperimentConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration")?;
        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}
