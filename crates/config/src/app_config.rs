// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path};
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_NAME: &str = "tally.config.yaml";
pub const ENV_PREFIX: &str = "TALLY_";

/// Which attestation backend signs off on results
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum AttestationBackend {
    /// Keccak-256 commitment over the canonical statement
    #[default]
    HashCommitment,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct TimelineConfig {
    /// Bucket width in milliseconds, one hour by default
    pub window_millis: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            window_millis: 3_600_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    /// Split large batches over the rayon pool
    pub parallel: bool,
    /// Votes per partition when running in parallel
    pub batch_size: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            batch_size: 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum cached results per kind. Unbounded when absent.
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub timeline: TimelineConfig,
    pub aggregation: AggregationConfig,
    pub attestation: AttestationBackend,
    pub cache: CacheConfig,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// The file this configuration was read from, if any
    pub config_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            aggregation: AggregationConfig::default(),
            attestation: AttestationBackend::default(),
            cache: CacheConfig::default(),
            log_level: "info".to_string(),
            config_file: None,
        }
    }
}

impl PipelineConfig {
    pub fn window_millis(&self) -> u64 {
        self.timeline.window_millis
    }

    pub fn batch_size(&self) -> usize {
        self.aggregation.batch_size
    }

    pub fn parallel(&self) -> bool {
        self.aggregation.parallel
    }

    pub fn cache_capacity(&self) -> Option<usize> {
        self.cache.capacity
    }
}

/// Value struct for recording where the configuration came from
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
struct LoadOverrides {
    pub config_file: Option<PathBuf>,
}

/// Load defaults, then the config file (explicit or found from the cwd upwards),
/// then `TALLY_` environment variables. Nested keys use `__`, for example
/// `TALLY_TIMELINE__WINDOW_MILLIS=60000`.
pub fn load_config(config_file: Option<PathBuf>) -> Result<PipelineConfig> {
    let explicit = config_file.is_some();
    let resolved = resolve_config_path(find_in_parent, env::current_dir()?, DEFAULT_CONFIG_NAME, config_file);

    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));
    let mut loaded_from = None;
    match resolved {
        Some(path) if path.exists() => {
            info!("Loading configuration from {:?}", path);
            figment = figment.merge(Yaml::file(&path));
            loaded_from = Some(path);
        }
        Some(path) if explicit => bail!("Configuration file not found at {:?}", path),
        _ => info!("No configuration file found, using defaults"),
    }

    let config: PipelineConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(LoadOverrides {
            config_file: loaded_from,
        }))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()?;
    Ok(config)
}
