//! Configuration loading from TOML files
//!
//! Config file is selected via the --config command line argument; a
//! missing or unparseable file falls back to defaults with a warning.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Walk history file (single JSON document)
    #[serde(default = "default_walks_file")]
    pub walks_file: String,
    /// Pet profiles file
    #[serde(default = "default_pets_file")]
    pub pets_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { walks_file: default_walks_file(), pets_file: default_pets_file() }
    }
}

fn default_walks_file() -> String {
    "data/walks.json".to_string()
}

fn default_pets_file() -> String {
    "data/pets.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Live-stats tick interval while tracking (~1 Hz)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Bound of the engine event queue
    #[serde(default = "default_fix_channel_capacity")]
    pub fix_channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            fix_channel_capacity: default_fix_channel_capacity(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_fix_channel_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// JSONL file of fixes for the replay source
    #[serde(default = "default_replay_file")]
    pub file: String,
    /// Delay between replayed fixes (target ~1 fix / 2 s)
    #[serde(default = "default_replay_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { file: default_replay_file(), interval_ms: default_replay_interval_ms() }
    }
}

fn default_replay_file() -> String {
    "data/walk_replay.jsonl".to_string()
}

fn default_replay_interval_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { interval_secs: default_metrics_interval_secs() }
    }
}

fn default_metrics_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    walks_file: String,
    pets_file: String,
    tick_interval_ms: u64,
    fix_channel_capacity: usize,
    replay_file: String,
    replay_interval_ms: u64,
    metrics_interval_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            walks_file: default_walks_file(),
            pets_file: default_pets_file(),
            tick_interval_ms: default_tick_interval_ms(),
            fix_channel_capacity: default_fix_channel_capacity(),
            replay_file: default_replay_file(),
            replay_interval_ms: default_replay_interval_ms(),
            metrics_interval_secs: default_metrics_interval_secs(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            walks_file: toml_config.store.walks_file,
            pets_file: toml_config.store.pets_file,
            tick_interval_ms: toml_config.session.tick_interval_ms,
            fix_channel_capacity: toml_config.session.fix_channel_capacity,
            replay_file: toml_config.replay.file,
            replay_interval_ms: toml_config.replay.interval_ms,
            metrics_interval_secs: toml_config.metrics.interval_secs,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn walks_file(&self) -> &str {
        &self.walks_file
    }

    pub fn pets_file(&self) -> &str {
        &self.pets_file
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    pub fn fix_channel_capacity(&self) -> usize {
        self.fix_channel_capacity
    }

    pub fn replay_file(&self) -> &str {
        &self.replay_file
    }

    pub fn replay_interval_ms(&self) -> u64 {
        self.replay_interval_ms
    }

    pub fn metrics_interval_secs(&self) -> u64 {
        self.metrics_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the tick interval
    #[cfg(test)]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }
}
