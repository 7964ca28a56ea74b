
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effect::CreationPolicy;

/// Represents all possible errors loading a [SessionConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Session settings consumed by [DeviceSession](crate::session::DeviceSession).
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Path to the event device, e.g. /dev/input/event0
    pub device_path: String,
    /// When effect uploads happen for newly created effects
    #[serde(default)]
    pub creation_policy: CreationPolicy,
    /// Seconds an effect may sit unused before the sweep unloads it.
    /// Negative unloads regardless of recency; i64::MAX never unloads.
    #[serde(default = "default_idle_unload_secs")]
    pub idle_unload_secs: i64,
    /// Most raw event records consumed per tick
    #[serde(default = "default_poll_batch")]
    pub poll_batch: usize,
    /// Seconds between idle eviction sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    /// Build a config for the given device with default settings.
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
            creation_policy: CreationPolicy::default(),
            idle_unload_secs: default_idle_unload_secs(),
            poll_batch: default_poll_batch(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }

    /// Load a [SessionConfig] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<SessionConfig, LoadError> {
        let config: SessionConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [SessionConfig] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<SessionConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: SessionConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }
}

fn default_idle_unload_secs() -> i64 {
    10
}

fn default_poll_batch() -> usize {
    32
}

fn default_sweep_interval_secs() -> u64 {
    1
}
