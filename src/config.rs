// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Peg Model Simulation Suite - Run Configuration

//! Run configuration: parameters, horizon and price feed selection.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Loading validates before returning.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::params::{ModelParams, ParamError};
use crate::price_feed::{FeedError, PriceFeedConfig};

/// Steps run by the reference script.
pub const DEFAULT_HORIZON: u64 = 99;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Params(#[from] ParamError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub params: ModelParams,
    /// Number of steps to run after the seed step.
    pub horizon: u64,
    pub feed: PriceFeedConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            params: ModelParams::default(),
            horizon: DEFAULT_HORIZON,
            feed: PriceFeedConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        self.feed.validate()?;
        Ok(())
    }
}
