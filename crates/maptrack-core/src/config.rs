//! Tracker configuration.

use crate::error::ConfigError;
use crate::overlay::{OverlayLayers, ViewOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default delay between polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Polling and presentation settings.
///
/// Every field has a default, so a partial (or empty) JSON object is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Delay between polls, in milliseconds
    pub poll_interval_ms: u64,
    /// Overlay options
    pub view: ViewOptions,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            view: ViewOptions::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Set the poll interval.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the trail length (0 draws the whole log).
    pub fn history_len(mut self, len: usize) -> Self {
        self.view.history_len = len;
        self
    }

    /// Set the enabled overlay layers.
    pub fn layers(mut self, layers: OverlayLayers) -> Self {
        self.view.layers = layers;
        self
    }
}
