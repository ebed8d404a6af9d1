use crate::errors::ConfigError;
use crate::visibility::LayoutRules;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "vitae.config.json";

/// Edit session tuning, loaded from `vitae.config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Quiet period after the last edit before a debounced save
    pub debounce_ms: u64,

    /// Tick interval of the periodic backstop save
    pub periodic_interval_ms: u64,

    /// Minimum time since the last successful save before a periodic tick
    /// may save. Kept slightly below the interval so tick jitter does not
    /// skip a save.
    pub periodic_threshold_ms: u64,

    /// Undo levels kept for the section order (0 = unlimited)
    pub history_limit: usize,

    pub layout: LayoutRules,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1_000,
            periodic_interval_ms: 15_000,
            periodic_threshold_ms: 14_000,
            history_limit: 50,
            layout: LayoutRules::default(),
        }
    }
}

impl SessionConfig {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounceMs must be positive".into()));
        }
        if self.periodic_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "periodicIntervalMs must be positive".into(),
            ));
        }
        if self.periodic_threshold_ms >= self.periodic_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "periodicThresholdMs ({}) must be below periodicIntervalMs ({})",
                self.periodic_threshold_ms, self.periodic_interval_ms
            )));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn periodic_interval(&self) -> Duration {
        Duration::from_millis(self.periodic_interval_ms)
    }

    pub fn periodic_threshold(&self) -> Duration {
        Duration::from_millis(self.periodic_threshold_ms)
    }
}
