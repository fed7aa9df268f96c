//! Bridge configuration with validation.

use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use shared_types::Priority;
use std::time::Duration;

/// Upper bound on `retry.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 100;

/// Upper bound on `retry.delay_ms`.
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Main bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Default load priorities, used when a request does not set one
    pub priorities: PriorityConfig,
    /// Parameters of the stock retry policy
    pub retry: RetryConfig,
}

impl BridgeConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, TaskError> {
        let config: Self =
            toml::from_str(source).map_err(|e| TaskError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.retry.max_retries > MAX_RETRIES_LIMIT {
            return Err(TaskError::InvalidConfig(format!(
                "retry.max_retries {} exceeds {}",
                self.retry.max_retries, MAX_RETRIES_LIMIT
            )));
        }

        if self.retry.delay_ms > MAX_RETRY_DELAY_MS {
            return Err(TaskError::InvalidConfig(format!(
                "retry.delay_ms {} exceeds {}",
                self.retry.delay_ms, MAX_RETRY_DELAY_MS
            )));
        }

        Ok(())
    }
}

/// Default asset priorities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    pub entity_asset: Priority,
    pub scene_asset: Priority,
    pub data_table: Priority,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            entity_asset: 80,
            scene_asset: 0,
            data_table: 0,
        }
    }
}

/// Stock retry policy parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Pause before each retry
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 500,
        }
    }
}
