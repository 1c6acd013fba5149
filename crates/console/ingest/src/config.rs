//! Ingestion configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the async edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Capacity of the frame and snapshot channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Reconnect policy for the live stream
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Health poll interval in seconds
    #[serde(default = "default_health_poll_interval")]
    pub health_poll_interval_secs: u64,
}

impl IngestConfig {
    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_secs(self.health_poll_interval_secs.max(1))
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            backoff: BackoffConfig::default(),
            health_poll_interval_secs: default_health_poll_interval(),
        }
    }
}

/// Backoff configuration for reconnects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Initial backoff delay (milliseconds)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum backoff delay (milliseconds)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Randomize each delay within its upper half
    #[serde(default = "default_jitter")]
    pub jitter: bool,

    /// Retries allowed after consecutive failures; unbounded when unset
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            max_attempts: None,
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

fn default_health_poll_interval() -> u64 {
    5
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}
