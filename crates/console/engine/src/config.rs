//! Configuration for the console engine

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum trust score for an artifact to bypass review
    #[serde(default = "default_trust_threshold")]
    pub trust_threshold: f64,

    /// Maximum number of signals kept in the activity feed
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,

    /// Buffer size of the console event broadcast channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trust_threshold: default_trust_threshold(),
            feed_capacity: default_feed_capacity(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_trust_threshold() -> f64 {
    0.8
}

fn default_feed_capacity() -> usize {
    100
}

fn default_event_capacity() -> usize {
    1024
}
