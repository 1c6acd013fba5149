//! State of the live ingestion connection

use serde::{Deserialize, Serialize};

use crate::FailureKind;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    /// Connection lost; last-known state is still served while retrying
    Degraded {
        attempt: u32,
        failure: FailureKind,
        retry_in_ms: u64,
    },
    /// Retries exhausted
    Failed { failure: FailureKind },
    /// Shut down on request
    Closed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. } | Self::Failed { .. })
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Degraded { attempt, .. } => write!(f, "degraded (attempt {})", attempt),
            Self::Failed { failure } => write!(f, "failed ({})", failure),
            Self::Closed => f.write_str("closed"),
        }
    }
}
