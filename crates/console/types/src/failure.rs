//! Classification of connectivity failures by message inspection

use serde::{Deserialize, Serialize};

/// Broad cause of a failed call to an external collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Unreachable,
    ServerError,
    Unknown,
}

/// Operator action offered for a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    Retry,
    SwitchToFallback,
    ContinueDegraded,
}

impl FailureKind {
    /// The action suggested first for this kind of failure
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::Timeout | Self::Unknown => Remediation::Retry,
            Self::Unreachable => Remediation::SwitchToFallback,
            Self::ServerError => Remediation::ContinueDegraded,
        }
    }

    /// Every action an operator may choose, recommended one first
    pub fn remediations(&self) -> Vec<Remediation> {
        let first = self.remediation();
        let mut all = vec![first];
        all.extend(
            [
                Remediation::Retry,
                Remediation::SwitchToFallback,
                Remediation::ContinueDegraded,
            ]
            .into_iter()
            .filter(|r| *r != first),
        );
        all
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout => "The service did not respond before the request deadline.",
            Self::Unreachable => "The service is currently unreachable from this client.",
            Self::ServerError => "The service returned an internal error.",
            Self::Unknown => "The request failed unexpectedly. Check system status for runtime health.",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::Unreachable => "unreachable",
            Self::ServerError => "server_error",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Classify an error message. Checks run in priority order: timeout,
/// unreachable, server error.
pub fn classify_failure(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        FailureKind::Timeout
    } else if lower.contains("unreachable")
        || lower.contains("failed to fetch")
        || lower.contains("connection refused")
    {
        FailureKind::Unreachable
    } else if lower.contains("server") || has_5xx_status(&lower) {
        FailureKind::ServerError
    } else {
        FailureKind::Unknown
    }
}

fn has_5xx_status(text: &str) -> bool {
    text.split(|c: char| !c.is_ascii_digit())
        .any(|token| token.len() == 3 && token.starts_with('5'))
}
