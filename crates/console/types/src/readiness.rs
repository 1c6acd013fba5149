//! Readiness of the subsystems a mission launch depends on

use serde::{Deserialize, Serialize};

/// A dependency whose readiness gates a launch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    Provider,
    Mcp,
    Governance,
    Nats,
    Sse,
    Database,
}

impl Subsystem {
    pub const ALL: [Subsystem; 6] = [
        Subsystem::Provider,
        Subsystem::Mcp,
        Subsystem::Governance,
        Subsystem::Nats,
        Subsystem::Sse,
        Subsystem::Database,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Provider => "Provider profile",
            Self::Mcp => "MCP capability",
            Self::Governance => "Governance mode",
            Self::Nats => "NATS bus",
            Self::Sse => "SSE stream",
            Self::Database => "Database",
        }
    }

    /// Operator-facing reason used when this subsystem is not ready
    pub fn blocker_label(&self) -> &'static str {
        match self {
            Self::Provider => "No provider profile or active brain detected",
            Self::Mcp => "No MCP server is connected",
            Self::Governance => "Governance mode is strict",
            Self::Nats => "NATS transport is unavailable",
            Self::Sse => "SSE stream is disconnected",
            Self::Database => "Database status is offline",
        }
    }

    /// Lowercase words that identify this subsystem inside a free-text blocker
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Provider => &["provider", "brain"],
            Self::Mcp => &["mcp"],
            Self::Governance => &["governance"],
            Self::Nats => &["nats", "message bus"],
            Self::Sse => &["sse", "stream"],
            Self::Database => &["database", "postgres", "db"],
        }
    }

    /// Whether a blocker text names this subsystem and no other.
    pub fn is_named_by(&self, blocker: &str) -> bool {
        Self::named_in(blocker) == Some(*self)
    }

    /// The single subsystem a blocker text names. Text that mentions
    /// several subsystems, or none, names nothing.
    pub fn named_in(blocker: &str) -> Option<Subsystem> {
        let lower = blocker.to_lowercase();
        let mut named = Self::ALL
            .into_iter()
            .filter(|s| s.keywords().iter().any(|kw| contains_word(&lower, kw)));
        match (named.next(), named.next()) {
            (Some(subsystem), None) => Some(subsystem),
            _ => None,
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Point-in-time go/no-go report across all launch dependencies
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessSnapshot {
    pub provider_ready: bool,
    pub mcp_ready: bool,
    pub governance_ready: bool,
    pub nats_ready: bool,
    pub sse_ready: bool,
    pub db_ready: bool,
    #[serde(default)]
    pub blockers: Vec<String>,
}

impl ReadinessSnapshot {
    /// Snapshot with every flag set and no blockers
    pub fn all_ready() -> Self {
        Self {
            provider_ready: true,
            mcp_ready: true,
            governance_ready: true,
            nats_ready: true,
            sse_ready: true,
            db_ready: true,
            blockers: Vec::new(),
        }
    }

    pub fn is_ready(&self, subsystem: Subsystem) -> bool {
        match subsystem {
            Subsystem::Provider => self.provider_ready,
            Subsystem::Mcp => self.mcp_ready,
            Subsystem::Governance => self.governance_ready,
            Subsystem::Nats => self.nats_ready,
            Subsystem::Sse => self.sse_ready,
            Subsystem::Database => self.db_ready,
        }
    }

    pub fn set_ready(&mut self, subsystem: Subsystem, ready: bool) {
        let flag = match subsystem {
            Subsystem::Provider => &mut self.provider_ready,
            Subsystem::Mcp => &mut self.mcp_ready,
            Subsystem::Governance => &mut self.governance_ready,
            Subsystem::Nats => &mut self.nats_ready,
            Subsystem::Sse => &mut self.sse_ready,
            Subsystem::Database => &mut self.db_ready,
        };
        *flag = ready;
    }

    pub fn with_ready(mut self, subsystem: Subsystem, ready: bool) -> Self {
        self.set_ready(subsystem, ready);
        self
    }

    pub fn with_blocker(mut self, blocker: impl Into<String>) -> Self {
        self.blockers.push(blocker.into());
        self
    }

    /// Subsystems whose flag is false, in canonical order
    pub fn failing(&self) -> Vec<Subsystem> {
        Subsystem::ALL
            .into_iter()
            .filter(|s| !self.is_ready(*s))
            .collect()
    }
}

/// Result of a single subsystem probe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemStatus {
    pub subsystem: Subsystem,
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SubsystemStatus {
    pub fn ready(subsystem: Subsystem) -> Self {
        Self {
            subsystem,
            ready: true,
            detail: None,
        }
    }

    pub fn not_ready(subsystem: Subsystem, detail: impl Into<String>) -> Self {
        Self {
            subsystem,
            ready: false,
            detail: Some(detail.into()),
        }
    }
}

/// Aggregated go/no-go with every reason for "no"
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub blockers: Vec<String>,
}
