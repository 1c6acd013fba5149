//! Governance decisions and approval requests

use crate::{EnvelopeSignal, MissionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operator verdict on an intercepted deliverable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceDecision {
    Approve,
    Deny,
    /// Let the mission proceed without the halted agent's output
    ContinueWithout,
}

impl std::fmt::Display for GovernanceDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Approve => "approve",
            Self::Deny => "deny",
            Self::ContinueWithout => "continue_without",
        };
        f.write_str(s)
    }
}

/// How a queued envelope left the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "decision")]
pub enum Resolution {
    /// Plain artifact dismissed after review
    Acknowledged,
    Decided(GovernanceDecision),
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acknowledged => f.write_str("acknowledged"),
            Self::Decided(decision) => write!(f, "{}", decision),
        }
    }
}

/// Audit entry written whenever an envelope is resolved
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub envelope_id: String,
    pub source: String,
    pub signal: EnvelopeSignal,
    pub resolution: Resolution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// A launch that waits for human approval instead of starting immediately
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: String,
    pub mission_id: MissionId,
    pub objective: String,
    pub profile_id: String,
    pub routes: Vec<String>,
    pub requested_at: DateTime<Utc>,
    /// Readiness was bypassed with an operator override
    #[serde(default)]
    pub forced: bool,
    /// Blockers outstanding when the request was made
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
}

impl ApprovalRequest {
    pub fn new(
        mission_id: MissionId,
        objective: impl Into<String>,
        profile_id: impl Into<String>,
        routes: Vec<String>,
    ) -> Self {
        Self {
            id: format!("approval-{}", mission_id),
            mission_id,
            objective: objective.into(),
            profile_id: profile_id.into(),
            routes,
            requested_at: Utc::now(),
            forced: false,
            blockers: Vec::new(),
        }
    }
}
