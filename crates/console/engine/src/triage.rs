//! Routing of normalized signals to the feed or the review queue

use console_types::{CtsEnvelope, SignalDetail};
use serde::{Deserialize, Serialize};

use crate::trust_gate::{GateDecision, InterceptReason, TrustGate};

/// Where a signal should go
#[derive(Clone, Debug, PartialEq)]
pub enum TriageRoute {
    /// Not artifact-bearing; show it
    Display,
    /// Artifact trusted enough to show directly
    Bypass(CtsEnvelope),
    /// Held for human review
    Review(CtsEnvelope, InterceptReason),
}

/// What happened to an ingested signal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum TriageOutcome {
    Displayed,
    Bypassed { envelope_id: String },
    Intercepted { envelope_id: String, reason: InterceptReason },
    /// An envelope with this id was already queued
    Duplicate { envelope_id: String },
}

impl TriageOutcome {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Self::Intercepted { .. })
    }
}

/// Decide the route for `signal` using the gate's current threshold.
pub fn route(signal: &SignalDetail, gate: &TrustGate) -> TriageRoute {
    let Some(envelope) = CtsEnvelope::from_signal(signal) else {
        return TriageRoute::Display;
    };
    match gate.evaluate(&envelope) {
        GateDecision::Bypass => TriageRoute::Bypass(envelope),
        GateDecision::Intercept(reason) => TriageRoute::Review(envelope, reason),
    }
}
