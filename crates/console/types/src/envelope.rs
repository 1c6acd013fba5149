//! Artifact-bearing envelopes awaiting a trust decision

use crate::SignalDetail;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Message shown for a halt raised by the governance valve.
pub const GOVERNANCE_HALT_CONTENT: &str = "Trust score below threshold. Awaiting human approval.";

/// Which kind of artifact-bearing signal an envelope wraps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeSignal {
    /// An output produced by an agent
    Artifact,
    /// A blocking request for human adjudication
    GovernanceHalt,
}

impl EnvelopeSignal {
    /// Map a normalized signal type onto an envelope kind.
    pub fn from_signal_type(kind: &str) -> Option<Self> {
        match kind {
            "artifact" => Some(Self::Artifact),
            "governance_halt" => Some(Self::GovernanceHalt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artifact => "artifact",
            Self::GovernanceHalt => "governance_halt",
        }
    }
}

impl std::fmt::Display for EnvelopeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering hint for envelope content
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Markdown,
    Json,
    #[default]
    Text,
    Image,
}

impl ContentType {
    /// Unknown or missing hints fall back to plain text.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::to_ascii_lowercase).as_deref() {
            Some("markdown") => Self::Markdown,
            Some("json") => Self::Json,
            Some("image") => Self::Image,
            _ => Self::Text,
        }
    }
}

/// The deliverable itself
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePayload {
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Verification evidence attached by the producing agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactProof {
    pub method: String,
    #[serde(default)]
    pub logs: String,
    #[serde(default)]
    pub rubric_score: String,
    pub pass: bool,
}

/// An artifact or governance halt as held by the deliverables queue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CtsEnvelope {
    /// Unique within a queue
    pub id: String,
    pub source: String,
    pub signal: EnvelopeSignal,
    pub timestamp: DateTime<Utc>,
    /// In [0, 1] when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<f64>,
    pub payload: EnvelopePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<ArtifactProof>,
}

impl CtsEnvelope {
    /// Create an artifact envelope with plain-text content
    pub fn artifact(
        id: impl Into<String>,
        source: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            signal: EnvelopeSignal::Artifact,
            timestamp: Utc::now(),
            trust_score: None,
            payload: EnvelopePayload {
                content: content.into(),
                content_type: ContentType::Text,
                title: None,
            },
            proof: None,
        }
    }

    /// Create a governance halt for an agent
    pub fn governance_halt(source: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let source = source.into();
        Self {
            id: format!("gov-{}-{}", source, id_timestamp(&timestamp)),
            payload: EnvelopePayload {
                content: GOVERNANCE_HALT_CONTENT.to_string(),
                content_type: ContentType::Text,
                title: Some(format!("Governance Halt: {}", source)),
            },
            source,
            signal: EnvelopeSignal::GovernanceHalt,
            timestamp,
            trust_score: None,
            proof: None,
        }
    }

    /// Attach a trust score; values outside [0, 1] are discarded.
    pub fn with_trust_score(mut self, score: f64) -> Self {
        self.trust_score = valid_trust_score(score);
        self
    }

    pub fn is_governance_halt(&self) -> bool {
        self.signal == EnvelopeSignal::GovernanceHalt
    }

    /// Derive an envelope from a normalized signal.
    ///
    /// Returns `None` unless the signal type is `artifact` or
    /// `governance_halt`. A producer-assigned `id` is kept; otherwise the
    /// id is `{source}-{timestamp}` (artifacts) or `gov-{source}-{timestamp}`.
    pub fn from_signal(detail: &SignalDetail) -> Option<Self> {
        let signal = EnvelopeSignal::from_signal_type(&detail.kind)?;
        let mut envelope = match signal {
            EnvelopeSignal::Artifact => Self {
                id: format!("{}-{}", detail.source, id_timestamp(&detail.timestamp)),
                source: detail.source.clone(),
                signal,
                timestamp: detail.timestamp,
                trust_score: None,
                payload: EnvelopePayload {
                    content: detail.message.clone(),
                    content_type: ContentType::from_hint(detail.payload_str("content_type")),
                    title: detail.payload_str("title").map(str::to_string),
                },
                proof: detail
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("proof"))
                    .and_then(|p| serde_json::from_value(p.clone()).ok()),
            },
            EnvelopeSignal::GovernanceHalt => {
                Self::governance_halt(detail.source.clone(), detail.timestamp)
            }
        };
        if let Some(id) = detail.id.as_ref().filter(|id| !id.trim().is_empty()) {
            envelope.id = id.clone();
        }
        envelope.trust_score = detail.trust_score.and_then(valid_trust_score);
        Some(envelope)
    }
}

/// Accept a trust score only if it is a finite value in [0, 1].
pub fn valid_trust_score(score: f64) -> Option<f64> {
    (score.is_finite() && (0.0..=1.0).contains(&score)).then_some(score)
}

fn id_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
