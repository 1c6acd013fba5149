//! Signal normalizer: maps both wire shapes onto [`SignalDetail`]
//!
//! Normalization is total. Missing or malformed fields fall back to
//! defaults and never produce an error.

use chrono::{DateTime, Utc};
use console_types::{valid_trust_score, RawSignal, SignalDetail};
use serde_json::Value;

/// Type assigned when a frame carries neither `type` nor `intent`.
pub const UNKNOWN_SIGNAL_TYPE: &str = "unknown";

/// Source assigned when a frame does not name one.
pub const DEFAULT_SOURCE: &str = "system";

/// Stateless mapper from [`RawSignal`] to [`SignalDetail`]
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalNormalizer;

impl SignalNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize using the current time as the fallback timestamp.
    pub fn normalize(&self, raw: RawSignal) -> SignalDetail {
        self.normalize_at(raw, Utc::now())
    }

    /// Parse and normalize a text frame.
    pub fn normalize_frame(&self, frame: &str) -> SignalDetail {
        self.normalize(RawSignal::parse_frame(frame))
    }

    /// Normalize with an explicit fallback timestamp.
    pub fn normalize_at(&self, raw: RawSignal, now: DateTime<Utc>) -> SignalDetail {
        let timestamp = raw.parsed_timestamp().unwrap_or(now);
        let trust_score = lift_trust_score(&raw);

        let RawSignal {
            kind,
            intent,
            source,
            level,
            message,
            content,
            payload,
            topic,
            id,
            trace_id,
            context,
            ..
        } = raw;

        let intent = non_blank(intent);
        let kind = non_blank(kind)
            .map(|k| k.trim().to_string())
            .or_else(|| intent.as_ref().map(|i| i.trim().to_string()))
            .unwrap_or_else(|| UNKNOWN_SIGNAL_TYPE.to_string());
        let source = non_blank(source)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        let message = non_blank(message)
            .or_else(|| non_blank(content))
            .unwrap_or_else(|| payload_text(payload.as_ref()));

        SignalDetail {
            kind,
            source,
            level: non_blank(level),
            message,
            timestamp,
            topic: non_blank(topic),
            payload,
            id: non_blank(id),
            trace_id: non_blank(trace_id),
            intent,
            context,
            trust_score,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn payload_text(payload: Option<&Value>) -> String {
    match payload {
        Some(value) => value.to_string(),
        None => "{}".to_string(),
    }
}

/// `payload.trust_score` wins when it is numeric; otherwise the top-level
/// field is used. Out-of-range scores are dropped.
fn lift_trust_score(raw: &RawSignal) -> Option<f64> {
    let nested = raw
        .payload
        .as_ref()
        .and_then(|p| p.get("trust_score"))
        .and_then(Value::as_f64);
    match nested {
        Some(score) => valid_trust_score(score),
        None => raw
            .trust_score
            .as_ref()
            .and_then(Value::as_f64)
            .and_then(valid_trust_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_frame_gets_defaults() {
        let detail = SignalNormalizer.normalize_at(RawSignal::new(), fixed_now());
        assert_eq!(detail.kind, UNKNOWN_SIGNAL_TYPE);
        assert_eq!(detail.source, DEFAULT_SOURCE);
        assert_eq!(detail.message, "{}");
        assert_eq!(detail.timestamp, fixed_now());
        assert!(detail.trust_score.is_none());
    }

    #[test]
    fn test_stream_shape() {
        let raw = RawSignal::from_value(json!({
            "type": "artifact",
            "source": "coder",
            "payload": {"trust_score": 0.92, "diff": "+1"},
            "topic": "swarm.team.delivery.out"
        }));
        let detail = SignalNormalizer.normalize_at(raw, fixed_now());
        assert_eq!(detail.kind, "artifact");
        assert_eq!(detail.trust_score, Some(0.92));
        assert_eq!(detail.topic.as_deref(), Some("swarm.team.delivery.out"));
        assert!(detail.message.contains("diff"));
    }

    #[test]
    fn test_log_shape_uses_intent() {
        let raw = RawSignal::from_value(json!({
            "id": "log-7",
            "trace_id": "trace-1",
            "timestamp": "2025-01-01T00:00:00Z",
            "level": "warn",
            "source": "overseer",
            "intent": "budget_check",
            "message": "budget at 90%",
            "context": {"mission": "m-1"}
        }));
        let detail = SignalNormalizer.normalize_at(raw, fixed_now());
        assert_eq!(detail.kind, "budget_check");
        assert_eq!(detail.intent.as_deref(), Some("budget_check"));
        assert_eq!(detail.level.as_deref(), Some("warn"));
        assert_eq!(detail.message, "budget at 90%");
        assert_ne!(detail.timestamp, fixed_now());
    }

    #[test]
    fn test_content_fallback_and_blank_fields() {
        let raw = RawSignal::from_value(json!({
            "type": "  ",
            "source": "",
            "message": "   ",
            "content": "from content"
        }));
        let detail = SignalNormalizer.normalize_at(raw, fixed_now());
        assert_eq!(detail.kind, UNKNOWN_SIGNAL_TYPE);
        assert_eq!(detail.source, DEFAULT_SOURCE);
        assert_eq!(detail.message, "from content");
    }

    #[test]
    fn test_trust_score_precedence() {
        let raw = RawSignal::from_value(json!({"trust_score": 0.2, "payload": {"trust_score": 0.9}}));
        assert_eq!(SignalNormalizer.normalize(raw).trust_score, Some(0.9));

        let raw = RawSignal::from_value(json!({"trust_score": 0.2, "payload": {"trust_score": "high"}}));
        assert_eq!(SignalNormalizer.normalize(raw).trust_score, Some(0.2));

        let raw = RawSignal::from_value(json!({"payload": {"trust_score": 7}}));
        assert!(SignalNormalizer.normalize(raw).trust_score.is_none());
    }

    #[test]
    fn test_garbage_frame() {
        let detail = SignalNormalizer.normalize_frame("<<binary>>");
        assert_eq!(detail.message, "<<binary>>");
        assert_eq!(detail.kind, UNKNOWN_SIGNAL_TYPE);
    }

    #[test]
    fn test_renormalizing_is_stable() {
        let raw = RawSignal::from_value(json!({"intent": "audit", "payload": {"trust_score": 0.5}}));
        let once = SignalNormalizer.normalize_at(raw, fixed_now());
        let twice = SignalNormalizer.normalize_at(RawSignal::from(&once), Utc::now());
        assert_eq!(once, twice);
    }
}
