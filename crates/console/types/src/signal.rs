//! Execution signals: the raw wire frame and its canonical form
//!
//! Two producers feed the console. The live stream sends
//! `{type, source, level?, message?, timestamp?, payload?, topic?}` and the
//! log store returns `{id, trace_id, timestamp, level, source, intent,
//! message, context}`. Neither carries a discriminator, so [`RawSignal`]
//! holds the union of both with every field optional.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Epoch values below this are read as seconds, above as milliseconds.
const EPOCH_MILLIS_CUTOFF: f64 = 1e11;

// ── Raw Signal ───────────────────────────────────────────────────────

/// A frame exactly as it arrived, before normalization
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RawSignal {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// RFC 3339 string or epoch number; anything else is ignored later
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<Value>,
}

impl RawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a text frame without ever failing.
    ///
    /// JSON objects are read field by field with lenient typing. Any other
    /// input (non-object JSON, broken JSON) becomes the message of a signal
    /// with no type, so it still reaches the feed.
    pub fn parse_frame(frame: &str) -> Self {
        match serde_json::from_str::<Value>(frame) {
            Ok(value @ Value::Object(_)) => Self::from_value(value),
            _ => {
                let text = frame.trim();
                Self {
                    message: (!text.is_empty()).then(|| text.to_string()),
                    ..Self::default()
                }
            }
        }
    }

    /// Build from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Self {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Self {
                    payload: Some(other),
                    ..Self::default()
                }
            }
        };

        Self {
            kind: take_text(&mut obj, "type"),
            intent: take_text(&mut obj, "intent"),
            source: take_text(&mut obj, "source"),
            level: take_text(&mut obj, "level"),
            message: take_text(&mut obj, "message"),
            content: take_text(&mut obj, "content"),
            timestamp: obj.remove("timestamp").filter(|v| !v.is_null()),
            payload: obj.remove("payload").filter(|v| !v.is_null()),
            topic: take_text(&mut obj, "topic"),
            id: take_text(&mut obj, "id"),
            trace_id: take_text(&mut obj, "trace_id"),
            context: match obj.remove("context") {
                Some(Value::Object(ctx)) => Some(ctx),
                _ => None,
            },
            trust_score: obj.remove("trust_score").filter(|v| !v.is_null()),
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(Value::String(timestamp.to_rfc3339()));
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Interpret the `timestamp` field, if it holds a usable instant.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        match self.timestamp.as_ref()? {
            Value::String(text) => parse_timestamp_text(text),
            Value::Number(n) => n.as_f64().and_then(epoch_to_datetime),
            _ => None,
        }
    }
}

impl From<Value> for RawSignal {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<&SignalDetail> for RawSignal {
    fn from(detail: &SignalDetail) -> Self {
        Self {
            kind: Some(detail.kind.clone()),
            intent: detail.intent.clone(),
            source: Some(detail.source.clone()),
            level: detail.level.clone(),
            message: Some(detail.message.clone()),
            content: None,
            timestamp: Some(Value::String(detail.timestamp.to_rfc3339())),
            payload: detail.payload.clone(),
            topic: detail.topic.clone(),
            id: detail.id.clone(),
            trace_id: detail.trace_id.clone(),
            context: detail.context.clone(),
            trust_score: detail
                .trust_score
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
        }
    }
}

fn take_text(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    text.parse::<f64>().ok().and_then(epoch_to_datetime)
}

fn epoch_to_datetime(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let millis = if value < EPOCH_MILLIS_CUTOFF {
        value * 1000.0
    } else {
        value
    };
    if millis > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

// ── Canonical Signal ─────────────────────────────────────────────────

/// The one record type every consumer of the console reads
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Always non-empty
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    /// Confidence in [0, 1], lifted from the payload when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<f64>,
}

impl SignalDetail {
    /// Look up a string field inside the payload object.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.as_ref()?.get(key)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_stream_frame() {
        let raw = RawSignal::parse_frame(
            r#"{"type":"thought","source":"planner","timestamp":"2025-01-02T03:04:05Z","payload":{"step":1}}"#,
        );
        assert_eq!(raw.kind.as_deref(), Some("thought"));
        assert_eq!(raw.source.as_deref(), Some("planner"));
        assert_eq!(raw.payload, Some(json!({"step": 1})));
        assert!(raw.parsed_timestamp().is_some());
    }

    #[test]
    fn test_parse_log_entry() {
        let raw = RawSignal::parse_frame(
            r#"{"id":"log-1","trace_id":"t-9","timestamp":"2025-01-02T03:04:05Z","level":"info","source":"overseer","intent":"audit","message":"ok","context":{"k":"v"}}"#,
        );
        assert_eq!(raw.intent.as_deref(), Some("audit"));
        assert_eq!(raw.trace_id.as_deref(), Some("t-9"));
        assert_eq!(raw.context.unwrap().get("k"), Some(&json!("v")));
    }

    #[test]
    fn test_parse_garbage_keeps_text() {
        let raw = RawSignal::parse_frame("not json at all");
        assert_eq!(raw.message.as_deref(), Some("not json at all"));
        assert!(raw.kind.is_none());

        let empty = RawSignal::parse_frame("   ");
        assert!(empty.message.is_none());
    }

    #[test]
    fn test_lenient_field_types() {
        let raw = RawSignal::from_value(json!({"source": 42, "context": "oops", "type": null}));
        assert_eq!(raw.source.as_deref(), Some("42"));
        assert!(raw.context.is_none());
        assert!(raw.kind.is_none());
    }

    #[test]
    fn test_epoch_timestamps() {
        let secs = RawSignal::from_value(json!({"timestamp": 1_700_000_000}));
        let millis = RawSignal::from_value(json!({"timestamp": 1_700_000_000_000_i64}));
        assert_eq!(secs.parsed_timestamp(), millis.parsed_timestamp());
        assert!(secs.parsed_timestamp().is_some());

        let bad = RawSignal::from_value(json!({"timestamp": "yesterday"}));
        assert!(bad.parsed_timestamp().is_none());
    }
}
