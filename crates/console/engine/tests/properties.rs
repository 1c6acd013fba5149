//! Property tests for normalization, gating, queueing, readiness and routes.

use console_engine::*;
use console_types::*;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-z_]{1,10}",
        " [a-z]{1,6} ",
    ])
}

fn arb_timestamp() -> impl Strategy<Value = Option<Value>> {
    prop::option::of(prop_oneof![
        Just(json!("2025-03-01T12:00:00Z")),
        Just(json!("2025-03-01T12:00:00.250+02:00")),
        Just(json!("yesterday")),
        (1_600_000_000i64..1_800_000_000).prop_map(|s| json!(s)),
        (1_600_000_000_000i64..1_800_000_000_000).prop_map(|ms| json!(ms)),
        Just(json!(true)),
    ])
}

fn arb_score() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0u32..=100).prop_map(|n| json!(n as f64 / 100.0)),
        Just(json!(1.5)),
        Just(json!(-0.2)),
        Just(json!("high")),
    ]
}

fn arb_payload() -> impl Strategy<Value = Option<Value>> {
    prop::option::of(prop_oneof![
        arb_score().prop_map(|score| json!({ "trust_score": score })),
        "[a-z ]{0,12}".prop_map(|s| json!({ "text": s })),
        Just(json!([1, 2, 3])),
        Just(json!("")),
    ])
}

fn arb_raw_frame() -> impl Strategy<Value = Value> {
    (
        (arb_text(), arb_text(), arb_text(), arb_text()),
        (arb_text(), arb_text(), arb_timestamp(), arb_payload()),
        prop::option::of(arb_score()),
    )
        .prop_map(
            |((kind, intent, source, level), (message, content, timestamp, payload), score)| {
                let mut obj = Map::new();
                let mut put = |key: &str, value: Option<Value>| {
                    if let Some(v) = value {
                        obj.insert(key.to_string(), v);
                    }
                };
                put("type", kind.map(Value::String));
                put("intent", intent.map(Value::String));
                put("source", source.map(Value::String));
                put("level", level.map(Value::String));
                put("message", message.map(Value::String));
                put("content", content.map(Value::String));
                put("timestamp", timestamp);
                put("payload", payload);
                put("trust_score", score);
                Value::Object(obj)
            },
        )
}

fn arb_snapshot() -> impl Strategy<Value = ReadinessSnapshot> {
    (
        prop::collection::vec(any::<bool>(), 6),
        prop::collection::vec(
            prop_oneof![
                Just("NATS cluster unreachable"),
                Just("Budget exhausted"),
                Just("db offline"),
                Just("Provider token stream quota exceeded"),
                Just("   "),
                Just(""),
            ],
            0..3,
        ),
    )
        .prop_map(|(flags, blockers)| {
            let mut snapshot = ReadinessSnapshot::default();
            for (subsystem, ready) in Subsystem::ALL.into_iter().zip(flags) {
                snapshot.set_ready(subsystem, ready);
            }
            snapshot.blockers = blockers.into_iter().map(String::from).collect();
            snapshot
        })
}

fn arb_subjects(min: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("swarm\\.[a-z]{1,8}\\.\\*", min..5)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Any text frame normalizes to a non-empty message with a timestamp.
    #[test]
    fn normalization_is_total(frame in ".{0,64}") {
        let detail = SignalNormalizer.normalize_frame(&frame);
        prop_assert!(!detail.message.trim().is_empty());
        prop_assert!(!detail.source.trim().is_empty());
        prop_assert!(!detail.kind.trim().is_empty());
    }

    /// Structured frames, however sparse, also normalize.
    #[test]
    fn structured_normalization_is_total(frame in arb_raw_frame()) {
        let detail = SignalNormalizer.normalize(RawSignal::from_value(frame));
        prop_assert!(!detail.message.trim().is_empty());
        if let Some(score) = detail.trust_score {
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    /// Normalizing a normalized signal reproduces it.
    #[test]
    fn normalization_is_idempotent(frame in arb_raw_frame()) {
        let once = SignalNormalizer.normalize(RawSignal::from_value(frame));
        let wire = serde_json::to_value(&once).unwrap();
        let twice = SignalNormalizer.normalize(RawSignal::from_value(wire));
        prop_assert_eq!(once, twice);
    }

    /// The gate flips from intercept to bypass exactly at the threshold.
    #[test]
    fn gate_is_monotonic(threshold in 0u32..=100, score in 0u32..=100) {
        let threshold = threshold as f64 / 100.0;
        let score = score as f64 / 100.0;
        let envelope = CtsEnvelope::artifact("a", "s", "c").with_trust_score(score);
        let decision = TrustGate::decide(&envelope, threshold);
        prop_assert_eq!(decision.is_bypass(), score >= threshold);

        let halt = CtsEnvelope::governance_halt("s", chrono::Utc::now()).with_trust_score(score);
        prop_assert!(!TrustGate::decide(&halt, threshold).is_bypass());
    }

    /// Enqueuing the same id twice never grows the queue.
    #[test]
    fn queue_is_idempotent(ids in prop::collection::vec("[a-d]", 0..20)) {
        let mut queue = DeliverablesQueue::new();
        let mut expected: Vec<String> = Vec::new();
        for id in &ids {
            queue.enqueue(CtsEnvelope::artifact(id.clone(), "s", "c"));
            if !expected.contains(id) {
                expected.push(id.clone());
            }
        }
        let actual: Vec<String> = queue.list().iter().map(|e| e.id.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Ready only when every flag is set and nothing blocks; every failing
    /// subsystem is named.
    #[test]
    fn readiness_names_every_failure(snapshot in arb_snapshot()) {
        let report = ReadinessAggregator::aggregate(&snapshot);
        let all_flags = Subsystem::ALL.iter().all(|s| snapshot.is_ready(*s));
        prop_assert_eq!(report.ready, all_flags && snapshot.blockers.is_empty());
        for subsystem in snapshot.failing() {
            prop_assert!(report.blockers.iter().any(|b| subsystem.is_named_by(b)));
        }
    }

    /// Apply followed by rollback restores the exact prior list.
    #[test]
    fn rollback_is_exact(initial in arb_subjects(0), applied in arb_subjects(1)) {
        let mut engine = RouteTemplateEngine::new(initial.clone());
        engine.apply_template(&RouteTemplate::new("t", "T", applied.clone())).unwrap();
        prop_assert_eq!(engine.subjects(), applied.as_slice());
        prop_assert!(engine.rollback());
        prop_assert_eq!(engine.subjects(), initial.as_slice());
        prop_assert!(!engine.rollback());
    }
}
