//! Replaying recorded sessions end to end.

use std::path::PathBuf;

use console_cli::commands;
use console_cli::AppConfig;
use console_types::{ConnectionState, EnvelopeSignal, RouteTemplate};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

#[tokio::test]
async fn replays_session_with_default_threshold() {
    let snapshot = commands::replay(&AppConfig::default(), &fixture("session.jsonl"))
        .await
        .unwrap();

    // thought, log entry, trusted artifact (twice), plain text line
    assert_eq!(snapshot.feed.len(), 5);
    assert_eq!(snapshot.deliverables.len(), 2);
    assert_eq!(snapshot.deliverables[0].id, "art-101");
    assert_eq!(snapshot.deliverables[1].signal, EnvelopeSignal::GovernanceHalt);
    assert_eq!(snapshot.blocked_agents, vec!["deployer".to_string()]);
    assert_eq!(snapshot.connection, ConnectionState::Closed);

    let summary = commands::render_replay_summary(&snapshot);
    assert!(summary.contains("Deliverables awaiting review (2)"));
    assert!(summary.contains("Blocked agents: deployer"));
}

#[tokio::test]
async fn stricter_threshold_holds_more() {
    let mut config = AppConfig::default();
    config.engine.trust_threshold = 0.95;
    let snapshot = commands::replay(&config, &fixture("session.jsonl"))
        .await
        .unwrap();

    // the repeated art-100 is held once
    assert_eq!(snapshot.feed.len(), 3);
    assert_eq!(snapshot.deliverables.len(), 3);
    assert_eq!(snapshot.deliverables[0].id, "art-100");
}

#[tokio::test]
async fn missing_recording_is_an_error() {
    let err = commands::replay(&AppConfig::default(), &fixture("absent.jsonl"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read recording"));
}

#[test]
fn classification_lists_remediations() {
    let out = commands::render_classification("HTTP 503: Service Unavailable");
    assert!(out.starts_with("Failure: "));
    assert!(out.contains("Remediations: "));
}

#[test]
fn routes_listing_names_every_template() {
    let catalog = RouteTemplate::builtin();
    let out = commands::render_routes(&catalog);
    for template in &catalog {
        assert!(out.contains(&template.label));
    }
}
