//! Subcommand implementations

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use console_engine::{ConsoleSnapshot, MissionConsole, PanelRegistry};
use console_ingest::{ConsolePump, ReplaySource, SignalIngestor};
use console_types::{classify_failure, ProfileCatalog, RouteTemplate};
use tracing::info;

use crate::config::AppConfig;

/// Replay a recorded frame file through the full pipeline and return the
/// resulting console state.
pub async fn replay(config: &AppConfig, path: &Path) -> anyhow::Result<ConsoleSnapshot> {
    let source = ReplaySource::from_file(path)
        .await
        .with_context(|| format!("Failed to read recording {}", path.display()))?;
    info!(path = %path.display(), frames = source.len(), "Replaying recording");

    let mut console = MissionConsole::new(config.engine.clone())?;
    let ingestor = SignalIngestor::new(Arc::new(source), config.ingest.clone());
    let mut pump = ConsolePump::new(ingestor.spawn());

    let applied = pump.run(&mut console).await;
    pump.finish().await?;

    let snapshot = console.snapshot();
    info!(
        applied,
        displayed = snapshot.feed.len(),
        held = snapshot.deliverables.len(),
        "Replay complete"
    );
    Ok(snapshot)
}

pub fn render_replay_summary(snapshot: &ConsoleSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trust threshold: {}", snapshot.trust_threshold);
    let _ = writeln!(out, "Connection: {}", snapshot.connection);
    let _ = writeln!(out, "Activity feed ({}):", snapshot.feed.len());
    for signal in &snapshot.feed {
        let _ = writeln!(
            out,
            "  {} [{}] {}: {}",
            signal.timestamp.format("%H:%M:%S"),
            signal.kind,
            signal.source,
            signal.message
        );
    }
    let _ = writeln!(out, "Deliverables awaiting review ({}):", snapshot.deliverables.len());
    for envelope in &snapshot.deliverables {
        let score = envelope
            .trust_score
            .map_or_else(|| "unscored".to_string(), |s| format!("{:.2}", s));
        let _ = writeln!(
            out,
            "  {} {} from {} ({})",
            envelope.id,
            envelope.signal.as_str(),
            envelope.source,
            score
        );
    }
    if !snapshot.blocked_agents.is_empty() {
        let _ = writeln!(out, "Blocked agents: {}", snapshot.blocked_agents.join(", "));
    }
    out
}

pub fn render_profiles(catalog: &ProfileCatalog) -> String {
    let mut out = String::new();
    for profile in catalog.profiles() {
        let _ = writeln!(out, "{} - {}", profile.id, profile.name);
        let _ = writeln!(out, "  {}", profile.description);
        let _ = writeln!(out, "  governance: {:?}", profile.governance_mode);
        let _ = writeln!(out, "  routes: {}", profile.suggested_routes.join(", "));
    }
    out
}

pub fn render_routes(catalog: &[RouteTemplate]) -> String {
    let mut out = String::new();
    for template in catalog {
        let _ = writeln!(out, "{} - {}", template.id, template.label);
        let _ = writeln!(out, "  {}", template.subjects.join(", "));
    }
    out
}

pub fn render_panels(registry: &PanelRegistry) -> String {
    let mut out = String::new();
    for panel in registry.panels() {
        let _ = writeln!(out, "{:>4}  {:<10} {:?}", panel.order, panel.id, panel.layout);
    }
    out
}

pub fn render_classification(message: &str) -> String {
    let kind = classify_failure(message);
    let mut out = String::new();
    let _ = writeln!(out, "Failure: {}", kind);
    let _ = writeln!(out, "{}", kind.reason());
    let remediations: Vec<String> = kind
        .remediations()
        .iter()
        .map(|r| format!("{:?}", r))
        .collect();
    let _ = writeln!(out, "Remediations: {}", remediations.join(", "));
    out
}
