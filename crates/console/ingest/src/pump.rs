//! Feeds async updates into the single-writer console

use console_engine::{MissionConsole, TriageOutcome};
use console_types::ReadinessSnapshot;
use tracing::debug;

use crate::error::IngestResult;
use crate::health::HealthHandle;
use crate::ingestor::{IngestEvent, IngestorHandle};

/// Bridges ingestor and health poller channels to a [`MissionConsole`].
///
/// The console is only ever borrowed for the duration of one call, so the
/// caller stays free to issue operator commands between updates.
pub struct ConsolePump {
    ingest: IngestorHandle,
    health: Option<HealthHandle>,
}

enum Update {
    Ingest(Option<IngestEvent>),
    Health(Option<ReadinessSnapshot>),
}

impl ConsolePump {
    pub fn new(ingest: IngestorHandle) -> Self {
        Self {
            ingest,
            health: None,
        }
    }

    pub fn with_health(mut self, health: HealthHandle) -> Self {
        self.health = Some(health);
        self
    }

    /// Apply one ingest event. Returns the triage outcome for frames.
    pub fn apply(console: &mut MissionConsole, event: IngestEvent) -> Option<TriageOutcome> {
        match event {
            IngestEvent::Frame(frame) => Some(console.ingest_frame(&frame)),
            IngestEvent::Connection(state) => {
                console.set_connection(state);
                None
            }
        }
    }

    /// Apply everything already waiting, without blocking. Returns the
    /// number of updates applied.
    pub fn pump(&mut self, console: &mut MissionConsole) -> usize {
        let mut applied = 0;
        while let Some(event) = self.ingest.try_recv() {
            Self::apply(console, event);
            applied += 1;
        }
        if let Some(health) = self.health.as_mut() {
            while let Some(snapshot) = health.try_recv() {
                console.update_readiness(&snapshot);
                applied += 1;
            }
        }
        if applied > 0 {
            debug!(applied, "Pumped console updates");
        }
        applied
    }

    /// Wait for one update and apply it. Returns `false` once ingestion
    /// has ended and its channel is drained.
    pub async fn step(&mut self, console: &mut MissionConsole) -> bool {
        loop {
            let update = tokio::select! {
                event = self.ingest.recv() => Update::Ingest(event),
                snapshot = next_snapshot(&mut self.health) => Update::Health(snapshot),
            };
            match update {
                Update::Ingest(Some(event)) => {
                    Self::apply(console, event);
                    return true;
                }
                Update::Ingest(None) => return false,
                Update::Health(Some(snapshot)) => {
                    console.update_readiness(&snapshot);
                    return true;
                }
                // poller stopped; keep serving ingestion
                Update::Health(None) => self.health = None,
            }
        }
    }

    /// Run until ingestion ends. Returns the number of updates applied.
    pub async fn run(&mut self, console: &mut MissionConsole) -> usize {
        let mut applied = 0;
        while self.step(console).await {
            applied += 1;
        }
        applied
    }

    /// Wait for the ingestor to finish and return how it ended. The health
    /// poller, if any, is aborted.
    pub async fn finish(self) -> IngestResult<()> {
        drop(self.health);
        self.ingest.join().await
    }

    /// Stop both background tasks.
    pub fn shutdown(&self) {
        self.ingest.shutdown();
        if let Some(health) = &self.health {
            health.shutdown();
        }
    }
}

async fn next_snapshot(health: &mut Option<HealthHandle>) -> Option<ReadinessSnapshot> {
    match health {
        Some(handle) => handle.recv().await,
        None => std::future::pending().await,
    }
}
