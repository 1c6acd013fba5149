//! Mission console: the single writer of all console state
//!
//! Every mutation goes through a method on [`MissionConsole`]. Readers
//! either take a [`ConsoleSnapshot`] or subscribe to [`ConsoleEvent`]s.

use std::sync::Arc;

use console_types::{
    ApprovalRequest, ConnectionState, ConsoleError, ConsoleResult, CtsEnvelope, DecisionRecord,
    EditMode, ForcedTransition, GovernanceDecision, LaunchDirective, LaunchMode, LaunchPlan,
    MissionBlueprint, MissionId, RawSignal, ReadinessReport, ReadinessSnapshot, RouteImpact,
    RouteTemplate, RouteTemplateId, SignalDetail, TeamProfile, WizardStep,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::blueprint_store::BlueprintStore;
use crate::config::EngineConfig;
use crate::deliverables::DeliverablesQueue;
use crate::events::ConsoleEvent;
use crate::feed::ActivityFeed;
use crate::normalizer::SignalNormalizer;
use crate::persistence::KeyValueStore;
use crate::readiness::ReadinessAggregator;
use crate::registry::PanelRegistry;
use crate::triage::{self, TriageOutcome, TriageRoute};
use crate::trust_gate::{TrustGate, TrustPolicy};
use crate::wizard::{ReadinessOutcome, ReadinessTicket, TeamInstantiationWizard};

/// Read-only copy of console state
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleSnapshot {
    pub trust_threshold: f64,
    pub connection: ConnectionState,
    pub feed: Vec<SignalDetail>,
    pub deliverables: Vec<CtsEnvelope>,
    pub blocked_agents: Vec<String>,
    pub current_blueprint: Option<MissionBlueprint>,
    pub saved_blueprints: Vec<MissionBlueprint>,
    pub wizard_step: WizardStep,
    pub objective: String,
    pub selected_profile: Option<String>,
    pub routes: Vec<String>,
    pub route_mode: EditMode,
    pub readiness: Option<ReadinessReport>,
    pub pending_approvals: Vec<ApprovalRequest>,
}

pub struct MissionConsole {
    normalizer: SignalNormalizer,
    gate: TrustGate,
    deliverables: DeliverablesQueue,
    feed: ActivityFeed,
    blueprints: BlueprintStore,
    wizard: TeamInstantiationWizard,
    route_catalog: Vec<RouteTemplate>,
    registry: PanelRegistry,
    approvals: Vec<ApprovalRequest>,
    connection: ConnectionState,
    readiness: Option<ReadinessReport>,
    event_tx: broadcast::Sender<ConsoleEvent>,
}

impl std::fmt::Debug for MissionConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissionConsole")
            .field("threshold", &self.gate.policy().threshold())
            .field("deliverables", &self.deliverables.count())
            .field("feed", &self.feed.len())
            .field("wizard_step", &self.wizard.step())
            .field("connection", &self.connection)
            .finish()
    }
}

impl MissionConsole {
    pub fn new(config: EngineConfig) -> ConsoleResult<Self> {
        let policy = TrustPolicy::new(config.trust_threshold)?;
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let mut wizard = TeamInstantiationWizard::default();
        let routes_tx = event_tx.clone();
        wizard
            .routes_mut()
            .on_routes_change(Box::new(move |routes: &[String]| {
                let _ = routes_tx.send(ConsoleEvent::RoutesChanged(routes.to_vec()));
            }));

        info!(
            threshold = policy.threshold(),
            feed_capacity = config.feed_capacity,
            "Mission console created"
        );

        Ok(Self {
            normalizer: SignalNormalizer::new(),
            gate: TrustGate::new(policy),
            deliverables: DeliverablesQueue::new(),
            feed: ActivityFeed::new(config.feed_capacity),
            blueprints: BlueprintStore::new(),
            wizard,
            route_catalog: RouteTemplate::builtin(),
            registry: PanelRegistry::builtin(),
            approvals: Vec::new(),
            connection: ConnectionState::Idle,
            readiness: None,
            event_tx,
        })
    }

    /// Persist saved blueprints to `backend`, loading what it already holds.
    pub fn with_blueprint_backend(mut self, backend: Arc<dyn KeyValueStore>) -> ConsoleResult<Self> {
        let mut store = BlueprintStore::with_backend(backend);
        store.hydrate()?;
        self.blueprints = store;
        Ok(self)
    }

    pub fn with_route_catalog(mut self, catalog: Vec<RouteTemplate>) -> Self {
        self.route_catalog = catalog;
        self
    }

    /// Subscribe to console events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: ConsoleEvent) {
        let _ = self.event_tx.send(event);
    }

    // ── Ingestion & triage ───────────────────────────────────────────

    /// Normalize a raw signal and route it to the feed or review queue.
    pub fn ingest(&mut self, raw: RawSignal) -> TriageOutcome {
        let signal = self.normalizer.normalize(raw);
        self.triage(signal)
    }

    pub fn ingest_frame(&mut self, frame: &str) -> TriageOutcome {
        self.ingest(RawSignal::parse_frame(frame))
    }

    fn triage(&mut self, signal: SignalDetail) -> TriageOutcome {
        match triage::route(&signal, &self.gate) {
            TriageRoute::Display => {
                self.display(signal);
                TriageOutcome::Displayed
            }
            TriageRoute::Bypass(envelope) => {
                debug!(envelope_id = %envelope.id, "Artifact bypassed review");
                self.display(signal);
                TriageOutcome::Bypassed {
                    envelope_id: envelope.id,
                }
            }
            TriageRoute::Review(envelope, reason) => {
                let envelope_id = envelope.id.clone();
                let source = envelope.source.clone();
                if !self.deliverables.enqueue(envelope) {
                    return TriageOutcome::Duplicate { envelope_id };
                }
                info!(envelope_id = %envelope_id, source = %source, ?reason, "Artifact intercepted");
                self.emit(ConsoleEvent::ArtifactIntercepted {
                    envelope_id: envelope_id.clone(),
                    source,
                    reason,
                });
                TriageOutcome::Intercepted { envelope_id, reason }
            }
        }
    }

    fn display(&mut self, signal: SignalDetail) {
        self.feed.push(signal.clone());
        self.emit(ConsoleEvent::SignalDisplayed(Box::new(signal)));
    }

    pub fn feed(&self) -> &ActivityFeed {
        &self.feed
    }

    // ── Trust policy ─────────────────────────────────────────────────

    pub fn threshold(&self) -> f64 {
        self.gate.policy().threshold()
    }

    /// Adjust the trust threshold; takes effect on the next decision.
    pub fn set_threshold(&mut self, threshold: f64) -> ConsoleResult<()> {
        let previous = self.gate.policy_mut().set_threshold(threshold)?;
        info!(previous, current = threshold, "Trust threshold changed");
        self.emit(ConsoleEvent::ThresholdChanged {
            previous,
            current: threshold,
        });
        Ok(())
    }

    // ── Deliverables ─────────────────────────────────────────────────

    pub fn deliverables(&self) -> &DeliverablesQueue {
        &self.deliverables
    }

    pub fn acknowledge(&mut self, envelope_id: &str) -> ConsoleResult<DecisionRecord> {
        let record = self.deliverables.acknowledge(envelope_id)?;
        self.emit(ConsoleEvent::DeliverableResolved(record.clone()));
        Ok(record)
    }

    pub fn decide(
        &mut self,
        envelope_id: &str,
        decision: GovernanceDecision,
        reason: Option<String>,
    ) -> ConsoleResult<DecisionRecord> {
        let record = self.deliverables.decide(envelope_id, decision, reason)?;
        self.emit(ConsoleEvent::DeliverableResolved(record.clone()));
        Ok(record)
    }

    // ── Blueprints ───────────────────────────────────────────────────

    pub fn blueprints(&self) -> &BlueprintStore {
        &self.blueprints
    }

    pub fn set_current_blueprint(&mut self, blueprint: MissionBlueprint) {
        self.blueprints.set_current(blueprint);
    }

    pub fn save_blueprint(&mut self, blueprint: MissionBlueprint) -> ConsoleResult<()> {
        let mission_id = blueprint.mission_id.clone();
        self.blueprints.save(blueprint)?;
        self.emit(ConsoleEvent::BlueprintSaved(mission_id));
        Ok(())
    }

    /// Drop the current blueprint; saved copies are kept.
    pub fn clear_current_blueprint(&mut self) -> Option<MissionBlueprint> {
        let cleared = self.blueprints.clear_current();
        if let Some(blueprint) = &cleared {
            info!(mission_id = %blueprint.mission_id, "Current blueprint cleared");
        }
        cleared
    }

    /// Save a copy of the current blueprint.
    pub fn save_current_blueprint(&mut self) -> ConsoleResult<MissionId> {
        let blueprint = self
            .blueprints
            .current()
            .cloned()
            .ok_or(ConsoleError::NoCurrentBlueprint)?;
        let mission_id = blueprint.mission_id.clone();
        self.save_blueprint(blueprint)?;
        Ok(mission_id)
    }

    pub fn restore_blueprint(&mut self, mission_id: &MissionId) -> ConsoleResult<MissionBlueprint> {
        let restored = self.blueprints.restore(mission_id)?.clone();
        self.emit(ConsoleEvent::BlueprintRestored(mission_id.clone()));
        Ok(restored)
    }

    pub fn delete_blueprint(&mut self, mission_id: &MissionId) -> ConsoleResult<usize> {
        let removed = self.blueprints.delete(mission_id)?;
        self.emit(ConsoleEvent::BlueprintDeleted {
            mission_id: mission_id.clone(),
            removed,
        });
        Ok(removed)
    }

    // ── Wizard ───────────────────────────────────────────────────────

    pub fn wizard(&self) -> &TeamInstantiationWizard {
        &self.wizard
    }

    pub fn set_objective(&mut self, text: impl Into<String>) -> ConsoleResult<()> {
        self.wizard.set_objective(text)
    }

    pub fn select_profile(&mut self, profile_id: &str) -> ConsoleResult<TeamProfile> {
        self.wizard.select_profile(profile_id).cloned()
    }

    pub fn advance_wizard(&mut self) -> ConsoleResult<WizardStep> {
        let from = self.wizard.step();
        let to = self.wizard.advance()?;
        self.emit(ConsoleEvent::WizardAdvanced { from, to });
        Ok(to)
    }

    pub fn begin_readiness_check(&mut self) -> ConsoleResult<ReadinessTicket> {
        self.wizard.begin_readiness_check()
    }

    pub fn resolve_readiness(
        &mut self,
        ticket: ReadinessTicket,
        snapshot: &ReadinessSnapshot,
    ) -> ReadinessOutcome {
        let outcome = self.wizard.resolve_readiness(ticket, snapshot);
        if let ReadinessOutcome::Applied(report) = &outcome {
            self.emit(ConsoleEvent::ReadinessUpdated(report.clone()));
        }
        outcome
    }

    pub fn force_advance(&mut self, reason: impl Into<String>) -> ConsoleResult<ForcedTransition> {
        let transition = self.wizard.force_advance(reason)?;
        self.emit(ConsoleEvent::WizardForced(transition.clone()));
        Ok(transition)
    }

    /// Run a terminal wizard action.
    ///
    /// The planned blueprint becomes current. A propose-only launch also
    /// adds its approval request to the pending approvals.
    #[instrument(skip(self))]
    pub fn launch(&mut self, mode: LaunchMode) -> ConsoleResult<LaunchPlan> {
        let plan = self.wizard.launch(mode)?;
        self.blueprints.set_current(plan.blueprint.clone());
        if let LaunchDirective::RequestApproval(request) = &plan.directive {
            self.approvals.push(request.clone());
        }
        self.emit(ConsoleEvent::LaunchPlanned(Box::new(plan.clone())));
        self.emit(ConsoleEvent::WizardReset {
            epoch: self.wizard.epoch(),
        });
        Ok(plan)
    }

    pub fn reset_wizard(&mut self) {
        self.wizard.reset();
        info!(epoch = self.wizard.epoch(), "Wizard reset");
        self.emit(ConsoleEvent::WizardReset {
            epoch: self.wizard.epoch(),
        });
    }

    pub fn pending_approvals(&self) -> &[ApprovalRequest] {
        &self.approvals
    }

    /// Remove a pending approval once it has been handled upstream.
    pub fn take_approval(&mut self, id: &str) -> Option<ApprovalRequest> {
        let index = self.approvals.iter().position(|a| a.id == id)?;
        Some(self.approvals.remove(index))
    }

    // ── Routes ───────────────────────────────────────────────────────

    pub fn route_catalog(&self) -> &[RouteTemplate] {
        &self.route_catalog
    }

    pub fn routes(&self) -> &[String] {
        self.wizard.routes().subjects()
    }

    pub fn set_route_mode(&mut self, mode: EditMode) {
        self.wizard.routes_mut().set_mode(mode);
    }

    pub fn preview_route_template(&mut self, id: &RouteTemplateId) -> ConsoleResult<RouteImpact> {
        let template = self.find_template(id)?.clone();
        Ok(self.wizard.routes_mut().preview(&template))
    }

    pub fn apply_route_template(&mut self, id: &RouteTemplateId) -> ConsoleResult<RouteImpact> {
        let catalog = &self.route_catalog;
        self.wizard.routes_mut().apply_by_id(catalog, id)
    }

    pub fn edit_routes(&mut self, text: &str) -> ConsoleResult<Vec<String>> {
        self.wizard
            .routes_mut()
            .edit_expert(text)
            .map(|subjects| subjects.to_vec())
    }

    pub fn rollback_routes(&mut self) -> bool {
        self.wizard.routes_mut().rollback()
    }

    fn find_template(&self, id: &RouteTemplateId) -> ConsoleResult<&RouteTemplate> {
        self.route_catalog
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| ConsoleError::TemplateNotFound(id.clone()))
    }

    // ── Connectivity & readiness ─────────────────────────────────────

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// Record a connection transition. State other than the connection
    /// itself is left as it was.
    pub fn set_connection(&mut self, state: ConnectionState) {
        if self.connection == state {
            return;
        }
        if state.is_degraded() {
            warn!(connection = %state, "Ingestion degraded; serving last-known state");
        } else {
            info!(connection = %state, "Ingestion connection changed");
        }
        self.connection = state.clone();
        self.emit(ConsoleEvent::ConnectionChanged(state));
    }

    /// Apply a periodic readiness snapshot from the health poller.
    pub fn update_readiness(&mut self, snapshot: &ReadinessSnapshot) -> ReadinessReport {
        let report = ReadinessAggregator::aggregate(snapshot);
        if self.readiness.as_ref() != Some(&report) {
            debug!(ready = report.ready, blockers = report.blockers.len(), "Readiness updated");
            self.emit(ConsoleEvent::ReadinessUpdated(report.clone()));
        }
        self.readiness = Some(report.clone());
        report
    }

    pub fn readiness(&self) -> Option<&ReadinessReport> {
        self.readiness.as_ref()
    }

    // ── Panels ───────────────────────────────────────────────────────

    pub fn panels(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn panels_mut(&mut self) -> &mut PanelRegistry {
        &mut self.registry
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot {
            trust_threshold: self.threshold(),
            connection: self.connection.clone(),
            feed: self.feed.to_vec(),
            deliverables: self.deliverables.list().to_vec(),
            blocked_agents: self.deliverables.blocked_agents(),
            current_blueprint: self.blueprints.current().cloned(),
            saved_blueprints: self.blueprints.list().into_iter().cloned().collect(),
            wizard_step: self.wizard.step(),
            objective: self.wizard.objective().to_string(),
            selected_profile: self.wizard.selected_profile().map(|p| p.id.clone()),
            routes: self.routes().to_vec(),
            route_mode: self.wizard.routes().mode(),
            readiness: self.readiness.clone(),
            pending_approvals: self.approvals.clone(),
        }
    }
}
