//! Events published by the mission console

use console_types::{
    ConnectionState, DecisionRecord, ForcedTransition, LaunchPlan, MissionId, ReadinessReport,
    SignalDetail, WizardStep,
};

use crate::trust_gate::InterceptReason;

/// Events emitted by [`MissionConsole`](crate::MissionConsole).
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// Signal added to the activity feed.
    SignalDisplayed(Box<SignalDetail>),

    /// Envelope held for review.
    ArtifactIntercepted {
        envelope_id: String,
        source: String,
        reason: InterceptReason,
    },

    /// Queued envelope acknowledged or decided.
    DeliverableResolved(DecisionRecord),

    /// Trust threshold adjusted by the operator.
    ThresholdChanged { previous: f64, current: f64 },

    BlueprintSaved(MissionId),

    BlueprintRestored(MissionId),

    BlueprintDeleted { mission_id: MissionId, removed: usize },

    WizardAdvanced { from: WizardStep, to: WizardStep },

    /// Readiness gate overridden; kept for audit.
    WizardForced(ForcedTransition),

    WizardReset { epoch: u64 },

    LaunchPlanned(Box<LaunchPlan>),

    /// Active route subjects changed.
    RoutesChanged(Vec<String>),

    ConnectionChanged(ConnectionState),

    ReadinessUpdated(ReadinessReport),
}
