//! Error types for the console core

use crate::{EditMode, MissionId, RouteTemplateId, WizardStep};

/// Errors that can occur in console operations
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Blueprint not found: {0}")]
    BlueprintNotFound(MissionId),

    #[error("No current blueprint")]
    NoCurrentBlueprint,

    #[error("Route template not found: {0}")]
    TemplateNotFound(RouteTemplateId),

    #[error("Team profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Deliverable not found: {0}")]
    DeliverableNotFound(String),

    #[error("Governance halt {0} requires an explicit decision")]
    AcknowledgeRequiresDecision(String),

    #[error("Trust threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Cannot leave {step}: {reason}")]
    GuardNotSatisfied { step: WizardStep, reason: String },

    #[error("Invalid wizard step: expected {expected}, currently at {actual}")]
    InvalidStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("Launch blocked: {0}")]
    LaunchBlocked(String),

    #[error("Route template {0} has no subjects")]
    EmptyTemplate(RouteTemplateId),

    #[error("Guided mode requires a preview of {0} before applying")]
    PreviewRequired(RouteTemplateId),

    #[error("Operation requires {expected} mode, editor is in {actual} mode")]
    ModeMismatch { expected: EditMode, actual: EditMode },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
