//! Vocabulary of the team-instantiation wizard

use crate::{ApprovalRequest, MissionBlueprint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wizard position; progress is forward-only until reset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Objective,
    ProfileSelection,
    ReadinessCheck,
    LaunchReview,
}

impl WizardStep {
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Objective => Some(Self::ProfileSelection),
            Self::ProfileSelection => Some(Self::ReadinessCheck),
            Self::ReadinessCheck => Some(Self::LaunchReview),
            Self::LaunchReview => None,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LaunchReview)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Objective => "objective",
            Self::ProfileSelection => "profile_selection",
            Self::ReadinessCheck => "readiness_check",
            Self::LaunchReview => "launch_review",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    LaunchNow,
    ProposeOnly,
}

/// Where the operator's attention goes after a launch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Teams,
    Approvals,
}

/// Operator override of a failed readiness gate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForcedTransition {
    pub from: WizardStep,
    pub blockers: Vec<String>,
    pub reason: String,
    pub forced_at: DateTime<Utc>,
}

/// What the caller must do to carry out a launch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "request")]
pub enum LaunchDirective {
    StartMission,
    RequestApproval(ApprovalRequest),
}

/// Result of a terminal wizard action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub mode: LaunchMode,
    pub blueprint: MissionBlueprint,
    pub profile_id: String,
    pub routes: Vec<String>,
    pub directive: LaunchDirective,
    pub focus: Surface,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced: Option<ForcedTransition>,
}

impl LaunchPlan {
    pub fn approval_request(&self) -> Option<&ApprovalRequest> {
        match &self.directive {
            LaunchDirective::RequestApproval(req) => Some(req),
            LaunchDirective::StartMission => None,
        }
    }
}
