//! Team profiles offered by the instantiation wizard

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceMode {
    Passive,
    #[default]
    ApprovalRequired,
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputChannel {
    Workspace,
    Trigger,
    Schedule,
    Api,
    Sensor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputChannel {
    Chat,
    Proposal,
    Timeline,
    Artifact,
    Approval,
}

/// A preset team shape: what it is for and where it listens
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub objective_kinds: Vec<String>,
    #[serde(default)]
    pub governance_mode: GovernanceMode,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    pub suggested_routes: Vec<String>,
    #[serde(default)]
    pub input_channels: Vec<InputChannel>,
    #[serde(default)]
    pub output_channels: Vec<OutputChannel>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TeamProfile {
    pub fn research() -> Self {
        Self {
            id: "research-team".into(),
            name: "Research Team".into(),
            description: "Optimize for source gathering, synthesis, and decision support.".into(),
            objective_kinds: strings(&["analysis", "discovery", "summarization"]),
            governance_mode: GovernanceMode::ApprovalRequired,
            required_capabilities: strings(&["provider", "mcp-fetch", "memory"]),
            suggested_routes: strings(&["swarm.mission.events.research.*", "swarm.team.research.*"]),
            input_channels: vec![InputChannel::Workspace, InputChannel::Trigger, InputChannel::Api],
            output_channels: vec![
                OutputChannel::Chat,
                OutputChannel::Proposal,
                OutputChannel::Timeline,
                OutputChannel::Artifact,
            ],
        }
    }

    pub fn incident() -> Self {
        Self {
            id: "incident-team".into(),
            name: "Incident Team".into(),
            description: "Optimize for runtime diagnostics, fallback handling, and stabilization."
                .into(),
            objective_kinds: strings(&["triage", "stability", "degraded_recovery"]),
            governance_mode: GovernanceMode::ApprovalRequired,
            required_capabilities: strings(&["provider", "nats", "system-observability"]),
            suggested_routes: strings(&["swarm.alerts.*", "swarm.team.incident.*"]),
            input_channels: vec![
                InputChannel::Workspace,
                InputChannel::Trigger,
                InputChannel::Schedule,
            ],
            output_channels: vec![
                OutputChannel::Chat,
                OutputChannel::Timeline,
                OutputChannel::Approval,
            ],
        }
    }

    pub fn delivery() -> Self {
        Self {
            id: "delivery-team".into(),
            name: "Delivery Team".into(),
            description: "Optimize for implementation throughput with governed execution.".into(),
            objective_kinds: strings(&["build", "execution", "verification"]),
            governance_mode: GovernanceMode::ApprovalRequired,
            required_capabilities: strings(&["provider", "mcp-filesystem", "runs"]),
            suggested_routes: strings(&["swarm.team.delivery.*", "swarm.runs.*"]),
            input_channels: vec![InputChannel::Workspace, InputChannel::Api, InputChannel::Schedule],
            output_channels: vec![
                OutputChannel::Proposal,
                OutputChannel::Timeline,
                OutputChannel::Artifact,
                OutputChannel::Approval,
            ],
        }
    }

    pub fn governance_first() -> Self {
        Self {
            id: "governance-first-team".into(),
            name: "Governance-First Team".into(),
            description: "Optimize for strict review posture and traceable approvals.".into(),
            objective_kinds: strings(&["policy", "high_risk_mutation", "review"]),
            governance_mode: GovernanceMode::ApprovalRequired,
            required_capabilities: strings(&["provider", "governance", "runs"]),
            suggested_routes: strings(&["swarm.governance.*", "swarm.approvals.*"]),
            input_channels: vec![InputChannel::Workspace, InputChannel::Trigger, InputChannel::Api],
            output_channels: vec![
                OutputChannel::Proposal,
                OutputChannel::Approval,
                OutputChannel::Timeline,
            ],
        }
    }
}

/// Ordered set of selectable profiles
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileCatalog {
    profiles: Vec<TeamProfile>,
}

impl ProfileCatalog {
    pub fn new(profiles: Vec<TeamProfile>) -> Self {
        Self { profiles }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            TeamProfile::research(),
            TeamProfile::incident(),
            TeamProfile::delivery(),
            TeamProfile::governance_first(),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&TeamProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn profiles(&self) -> &[TeamProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
