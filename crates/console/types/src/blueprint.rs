//! Mission blueprints: teams of agents drafted for a mission

use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

/// Identifier of a mission blueprint
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionId(pub String);

impl MissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `mission-` followed by eight hex characters
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("mission-{}", &uuid[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MissionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ── Blueprint ────────────────────────────────────────────────────────

/// An agent slot within a team
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentManifest {
    pub id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Subjects this agent listens on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    /// Subjects this agent publishes to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

impl AgentManifest {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            system_prompt: None,
            model: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            tools: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlueprintTeam {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub agents: Vec<AgentManifest>,
}

impl BlueprintTeam {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            agents: Vec::new(),
        }
    }

    pub fn with_agent(mut self, agent: AgentManifest) -> Self {
        self.agents.push(agent);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_id: Option<String>,
    pub description: String,
}

/// A drafted or instantiated mission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionBlueprint {
    pub mission_id: MissionId,
    pub intent: String,
    /// May be empty while drafting
    #[serde(default)]
    pub teams: Vec<BlueprintTeam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl MissionBlueprint {
    pub fn new(mission_id: impl Into<MissionId>, intent: impl Into<String>) -> Self {
        Self {
            mission_id: mission_id.into(),
            intent: intent.into(),
            teams: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_team(mut self, team: BlueprintTeam) -> Self {
        self.teams.push(team);
        self
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn agent_count(&self) -> usize {
        self.teams.iter().map(|t| t.agents.len()).sum()
    }
}
