//! Message-subject routing templates

use serde::{Deserialize, Serialize};

/// Identifier of a route template
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTemplateId(pub String);

impl RouteTemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteTemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RouteTemplateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named, ordered set of subject patterns
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTemplate {
    pub id: RouteTemplateId,
    pub label: String,
    /// Subject patterns, wildcards allowed, order significant
    pub subjects: Vec<String>,
    #[serde(default)]
    pub impact_preview: String,
}

impl RouteTemplate {
    pub fn new(id: impl Into<RouteTemplateId>, label: impl Into<String>, subjects: Vec<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            subjects,
            impact_preview: String::new(),
        }
    }

    pub fn with_impact_preview(mut self, preview: impl Into<String>) -> Self {
        self.impact_preview = preview.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Templates available without configuration
    pub fn builtin() -> Vec<RouteTemplate> {
        vec![
            Self::new("default", "Default mission bus", subjects(&["swarm.default.*"]))
                .with_impact_preview("Listens on the default mission subject only."),
            Self::new(
                "custom-health",
                "Custom + health",
                subjects(&["swarm.custom.*", "swarm.health.*"]),
            )
            .with_impact_preview("Exposes custom team subjects and runtime health beacons."),
            Self::new(
                "mission-events",
                "Mission events",
                subjects(&["swarm.mission.events.*", "swarm.runs.*"]),
            )
            .with_impact_preview("Streams mission lifecycle events and run updates."),
            Self::new(
                "incident-watch",
                "Incident watch",
                subjects(&["swarm.alerts.*", "swarm.health.*"]),
            )
            .with_impact_preview("Routes alerts and health degradation to the team."),
        ]
    }
}

fn subjects(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// How much of the subject list the operator edits directly
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Apply a named template wholesale
    #[default]
    Basic,
    /// Preview the impact before committing
    Guided,
    /// Line-delimited free text
    Expert,
}

impl std::fmt::Display for EditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Basic => "basic",
            Self::Guided => "guided",
            Self::Expert => "expert",
        };
        f.write_str(s)
    }
}

/// Difference between the active subject list and a candidate one
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteImpact {
    /// In the candidate but not the current list, candidate order
    pub added: Vec<String>,
    /// In the current list but not the candidate, current order
    pub removed: Vec<String>,
    /// In both, candidate order
    pub retained: Vec<String>,
}

impl RouteImpact {
    pub fn between(current: &[String], next: &[String]) -> Self {
        let mut impact = Self::default();
        for subject in next {
            let bucket = if current.contains(subject) {
                &mut impact.retained
            } else {
                &mut impact.added
            };
            if !bucket.contains(subject) {
                bucket.push(subject.clone());
            }
        }
        for subject in current {
            if !next.contains(subject) && !impact.removed.contains(subject) {
                impact.removed.push(subject.clone());
            }
        }
        impact
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
