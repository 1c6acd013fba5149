//! Route template engine: apply, preview and roll back subject lists
//!
//! The engine holds the active subject list and a one-level undo buffer.
//! Every apply or expert edit snapshots the previous list; `rollback`
//! restores it once. Switching modes never touches the list.

use console_types::{
    ConsoleError, ConsoleResult, EditMode, RouteImpact, RouteTemplate, RouteTemplateId,
};
use tracing::{debug, info};

/// Callback fired with the new subject list after every change
pub type RoutesListener = Box<dyn FnMut(&[String]) + Send>;

pub struct RouteTemplateEngine {
    mode: EditMode,
    subjects: Vec<String>,
    undo: Option<Vec<String>>,
    staged: Option<RouteTemplate>,
    listeners: Vec<RoutesListener>,
}

impl std::fmt::Debug for RouteTemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTemplateEngine")
            .field("mode", &self.mode)
            .field("subjects", &self.subjects)
            .field("undo", &self.undo)
            .field("staged", &self.staged.as_ref().map(|t| &t.id))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for RouteTemplateEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RouteTemplateEngine {
    pub fn new(subjects: Vec<String>) -> Self {
        Self {
            mode: EditMode::Basic,
            subjects,
            undo: None,
            staged: None,
            listeners: Vec::new(),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "Route edit mode changed");
            self.mode = mode;
        }
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// The subject list as line-delimited text for expert editing
    pub fn expert_text(&self) -> String {
        self.subjects.join("\n")
    }

    pub fn can_rollback(&self) -> bool {
        self.undo.is_some()
    }

    pub fn on_routes_change(&mut self, listener: RoutesListener) {
        self.listeners.push(listener);
    }

    /// Compute the impact of `template` and stage it for a guided apply.
    pub fn preview(&mut self, template: &RouteTemplate) -> RouteImpact {
        let impact = RouteImpact::between(&self.subjects, &template.subjects);
        self.staged = Some(template.clone());
        impact
    }

    pub fn staged(&self) -> Option<&RouteTemplate> {
        self.staged.as_ref()
    }

    /// Replace the subject list with the template's subjects.
    pub fn apply_template(&mut self, template: &RouteTemplate) -> ConsoleResult<RouteImpact> {
        if template.is_empty() {
            return Err(ConsoleError::EmptyTemplate(template.id.clone()));
        }
        if self.mode == EditMode::Guided && self.staged.as_ref() != Some(template) {
            return Err(ConsoleError::PreviewRequired(template.id.clone()));
        }

        let impact = RouteImpact::between(&self.subjects, &template.subjects);
        let previous = std::mem::replace(&mut self.subjects, template.subjects.clone());
        self.undo = Some(previous);
        self.staged = None;
        info!(
            template = %template.id,
            added = impact.added.len(),
            removed = impact.removed.len(),
            "Route template applied"
        );
        self.notify();
        Ok(impact)
    }

    /// Look up `id` in `catalog` and apply it. Unknown ids change nothing.
    pub fn apply_by_id(
        &mut self,
        catalog: &[RouteTemplate],
        id: &RouteTemplateId,
    ) -> ConsoleResult<RouteImpact> {
        let template = catalog
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| ConsoleError::TemplateNotFound(id.clone()))?;
        self.apply_template(template)
    }

    /// Replace the list from free text, one subject per non-blank line.
    pub fn edit_expert(&mut self, text: &str) -> ConsoleResult<&[String]> {
        if self.mode != EditMode::Expert {
            return Err(ConsoleError::ModeMismatch {
                expected: EditMode::Expert,
                actual: self.mode,
            });
        }
        let parsed: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let previous = std::mem::replace(&mut self.subjects, parsed);
        self.undo = Some(previous);
        debug!(count = self.subjects.len(), "Expert route edit");
        self.notify();
        Ok(&self.subjects)
    }

    /// Restore the list from before the last apply or edit.
    ///
    /// Returns `false` when there is nothing to restore.
    pub fn rollback(&mut self) -> bool {
        let Some(previous) = self.undo.take() else {
            return false;
        };
        self.subjects = previous;
        info!(count = self.subjects.len(), "Routes rolled back");
        self.notify();
        true
    }

    /// Start over from a new baseline, dropping undo and staged state.
    pub fn reseed(&mut self, subjects: Vec<String>) {
        self.subjects = subjects;
        self.undo = None;
        self.staged = None;
        self.notify();
    }

    fn notify(&mut self) {
        for listener in self.listeners.iter_mut() {
            listener(&self.subjects);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn subjects(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn custom_health() -> RouteTemplate {
        RouteTemplate::new("custom-health", "Custom", subjects(&["swarm.custom.*", "swarm.health.*"]))
    }

    #[test]
    fn test_rollback_restores_exactly() {
        let mut engine = RouteTemplateEngine::new(subjects(&["swarm.default.*"]));
        engine.apply_template(&custom_health()).unwrap();
        assert_eq!(engine.subjects(), subjects(&["swarm.custom.*", "swarm.health.*"]));

        assert!(engine.rollback());
        assert_eq!(engine.subjects(), subjects(&["swarm.default.*"]));
        assert!(!engine.rollback());
        assert_eq!(engine.subjects(), subjects(&["swarm.default.*"]));
    }

    #[test]
    fn test_mode_switch_preserves_subjects() {
        let mut engine = RouteTemplateEngine::new(subjects(&["b.*", "a.*"]));
        for mode in [EditMode::Guided, EditMode::Expert, EditMode::Basic] {
            engine.set_mode(mode);
            assert_eq!(engine.subjects(), subjects(&["b.*", "a.*"]));
        }
    }

    #[test]
    fn test_guided_requires_preview() {
        let mut engine = RouteTemplateEngine::new(subjects(&["swarm.default.*"]));
        engine.set_mode(EditMode::Guided);
        let template = custom_health();
        assert!(matches!(
            engine.apply_template(&template),
            Err(ConsoleError::PreviewRequired(_))
        ));

        let impact = engine.preview(&template);
        assert_eq!(impact.removed, subjects(&["swarm.default.*"]));
        assert_eq!(impact.added.len(), 2);
        engine.apply_template(&template).unwrap();
        assert!(engine.staged().is_none());
    }

    #[test]
    fn test_expert_edit() {
        let mut engine = RouteTemplateEngine::new(subjects(&["x.*"]));
        assert!(matches!(
            engine.edit_expert("a.*"),
            Err(ConsoleError::ModeMismatch { .. })
        ));

        engine.set_mode(EditMode::Expert);
        let edited = engine.edit_expert("  swarm.b.*\n\n swarm.a.* \n   \nswarm.b.*").unwrap();
        assert_eq!(edited, subjects(&["swarm.b.*", "swarm.a.*", "swarm.b.*"]));
        assert_eq!(engine.expert_text(), "swarm.b.*\nswarm.a.*\nswarm.b.*");
        assert!(engine.rollback());
        assert_eq!(engine.subjects(), subjects(&["x.*"]));
    }

    #[test]
    fn test_unknown_and_empty_templates() {
        let mut engine = RouteTemplateEngine::new(subjects(&["x.*"]));
        let err = engine
            .apply_by_id(&RouteTemplate::builtin(), &RouteTemplateId::new("missing"))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::TemplateNotFound(_)));

        let empty = RouteTemplate::new("empty", "Empty", Vec::new());
        assert!(matches!(
            engine.apply_template(&empty),
            Err(ConsoleError::EmptyTemplate(_))
        ));
        assert_eq!(engine.subjects(), subjects(&["x.*"]));
        assert!(!engine.can_rollback());
    }

    #[test]
    fn test_listeners_fire() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut engine = RouteTemplateEngine::new(subjects(&["x.*"]));
        engine.on_routes_change(Box::new(move |routes| {
            sink.lock().unwrap().push(routes.to_vec());
        }));
        engine.apply_template(&custom_health()).unwrap();
        engine.rollback();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], subjects(&["x.*"]));
    }
}
