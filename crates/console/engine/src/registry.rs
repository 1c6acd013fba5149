//! Ordered panel registry for console surfaces

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelLayout {
    #[default]
    Grid,
    FullWidth,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    /// Lower values render first; built-ins use multiples of 10
    pub order: i32,
    #[serde(default)]
    pub layout: PanelLayout,
}

impl Panel {
    pub fn new(id: impl Into<String>, order: i32, layout: PanelLayout) -> Self {
        Self {
            id: id.into(),
            order,
            layout,
        }
    }
}

/// Registry keyed by panel id. Registering an id twice keeps the first.
#[derive(Clone, Debug, Default)]
pub struct PanelRegistry {
    panels: Vec<Panel>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for panel in [
            Panel::new("system", 10, PanelLayout::Grid),
            Panel::new("alerts", 20, PanelLayout::Grid),
            Panel::new("teams", 30, PanelLayout::Grid),
            Panel::new("mcp", 40, PanelLayout::Grid),
            Panel::new("missions", 50, PanelLayout::FullWidth),
            Panel::new("runs", 60, PanelLayout::FullWidth),
        ] {
            registry.register(panel);
        }
        registry
    }

    /// Returns `false` if the id was already registered.
    pub fn register(&mut self, panel: Panel) -> bool {
        if self.panels.iter().any(|p| p.id == panel.id) {
            return false;
        }
        self.panels.push(panel);
        true
    }

    pub fn unregister(&mut self, id: &str) -> Option<Panel> {
        let index = self.panels.iter().position(|p| p.id == id)?;
        Some(self.panels.remove(index))
    }

    /// Panels by ascending order; ties keep registration order
    pub fn panels(&self) -> Vec<&Panel> {
        let mut sorted: Vec<&Panel> = self.panels.iter().collect();
        sorted.sort_by_key(|p| p.order);
        sorted
    }

    pub fn panels_with_layout(&self, layout: PanelLayout) -> Vec<&Panel> {
        self.panels()
            .into_iter()
            .filter(|p| p.layout == layout)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
