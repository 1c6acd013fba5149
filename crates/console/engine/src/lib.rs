//! Mission Console Engine
//!
//! The synchronous core of the console. It owns no threads and takes no
//! locks: every operation is a method call on [`MissionConsole`], which
//! is the single writer of its state.
//!
//! # Components
//!
//! - [`SignalNormalizer`]: total mapping of raw frames to `SignalDetail`
//! - [`TrustGate`]: bypass-or-intercept decision against a live threshold
//! - [`DeliverablesQueue`]: ordered, de-duplicated review queue with audit log
//! - [`BlueprintStore`]: current blueprint, saved list, optional write-through
//! - [`ReadinessAggregator`]: go/no-go that always names its blockers
//! - [`TeamInstantiationWizard`]: four-step gated launch flow
//! - [`RouteTemplateEngine`]: subject lists with preview and one-level undo
//!
//! Async concerns (live ingestion, health polling, proposal submission)
//! live in `console-ingest`, which feeds this crate through a pump.

#![deny(unsafe_code)]

pub mod blueprint_store;
pub mod config;
pub mod console;
pub mod deliverables;
pub mod events;
pub mod feed;
pub mod normalizer;
pub mod persistence;
pub mod readiness;
pub mod registry;
pub mod route_templates;
pub mod triage;
pub mod trust_gate;
pub mod wizard;

pub use blueprint_store::BlueprintStore;
pub use config::EngineConfig;
pub use console::{ConsoleSnapshot, MissionConsole};
pub use deliverables::DeliverablesQueue;
pub use events::ConsoleEvent;
pub use feed::ActivityFeed;
pub use normalizer::SignalNormalizer;
pub use persistence::{KeyValueStore, MemoryStore};
pub use readiness::{ReadinessAggregator, UNSPECIFIED_BLOCKER};
pub use registry::{Panel, PanelLayout, PanelRegistry};
pub use route_templates::{RouteTemplateEngine, RoutesListener};
pub use triage::{TriageOutcome, TriageRoute};
pub use trust_gate::{GateDecision, InterceptReason, TrustGate, TrustPolicy};
pub use wizard::{ReadinessOutcome, ReadinessTicket, TeamInstantiationWizard};
