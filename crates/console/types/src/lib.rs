//! Mission Console Domain Types
//!
//! Everything the console core passes around is defined here: the two
//! wire shapes of an execution signal, the canonical [`SignalDetail`],
//! artifact-bearing [`CtsEnvelope`]s, mission blueprints, readiness
//! snapshots, routing templates and the wizard's launch vocabulary.
//!
//! # Key Concepts
//!
//! - **RawSignal**: a frame as delivered by the stream or the log store.
//!   Every field is optional; shape is decided by field presence.
//! - **SignalDetail**: the normalized record every consumer reads.
//! - **CtsEnvelope**: an artifact or governance halt awaiting a trust decision.
//! - **MissionBlueprint**: teams of agents drafted for a mission.
//! - **ReadinessSnapshot**: per-subsystem go/no-go flags with blockers.
//! - **RouteTemplate**: a named, ordered set of message-subject patterns.
//! - **ConnectionState**: health of the live ingestion link.
//!
//! This crate performs no I/O. Behaviour lives in `console-engine`
//! (synchronous state) and `console-ingest` (async edge).

#![deny(unsafe_code)]

mod approval;
mod blueprint;
mod connection;
mod envelope;
mod errors;
mod failure;
mod profile;
mod readiness;
mod routes;
mod signal;
mod wizard;

pub use approval::*;
pub use blueprint::*;
pub use connection::*;
pub use envelope::*;
pub use errors::*;
pub use failure::*;
pub use profile::*;
pub use readiness::*;
pub use routes::*;
pub use signal::*;
pub use wizard::*;
