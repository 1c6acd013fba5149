//! Async edge of the mission console
//!
//! Everything that waits on the outside world lives here:
//!
//! - [`SignalIngestor`]: reads text frames from a [`FrameSource`] and
//!   reconnects with bounded exponential backoff.
//! - [`HealthPoller`]: probes launch dependencies on an interval and emits
//!   [`ReadinessSnapshot`](console_types::ReadinessSnapshot)s.
//! - [`LaunchExecutor`]: carries out a wizard launch plan against a
//!   [`ProposalSink`].
//! - [`ConsolePump`]: feeds ingest and health updates into the
//!   single-writer [`MissionConsole`](console_engine::MissionConsole).
//!
//! Every spawned task watches a shutdown flag and is aborted when its
//! handle is dropped.

#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod health;
pub mod ingestor;
pub mod proposals;
pub mod pump;
pub mod source;

pub use backoff::Backoff;
pub use config::{BackoffConfig, IngestConfig};
pub use error::{IngestError, IngestResult, TransportError};
pub use health::{HealthHandle, HealthPoller, HealthSource};
pub use ingestor::{IngestEvent, IngestorHandle, SignalIngestor};
pub use proposals::{LaunchExecutor, LaunchReceipt, ProposalSink};
pub use pump::ConsolePump;
pub use source::{FrameSource, FrameStream, ReplaySource, ScriptedConnection, ScriptedSource};
