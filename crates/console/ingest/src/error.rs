//! Error types for the async edge

use console_types::{classify_failure, ConsoleError, FailureKind};

/// Failure talking to an external collaborator
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Stream closed: {0}")]
    Closed(String),
}

impl TransportError {
    /// Classify by inspecting the rendered message.
    pub fn classify(&self) -> FailureKind {
        classify_failure(&self.to_string())
    }
}

/// Errors that can occur in ingestion, polling and launch submission
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: TransportError },

    #[error("Launch failed ({kind}): {source}")]
    LaunchFailed {
        kind: FailureKind,
        source: TransportError,
    },

    #[error("Console error: {0}")]
    Console(#[from] ConsoleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl IngestError {
    /// Failure classification, when the error came from a collaborator.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Transport(e) => Some(e.classify()),
            Self::RetriesExhausted { last, .. } => Some(last.classify()),
            Self::LaunchFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type alias for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
