//! Frame sources for the live ingestion stream

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::error::{IngestResult, TransportError};

/// Stream of text frames from one connection
pub type FrameStream = BoxStream<'static, Result<String, TransportError>>;

/// Something that can be connected to for a stream of text frames.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Open a connection.
    async fn connect(&self) -> Result<FrameStream, TransportError>;

    /// Name for logging.
    fn name(&self) -> &str {
        "frames"
    }

    /// True when a cleanly closed stream means the source is exhausted,
    /// rather than a dropped connection to retry.
    fn ends_on_close(&self) -> bool {
        false
    }
}

// ── Replay ───────────────────────────────────────────────────────────

/// Serves a recorded list of frames once per connection
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: Vec<String>,
}

impl ReplaySource {
    pub fn new(frames: Vec<String>) -> Self {
        Self { frames }
    }

    /// Parse a recording with one frame per line. Blank lines are skipped.
    pub fn from_text(text: &str) -> Self {
        Self::new(
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub async fn from_file(path: impl AsRef<Path>) -> IngestResult<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_text(&text))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl FrameSource for ReplaySource {
    async fn connect(&self) -> Result<FrameStream, TransportError> {
        Ok(stream::iter(self.frames.clone().into_iter().map(Ok)).boxed())
    }

    fn name(&self) -> &str {
        "replay"
    }

    fn ends_on_close(&self) -> bool {
        true
    }
}

// ── Scripted ─────────────────────────────────────────────────────────

/// One scripted connection attempt
#[derive(Debug, Clone)]
pub enum ScriptedConnection {
    /// The attempt fails before any frame arrives
    Refuse(TransportError),
    /// The attempt succeeds and yields these items, then closes
    Serve(Vec<Result<String, TransportError>>),
}

/// Plays back a script of connection attempts.
///
/// Once the script is used up, `connect` waits forever, so the ingestor
/// idles until it is shut down.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<ScriptedConnection>>,
    connects: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = ScriptedConnection>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            connects: AtomicUsize::new(0),
        }
    }

    /// Number of `connect` calls so far
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn next_connection(&self) -> Result<Option<ScriptedConnection>, TransportError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| TransportError::Connection("script lock poisoned".to_string()))?;
        Ok(script.pop_front())
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn connect(&self) -> Result<FrameStream, TransportError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.next_connection()? {
            Some(ScriptedConnection::Refuse(error)) => Err(error),
            Some(ScriptedConnection::Serve(items)) => Ok(stream::iter(items).boxed()),
            None => {
                std::future::pending::<()>().await;
                Err(TransportError::Closed("script exhausted".to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
