//! Live signal ingestion with reconnect
//!
//! The ingestor task connects to a [`FrameSource`], forwards frames in
//! arrival order over an `mpsc` channel, and reconnects with bounded
//! exponential backoff when the connection fails. Connection transitions
//! are sent on the same channel so the consumer sees them in order with
//! the frames around them.

use std::sync::Arc;

use console_types::ConnectionState;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backoff::Backoff;
use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult, TransportError};
use crate::source::FrameSource;

/// Items delivered by the ingestor
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    /// A raw text frame, not yet normalized
    Frame(String),
    Connection(ConnectionState),
}

pub struct SignalIngestor {
    source: Arc<dyn FrameSource>,
    config: IngestConfig,
}

impl SignalIngestor {
    pub fn new(source: Arc<dyn FrameSource>, config: IngestConfig) -> Self {
        Self { source, config }
    }

    /// Start the ingestion task.
    pub fn spawn(self) -> IngestorHandle {
        let (event_tx, event_rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(source = self.source.name(), "Starting signal ingestion");
        let task = tokio::spawn(run(self.source, self.config, event_tx, shutdown_rx));

        IngestorHandle {
            events: event_rx,
            shutdown_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running ingestor; aborts the task when dropped
pub struct IngestorHandle {
    events: mpsc::Receiver<IngestEvent>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<IngestResult<()>>>,
}

impl IngestorHandle {
    /// Wait for the next event. `None` once the task has finished and the
    /// channel is drained.
    pub async fn recv(&mut self) -> Option<IngestEvent> {
        self.events.recv().await
    }

    /// Take an event if one is ready.
    pub fn try_recv(&mut self) -> Option<IngestEvent> {
        self.events.try_recv().ok()
    }

    /// Ask the task to stop. Pending sleeps and reads are cancelled.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the task to finish and return its result. Undelivered
    /// events are discarded so a task blocked on a full channel can exit.
    pub async fn join(mut self) -> IngestResult<()> {
        self.events.close();
        match self.task.take() {
            Some(task) => task.await.map_err(|e| IngestError::Task(e.to_string()))?,
            None => Ok(()),
        }
    }
}

impl Drop for IngestorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Send an event unless shutdown is requested first. Returns `false` when
/// the event was not delivered.
async fn emit(
    tx: &mpsc::Sender<IngestEvent>,
    shutdown_rx: &mut watch::Receiver<bool>,
    event: IngestEvent,
) -> bool {
    if *shutdown_rx.borrow() {
        return false;
    }
    tokio::select! {
        sent = tx.send(event) => sent.is_ok(),
        _ = shutdown_rx.changed() => false,
    }
}

/// How one connection ended
enum Disconnect {
    Failed(TransportError),
    Exhausted,
    Stopped,
}

async fn run(
    source: Arc<dyn FrameSource>,
    config: IngestConfig,
    tx: mpsc::Sender<IngestEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> IngestResult<()> {
    let mut backoff = Backoff::new(config.backoff.clone());

    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        let connecting = IngestEvent::Connection(ConnectionState::Connecting);
        if !emit(&tx, &mut shutdown_rx, connecting).await {
            break;
        }

        let connected = tokio::select! {
            result = source.connect() => result,
            _ = shutdown_rx.changed() => break,
        };

        let disconnect = match connected {
            Ok(stream) => {
                info!(source = source.name(), "Ingestion connected");
                let event = IngestEvent::Connection(ConnectionState::Connected);
                if !emit(&tx, &mut shutdown_rx, event).await {
                    break;
                }
                read_frames(stream, source.as_ref(), &tx, &mut shutdown_rx, &mut backoff).await
            }
            Err(e) => Disconnect::Failed(e),
        };

        let failure = match disconnect {
            Disconnect::Failed(e) => e,
            Disconnect::Exhausted => {
                info!(source = source.name(), "Ingestion source exhausted");
                break;
            }
            Disconnect::Stopped => break,
        };

        let kind = failure.classify();
        match backoff.next_delay() {
            Some(delay) => {
                let attempt = backoff.attempt();
                let retry_in_ms = delay.as_millis() as u64;
                warn!(
                    source = source.name(),
                    attempt,
                    delay_ms = retry_in_ms,
                    failure = %kind,
                    error = %failure,
                    "Ingestion disconnected; retrying"
                );
                let degraded = ConnectionState::Degraded {
                    attempt,
                    failure: kind,
                    retry_in_ms,
                };
                if !emit(&tx, &mut shutdown_rx, IngestEvent::Connection(degraded)).await {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown_rx.changed() => break,
                }
            }
            None => {
                let attempts = backoff.attempt();
                error!(
                    source = source.name(),
                    attempts,
                    failure = %kind,
                    error = %failure,
                    "Ingestion retries exhausted"
                );
                let failed = ConnectionState::Failed { failure: kind };
                let _ = emit(&tx, &mut shutdown_rx, IngestEvent::Connection(failed)).await;
                return Err(IngestError::RetriesExhausted {
                    attempts,
                    last: failure,
                });
            }
        }
    }

    info!(source = source.name(), "Signal ingestion stopped");
    let closed = IngestEvent::Connection(ConnectionState::Closed);
    if !emit(&tx, &mut shutdown_rx, closed.clone()).await {
        // stopping; deliver only if there is room
        let _ = tx.try_send(closed);
    }
    Ok(())
}

async fn read_frames(
    mut stream: crate::source::FrameStream,
    source: &dyn FrameSource,
    tx: &mpsc::Sender<IngestEvent>,
    shutdown_rx: &mut watch::Receiver<bool>,
    backoff: &mut Backoff,
) -> Disconnect {
    let mut received = false;
    loop {
        let next = tokio::select! {
            item = stream.next() => item,
            _ = shutdown_rx.changed() => return Disconnect::Stopped,
        };
        match next {
            Some(Ok(frame)) => {
                // a connection only counts as recovered once it delivers
                if !received {
                    received = true;
                    backoff.reset();
                }
                debug!(bytes = frame.len(), "Frame received");
                if !emit(tx, shutdown_rx, IngestEvent::Frame(frame)).await {
                    return Disconnect::Stopped;
                }
            }
            Some(Err(e)) => return Disconnect::Failed(e),
            None if source.ends_on_close() => return Disconnect::Exhausted,
            None => {
                return Disconnect::Failed(TransportError::Closed(
                    "connection closed by peer".to_string(),
                ))
            }
        }
    }
}
