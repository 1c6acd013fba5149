//! Periodic readiness polling
//!
//! A [`HealthPoller`] probes every launch dependency through a
//! [`HealthSource`] and folds the results into a [`ReadinessSnapshot`].
//! Spawned, it repeats on an interval until shut down.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use console_engine::ReadinessAggregator;
use console_types::{ReadinessSnapshot, Subsystem, SubsystemStatus};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::error::TransportError;

/// Reports the readiness of one subsystem.
#[async_trait]
pub trait HealthSource: Send + Sync {
    async fn probe(&self, subsystem: Subsystem) -> Result<SubsystemStatus, TransportError>;
}

pub struct HealthPoller {
    source: Arc<dyn HealthSource>,
    interval: Duration,
}

impl HealthPoller {
    pub fn new(source: Arc<dyn HealthSource>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Probe every subsystem once.
    ///
    /// A probe that fails to answer marks its subsystem not ready, with
    /// the classified failure as the blocker detail.
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> ReadinessSnapshot {
        let mut statuses = Vec::with_capacity(Subsystem::ALL.len());
        for subsystem in Subsystem::ALL {
            let status = match self.source.probe(subsystem).await {
                Ok(status) => status,
                Err(e) => {
                    let kind = e.classify();
                    warn!(
                        subsystem = subsystem.label(),
                        failure = %kind,
                        error = %e,
                        "Health probe failed"
                    );
                    SubsystemStatus::not_ready(subsystem, format!("{} ({})", kind.reason(), e))
                }
            };
            statuses.push(status);
        }
        let snapshot = ReadinessAggregator::snapshot_from(&statuses);
        debug!(failing = snapshot.failing().len(), "Health poll complete");
        snapshot
    }

    /// Poll on the interval, sending each snapshot over a channel.
    pub fn spawn(self, capacity: usize) -> HealthHandle {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        info!(interval_ms = self.interval.as_millis() as u64, "Starting health polling");
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }
                let snapshot = tokio::select! {
                    snapshot = self.poll_once() => snapshot,
                    _ = shutdown_rx.changed() => break,
                };
                if snapshot_tx.send(snapshot).await.is_err() {
                    break;
                }
            }
            info!("Health polling stopped");
        });

        HealthHandle {
            snapshots: snapshot_rx,
            shutdown_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running poller; aborts the task when dropped
pub struct HealthHandle {
    snapshots: mpsc::Receiver<ReadinessSnapshot>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl HealthHandle {
    pub async fn recv(&mut self) -> Option<ReadinessSnapshot> {
        self.snapshots.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ReadinessSnapshot> {
        self.snapshots.try_recv().ok()
    }

    /// Stop polling. An in-flight poll is abandoned.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for HealthHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyNats {
        polls: AtomicUsize,
    }

    #[async_trait]
    impl HealthSource for FlakyNats {
        async fn probe(&self, subsystem: Subsystem) -> Result<SubsystemStatus, TransportError> {
            if subsystem == Subsystem::Nats {
                self.polls.fetch_add(1, Ordering::SeqCst);
                return Err(TransportError::Timeout(2_000));
            }
            Ok(SubsystemStatus::ready(subsystem))
        }
    }

    fn poller() -> (Arc<FlakyNats>, HealthPoller) {
        let source = Arc::new(FlakyNats {
            polls: AtomicUsize::new(0),
        });
        let poller = HealthPoller::new(source.clone(), Duration::from_secs(5));
        (source, poller)
    }

    #[tokio::test]
    async fn test_failed_probe_names_subsystem() {
        let (_, poller) = poller();
        let snapshot = poller.poll_once().await;
        assert_eq!(snapshot.failing(), vec![Subsystem::Nats]);
        assert_eq!(snapshot.blockers.len(), 1);
        assert!(Subsystem::Nats.is_named_by(&snapshot.blockers[0]));
        assert!(snapshot.blockers[0].contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval_until_shutdown() {
        let (source, poller) = poller();
        let mut handle = poller.spawn(8);

        // first tick fires immediately
        assert!(handle.recv().await.is_some());
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(handle.recv().await.is_some());
        assert_eq!(source.polls.load(Ordering::SeqCst), 2);

        handle.shutdown();
        assert!(handle.recv().await.is_none());
    }
}
