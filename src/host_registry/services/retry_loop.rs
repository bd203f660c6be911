//! Fixed-interval driver for registry retry passes.

use super::registry::{HostRegistry, RetryReport};
use crate::host_registry::ports::AgentConnector;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Smallest interval the loop will tick at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Runs [`HostRegistry::retry_and_list`] on a fixed interval until shutdown.
///
/// Every tick retries every pending endpoint; there is no backoff and no
/// attempt limit.
pub struct RetryLoop<K>
where
    K: AgentConnector,
{
    registry: Arc<HostRegistry<K>>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl<K> RetryLoop<K>
where
    K: AgentConnector,
{
    /// Creates a retry loop. A zero interval is raised to one millisecond.
    #[must_use]
    pub fn new(
        registry: Arc<HostRegistry<K>>,
        interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            registry,
            interval: interval.max(MIN_INTERVAL),
            shutdown_rx,
        }
    }

    /// Ticks until the shutdown signal turns `true` or its sender is dropped.
    ///
    /// The first pass runs immediately. Ticks missed while a slow pass is
    /// running are skipped rather than replayed.
    pub async fn run(mut self) {
        info!(interval = ?self.interval, "starting agent retry loop");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("agent retry loop stopped");
    }

    /// Performs a single retry pass immediately.
    pub async fn run_once(&self) -> RetryReport {
        let report = self.registry.retry_and_list().await;
        debug!(
            clients = report.clients().len(),
            failures = report.errors().len(),
            "retry pass complete"
        );
        report
    }
}
