//! Scheduled operations.
//!
//! The announcement refresh runs on a fixed interval and on demand through
//! the `/cron/{key}` endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::KeyValueCache;
use crate::services::announcement;
use crate::store::EntityStore;

/// Result of a cron run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronResult {
    /// Cron ran successfully.
    Completed {
        /// Tasks executed.
        tasks_run: Vec<String>,
        /// Duration of the run.
        duration_ms: u64,
    },
    /// Cron failed with an error.
    Failed(String),
}

/// Cron service for scheduled operations.
#[derive(Clone)]
pub struct CronService {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn KeyValueCache>,
}

impl CronService {
    pub fn new(store: Arc<dyn EntityStore>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { store, cache }
    }

    /// Run all scheduled tasks once.
    pub async fn run(&self) -> CronResult {
        let start = Instant::now();
        let mut tasks_run = Vec::new();

        match announcement::refresh_announcement(self.store.as_ref(), self.cache.as_ref()).await {
            Ok(text) => {
                let state = if text.is_empty() { "cleared" } else { "set" };
                tasks_run.push(format!("refresh_announcement: {state}"));
            }
            Err(e) => {
                warn!(error = %e, "failed to refresh announcement");
                return CronResult::Failed(e.to_string());
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(duration_ms = duration_ms, tasks = ?tasks_run, "cron completed");

        CronResult::Completed {
            tasks_run,
            duration_ms,
        }
    }

    /// Run every `interval` until `shutdown` flips to true.
    pub async fn run_every(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        debug!("cron scheduler stopping");
                        break;
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for CronService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronService").finish()
    }
}
