//! Task execution.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{Envelope, MAX_ATTEMPTS, Queue, TASK_QUEUE, Task};
use crate::cache::KeyValueCache;
use crate::metrics::Metrics;
use crate::models::key::{self, EntityKind};
use crate::services::{email, featured_speaker};
use crate::store::EntityStore;

/// Outcome of handling one queue payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handled {
    Done,
    Requeued,
    Dropped,
}

/// Pops tasks from the queue and runs them.
pub struct TaskWorker {
    queue: Arc<dyn Queue>,
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn KeyValueCache>,
    mailer: Arc<dyn email::Mailer>,
    metrics: Arc<Metrics>,
    poll_timeout_secs: u64,
}

impl TaskWorker {
    pub fn new(
        queue: Arc<dyn Queue>,
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn KeyValueCache>,
        mailer: Arc<dyn email::Mailer>,
        metrics: Arc<Metrics>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            queue,
            store,
            cache,
            mailer,
            metrics,
            poll_timeout_secs,
        }
    }

    /// Process tasks until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("task worker started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                popped = self.queue.pop(TASK_QUEUE, self.poll_timeout_secs.max(1)) => {
                    match popped {
                        Ok(Some(raw)) => {
                            self.handle(&raw).await;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, "failed to pop task; backing off");
                            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }

        info!("task worker stopped");
    }

    /// Process everything currently queued, including retries, and return
    /// the number of payloads handled.
    pub async fn drain(&self) -> Result<usize> {
        let mut handled = 0;
        while let Some(raw) = self.queue.pop(TASK_QUEUE, 0).await? {
            self.handle(&raw).await;
            handled += 1;
        }
        Ok(handled)
    }

    async fn handle(&self, raw: &str) -> Handled {
        let mut envelope: Envelope = match serde_json::from_str(raw) {
            Ok(e) => e,
            Err(e) => {
                error!(error = %e, "dropping malformed task payload");
                self.metrics.record_task("unknown", "malformed");
                return Handled::Dropped;
            }
        };

        let kind = envelope.task.kind();
        envelope.attempts += 1;

        match self.execute(&envelope.task).await {
            Ok(()) => {
                debug!(kind, attempts = envelope.attempts, "task completed");
                self.metrics.record_task(kind, "ok");
                Handled::Done
            }
            Err(e) if envelope.attempts < MAX_ATTEMPTS => {
                warn!(error = %e, kind, attempts = envelope.attempts, "task failed; retrying");
                self.metrics.record_task(kind, "retry");
                self.requeue(&envelope).await
            }
            Err(e) => {
                error!(error = %e, kind, attempts = envelope.attempts, "task failed; giving up");
                self.metrics.record_task(kind, "failed");
                Handled::Dropped
            }
        }
    }

    async fn requeue(&self, envelope: &Envelope) -> Handled {
        let payload = match serde_json::to_string(envelope) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "failed to serialize task for retry");
                return Handled::Dropped;
            }
        };
        match self.queue.push(TASK_QUEUE, &payload).await {
            Ok(()) => Handled::Requeued,
            Err(e) => {
                error!(error = %e, "failed to requeue task");
                Handled::Dropped
            }
        }
    }

    async fn execute(&self, task: &Task) -> Result<()> {
        match task {
            Task::SendConfirmationEmail {
                email,
                conference_info,
            } => {
                let (subject, body) = email::conference_confirmation(conference_info);
                self.mailer.send(email, &subject, &body).await
            }
            Task::SetFeaturedSpeaker {
                conference_key,
                speaker_key,
            } => {
                let conference_id = key::decode(EntityKind::Conference, conference_key)?;
                let speaker_id = key::decode(EntityKind::Speaker, speaker_key)?;

                featured_speaker::update_featured_speaker(
                    self.store.as_ref(),
                    self.cache.as_ref(),
                    conference_id,
                    speaker_id,
                )
                .await
                .context("failed to update featured speaker")?;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for TaskWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskWorker").finish()
    }
}
