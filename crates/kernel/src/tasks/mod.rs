//! Background tasks.
//!
//! Handlers enqueue fire-and-forget [`Task`]s through a [`TaskDispatcher`];
//! a [`TaskWorker`] pops and runs them, retrying failures a bounded number
//! of times. Delivery is at-least-once. Scheduled work (the announcement
//! refresh) lives in [`cron`].

pub mod cron;
mod queue;
mod worker;

pub use cron::{CronResult, CronService};
pub use queue::{MemoryQueue, Queue, RedisQueue};
pub use worker::TaskWorker;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Name of the queue carrying tasks.
pub const TASK_QUEUE: &str = "tasks";

/// Attempts per task before it is dropped.
pub const MAX_ATTEMPTS: u32 = 3;

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Tell an organizer their conference was created.
    SendConfirmationEmail {
        email: String,
        conference_info: String,
    },
    /// Recompute the featured speaker for a conference.
    SetFeaturedSpeaker {
        conference_key: String,
        speaker_key: String,
    },
}

impl Task {
    /// Short name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Task::SendConfirmationEmail { .. } => "send_confirmation_email",
            Task::SetFeaturedSpeaker { .. } => "set_featured_speaker",
        }
    }
}

/// Queue payload: a task plus the number of attempts already made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub task: Task,
    #[serde(default)]
    pub attempts: u32,
}

/// Enqueues tasks.
#[derive(Clone)]
pub struct TaskDispatcher {
    queue: Arc<dyn Queue>,
}

impl TaskDispatcher {
    pub fn new(queue: Arc<dyn Queue>) -> Self {
        Self { queue }
    }

    /// Enqueue a task.
    ///
    /// Best effort: a queue failure is logged and does not fail the caller.
    pub async fn dispatch(&self, task: Task) {
        let kind = task.kind();
        let envelope = Envelope { task, attempts: 0 };

        let payload = match serde_json::to_string(&envelope) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, kind, "failed to serialize task");
                return;
            }
        };

        match self.queue.push(TASK_QUEUE, &payload).await {
            Ok(()) => debug!(kind, "task enqueued"),
            Err(e) => warn!(error = %e, kind, "failed to enqueue task"),
        }
    }

    /// Number of tasks waiting.
    pub async fn pending(&self) -> anyhow::Result<u64> {
        self.queue.len(TASK_QUEUE).await
    }
}

impl std::fmt::Debug for TaskDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDispatcher").finish()
    }
}
