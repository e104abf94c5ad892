//! Queues for background task processing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::Notify;
use tracing::debug;

/// Queue trait for background task processing.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Push an item onto the queue.
    async fn push(&self, queue: &str, item: &str) -> Result<()>;

    /// Pop an item from the queue, waiting up to `timeout_secs` (0 = don't wait).
    async fn pop(&self, queue: &str, timeout_secs: u64) -> Result<Option<String>>;

    /// Get the number of items in the queue.
    async fn len(&self, queue: &str) -> Result<u64>;

    /// Check if the queue is empty.
    async fn is_empty(&self, queue: &str) -> Result<bool> {
        Ok(self.len(queue).await? == 0)
    }
}

/// Redis-backed queue implementation.
pub struct RedisQueue {
    redis: RedisClient,
}

impl RedisQueue {
    /// Create a new Redis queue.
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    /// Get the full queue key with prefix.
    fn queue_key(&self, queue: &str) -> String {
        format!("queue:{queue}")
    }
}

#[async_trait]
impl Queue for RedisQueue {
    async fn push(&self, queue: &str, item: &str) -> Result<()> {
        let key = self.queue_key(queue);

        let mut conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .context("failed to get Redis connection")?;

        conn.rpush::<_, _, ()>(&key, item)
            .await
            .context("failed to push to queue")?;

        debug!(queue = %queue, "pushed item to queue");
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout_secs: u64) -> Result<Option<String>> {
        let key = self.queue_key(queue);

        let mut conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .context("failed to get Redis connection")?;

        // BLPOP returns (key, value) tuple or nil
        let result: Option<(String, String)> = if timeout_secs > 0 {
            conn.blpop(&key, timeout_secs as f64)
                .await
                .context("failed to pop from queue")?
        } else {
            conn.lpop(&key, None)
                .await
                .map(|v: Option<String>| v.map(|s| (key.clone(), s)))
                .context("failed to pop from queue")?
        };

        match result {
            Some((_, value)) => {
                debug!(queue = %queue, "popped item from queue");
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn len(&self, queue: &str) -> Result<u64> {
        let key = self.queue_key(queue);

        let mut conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .context("failed to get Redis connection")?;

        let len: u64 = conn.llen(&key).await.context("failed to get queue length")?;

        Ok(len)
    }
}

impl std::fmt::Debug for RedisQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueue").finish()
    }
}

/// In-process queue.
#[derive(Clone, Default)]
pub struct MemoryQueue {
    queues: Arc<Mutex<HashMap<String, VecDeque<String>>>>,
    pushed: Arc<Notify>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_pop(&self, queue: &str) -> Option<String> {
        self.queues.lock().get_mut(queue).and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    async fn push(&self, queue: &str, item: &str) -> Result<()> {
        self.queues
            .lock()
            .entry(queue.to_string())
            .or_default()
            .push_back(item.to_string());
        self.pushed.notify_waiters();
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout_secs: u64) -> Result<Option<String>> {
        if let Some(item) = self.try_pop(queue) {
            return Ok(Some(item));
        }
        if timeout_secs == 0 {
            return Ok(None);
        }

        let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);
        loop {
            let notified = self.pushed.notified();
            if let Some(item) = self.try_pop(queue) {
                return Ok(Some(item));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(self.try_pop(queue));
            }
        }
    }

    async fn len(&self, queue: &str) -> Result<u64> {
        Ok(self
            .queues
            .lock()
            .get(queue)
            .map_or(0, |items| items.len() as u64))
    }
}

impl std::fmt::Debug for MemoryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryQueue").finish()
    }
}
