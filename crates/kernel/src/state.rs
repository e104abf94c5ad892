//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::Client as RedisClient;
use tracing::info;

use crate::cache::{CacheLayer, KeyValueCache, MemoryCache};
use crate::config::Config;
use crate::db;
use crate::metrics::Metrics;
use crate::middleware::TokenVerifier;
use crate::services::email::{self, Mailer};
use crate::store::{EntityStore, MemoryStore, PgStore};
use crate::tasks::{CronService, MemoryQueue, Queue, RedisQueue, TaskDispatcher, TaskWorker};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Entity persistence.
    store: Arc<dyn EntityStore>,

    /// Announcement and featured-speaker strings.
    cache: Arc<dyn KeyValueCache>,

    /// Enqueues background tasks.
    tasks: TaskDispatcher,

    /// Runs background tasks.
    task_worker: Arc<TaskWorker>,

    /// Scheduled announcement refresh.
    cron: CronService,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,

    /// Bearer token verification.
    token_verifier: TokenVerifier,

    /// Secret path segment for `/cron/{key}`.
    cron_key: String,

    /// Public site URL used in outgoing mail.
    site_url: String,
}

/// Collaborators the state is assembled from.
struct Backends {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn KeyValueCache>,
    queue: Arc<dyn Queue>,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create new application state backed by PostgreSQL and Redis.
    pub async fn new(config: &Config) -> Result<Self> {
        // Create PostgreSQL pool
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        // Run migrations
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        // Create Redis client
        let redis = RedisClient::open(config.redis_url.as_str())
            .context("failed to create Redis client")?;

        // Test Redis connection
        let mut conn = redis
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .context("Redis PING failed")?;

        let mailer: Arc<dyn Mailer> =
            Arc::from(email::from_config(config).context("failed to create mailer")?);

        info!("application state initialized");

        Ok(Self::assemble(
            Backends {
                store: Arc::new(PgStore::new(pool)),
                cache: Arc::new(CacheLayer::new(redis.clone())),
                queue: Arc::new(RedisQueue::new(redis)),
                mailer,
            },
            config.jwt_secret.as_bytes(),
            &config.cron_key,
            &config.site_url,
            config.task_poll_timeout_secs,
        ))
    }

    /// State with in-process store, cache and queue.
    ///
    /// Nothing runs the task worker; call `task_worker().drain()` to process
    /// queued tasks.
    pub fn in_memory(jwt_secret: &str, cron_key: &str, mailer: Arc<dyn Mailer>) -> Self {
        Self::assemble(
            Backends {
                store: Arc::new(MemoryStore::new()),
                cache: Arc::new(MemoryCache::new()),
                queue: Arc::new(MemoryQueue::new()),
                mailer,
            },
            jwt_secret.as_bytes(),
            cron_key,
            "http://localhost:3000",
            1,
        )
    }

    fn assemble(
        backends: Backends,
        jwt_secret: &[u8],
        cron_key: &str,
        site_url: &str,
        poll_timeout_secs: u64,
    ) -> Self {
        let Backends {
            store,
            cache,
            queue,
            mailer,
        } = backends;

        let metrics = Arc::new(Metrics::new());
        let task_worker = Arc::new(TaskWorker::new(
            queue.clone(),
            store.clone(),
            cache.clone(),
            mailer,
            metrics.clone(),
            poll_timeout_secs,
        ));

        Self {
            inner: Arc::new(AppStateInner {
                cron: CronService::new(store.clone(), cache.clone()),
                tasks: TaskDispatcher::new(queue),
                store,
                cache,
                task_worker,
                metrics,
                token_verifier: TokenVerifier::new(jwt_secret),
                cron_key: cron_key.to_string(),
                site_url: site_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Get the entity store.
    pub fn store(&self) -> &dyn EntityStore {
        self.inner.store.as_ref()
    }

    /// Get the key-value cache.
    pub fn cache(&self) -> &dyn KeyValueCache {
        self.inner.cache.as_ref()
    }

    /// Get the task dispatcher.
    pub fn tasks(&self) -> &TaskDispatcher {
        &self.inner.tasks
    }

    /// Get the task worker.
    pub fn task_worker(&self) -> &Arc<TaskWorker> {
        &self.inner.task_worker
    }

    /// Get the cron service.
    pub fn cron(&self) -> &CronService {
        &self.inner.cron
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    pub fn token_verifier(&self) -> &TokenVerifier {
        &self.inner.token_verifier
    }

    pub fn cron_key(&self) -> &str {
        &self.inner.cron_key
    }

    pub fn site_url(&self) -> &str {
        &self.inner.site_url
    }

    /// Check if the entity store is healthy.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.check_health().await
    }

    /// Check if the cache is healthy.
    pub async fn cache_healthy(&self) -> bool {
        self.inner.cache.check_health().await
    }
}
