//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub path: String,
    pub status: u16,
}

/// Registration attempt labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RegistrationLabels {
    pub op: String,
    pub outcome: String,
}

/// Entity query labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct QueryLabels {
    pub collection: String,
}

/// Background task labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TaskLabels {
    pub kind: String,
    pub result: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// HTTP request counter by method/path/status.
    pub http_requests: Family<HttpLabels, Counter>,

    /// HTTP request duration histogram.
    pub http_duration_seconds: Family<HttpLabels, Histogram>,

    /// Registration attempts by direction and outcome.
    pub registrations: Family<RegistrationLabels, Counter>,

    /// Filtered queries by collection.
    pub queries: Family<QueryLabels, Counter>,

    /// Background tasks by kind and result.
    pub tasks: Family<TaskLabels, Counter>,

    /// Cache hit counter.
    pub cache_hits: Counter,

    /// Cache miss counter.
    pub cache_misses: Counter,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<HttpLabels, Counter>::default();
        registry.register(
            "http_requests",
            "Total HTTP requests",
            http_requests.clone(),
        );

        let http_duration_seconds = Family::<HttpLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 12))
        });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_duration_seconds.clone(),
        );

        let registrations = Family::<RegistrationLabels, Counter>::default();
        registry.register(
            "conference_registrations",
            "Conference registration attempts",
            registrations.clone(),
        );

        let queries = Family::<QueryLabels, Counter>::default();
        registry.register(
            "entity_queries",
            "Filtered entity queries",
            queries.clone(),
        );

        let tasks = Family::<TaskLabels, Counter>::default();
        registry.register("tasks", "Background tasks processed", tasks.clone());

        let cache_hits = Counter::default();
        registry.register("cache_hits", "Cache hit count", cache_hits.clone());

        let cache_misses = Counter::default();
        registry.register(
            "cache_misses",
            "Cache miss count",
            cache_misses.clone(),
        );

        Self {
            registry,
            http_requests,
            http_duration_seconds,
            registrations,
            queries,
            tasks,
            cache_hits,
            cache_misses,
        }
    }

    /// Record an HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: normalize_path(path),
            status,
        };

        self.http_requests.get_or_create(&labels).inc();
        self.http_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a registration attempt; `outcome` is e.g. "registered" or "sold_out".
    pub fn record_registration(&self, op: &str, outcome: &str) {
        self.registrations
            .get_or_create(&RegistrationLabels {
                op: op.to_string(),
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Record a filtered query against a collection.
    pub fn record_query(&self, collection: &str) {
        self.queries
            .get_or_create(&QueryLabels {
                collection: collection.to_string(),
            })
            .inc();
    }

    /// Record a processed background task.
    pub fn record_task(&self, kind: &str, result: &str) {
        self.tasks
            .get_or_create(&TaskLabels {
                kind: kind.to_string(),
                result: result.to_string(),
            })
            .inc();
    }

    /// Record a cache hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.inc();
    }

    /// Record a cache miss.
    pub fn record_cache_miss(&self) {
        self.cache_misses.inc();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible, and all metric
    /// labels use derived `EncodeLabelSet` impls that do not produce
    /// `fmt::Error`.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}

/// Normalize a path for metrics labels.
///
/// Websafe keys and numeric segments become `{key}` to limit cardinality.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|s| {
            if is_key_segment(s) {
                "{key}".to_string()
            } else {
                s.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_key_segment(segment: &str) -> bool {
    use crate::models::key::{self, EntityKind};

    (!segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
        || [EntityKind::Conference, EntityKind::Session, EntityKind::Speaker]
            .into_iter()
            .any(|kind| key::try_decode(kind, segment).is_some())
}
