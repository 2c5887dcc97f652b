use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Fetcher metrics
    pub fetch_requests: IntCounterVec,
    pub fetch_failures: IntCounterVec,
    pub fetch_duration: HistogramVec,

    // Parser metrics
    pub parse_failures: IntCounter,

    // Cache metrics
    pub cache_hits: IntCounter,
    pub cache_misses: IntCounter,
    pub token_expiry_unix_ms: IntGauge,

    // Authorized client metrics
    pub api_requests: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("credentialcache".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Fetcher
            fetch_requests: IntCounterVec::new(Opts::new("fetch_requests_total","Total token fetch attempts by fetcher",),&["fetcher"],).unwrap(),
            fetch_failures: IntCounterVec::new(Opts::new("fetch_failures_total", "Token fetch failures by reason"),&["fetcher", "reason"],).unwrap(),
            fetch_duration: HistogramVec::new(HistogramOpts::new("fetch_duration_seconds", "Token fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["fetcher"],).unwrap(),

            parse_failures: IntCounter::new("parse_extraction_failures_total","Parser/extraction failures",).unwrap(),

            // Cache
            cache_hits: IntCounter::new("cache_hits_total", "Token served from cache without fetching").unwrap(),
            cache_misses: IntCounter::new("cache_misses_total", "Token requests that found the cache stale").unwrap(),
            token_expiry_unix_ms: IntGauge::new("token_expiry_unix_milliseconds", "Cached token expiry timestamp").unwrap(),

            // Client
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "Authorized API requests by outcome"),&["method", "outcome"],).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.fetch_requests.clone()),
            Box::new(metrics.fetch_failures.clone()),
            Box::new(metrics.fetch_duration.clone()),
            Box::new(metrics.parse_failures.clone()),
            Box::new(metrics.cache_hits.clone()),
            Box::new(metrics.cache_misses.clone()),
            Box::new(metrics.token_expiry_unix_ms.clone()),
            Box::new(metrics.api_requests.clone()),
            Box::new(metrics.config_validation_errors.clone()),
            Box::new(metrics.up.clone()),
        ];
        for collector in collectors {
            if let Err(e) = reg.register(collector) {
                tracing::error!("metric registration failed: {}", e);
            }
        }

        metrics
    }
}
