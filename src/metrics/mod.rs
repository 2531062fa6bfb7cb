//! Prometheus metrics for the lead tracker.
//!
//! Covers HTTP traffic, lead mutations and aggregation runs. Everything is
//! registered on [`PROMETHEUS_REGISTRY`] by [`init_metrics`] and exported in
//! text format by [`gather_metrics`].
//!
//! # Example
//! ```no_run
//! use lead_tracker::metrics::HTTP_REQUESTS_TOTAL;
//!
//! HTTP_REQUESTS_TOTAL
//!     .with_label_values(&["GET", "/health", "200"])
//!     .inc();
//! ```

pub mod middleware;

pub use middleware::track_metrics;

use crate::analytics::DerivedMetrics;
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, GaugeVec, Histogram, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
};

const NAMESPACE: &str = "lead_tracker";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    // ============================================================================
    // Lead Metrics
    // ============================================================================

    /// Leads accepted through the capture endpoint
    pub static ref LEADS_CREATED_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("leads_created_total", "Total number of leads created")
            .namespace(NAMESPACE)
    ).expect("Failed to create LEADS_CREATED_TOTAL metric");

    /// Lead status updates
    ///
    /// Labels: status
    pub static ref LEAD_UPDATES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("lead_updates_total", "Total number of lead status updates")
            .namespace(NAMESPACE),
        &["status"]
    ).expect("Failed to create LEAD_UPDATES_TOTAL metric");

    /// Leads removed by an admin
    pub static ref LEADS_DELETED_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("leads_deleted_total", "Total number of leads deleted")
            .namespace(NAMESPACE)
    ).expect("Failed to create LEADS_DELETED_TOTAL metric");

    /// Lead count per status as of the last successful aggregation
    ///
    /// Labels: status
    pub static ref LEADS_BY_STATUS: GaugeVec = GaugeVec::new(
        Opts::new("leads_by_status", "Number of leads per status at last aggregation")
            .namespace(NAMESPACE),
        &["status"]
    ).expect("Failed to create LEADS_BY_STATUS metric");

    // ============================================================================
    // Aggregation Metrics
    // ============================================================================

    /// Aggregation runs
    ///
    /// Labels: outcome (success, data_integrity)
    pub static ref AGGREGATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("aggregations_total", "Total number of metric aggregations")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create AGGREGATIONS_TOTAL metric");

    /// Time to aggregate a snapshot
    pub static ref AGGREGATION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "aggregation_duration_seconds",
            "Metric aggregation duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0])
    ).expect("Failed to create AGGREGATION_DURATION_SECONDS metric");
}

/// Register every metric with [`PROMETHEUS_REGISTRY`].
///
/// Call once at startup; a second call fails with `AlreadyReg`.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(LEADS_CREATED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(LEAD_UPDATES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(LEADS_DELETED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(LEADS_BY_STATUS.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(AGGREGATIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(AGGREGATION_DURATION_SECONDS.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Publish the per-status counts of a fresh aggregation
pub fn record_distribution(metrics: &DerivedMetrics) {
    for entry in &metrics.status_distribution {
        LEADS_BY_STATUS
            .with_label_values(&[entry.status.as_ref()])
            .set(entry.count as f64);
    }
}

/// Generate Prometheus text format metrics
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
