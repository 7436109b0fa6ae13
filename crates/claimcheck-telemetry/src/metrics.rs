//! Prometheus metrics for claim-check clients.
//!
//! All metrics follow the naming convention: `claimcheck_<component>_<metric>_<unit>`.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Messages offloaded to the blob store because they exceeded the
    /// size threshold or `alwaysThroughBlob` was set.
    pub static ref MESSAGES_OFFLOADED: Counter = Counter::new(
        "claimcheck_messages_offloaded_total",
        "Total messages whose body was offloaded to the blob store"
    ).expect("metric creation failed");

    /// Messages sent without offloading.
    pub static ref MESSAGES_SENT_INLINE: Counter = Counter::new(
        "claimcheck_messages_sent_inline_total",
        "Total messages sent with their body inline on the broker"
    ).expect("metric creation failed");

    /// Blob store operations by kind and outcome.
    pub static ref BLOB_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("claimcheck_blob_operations_total", "Blob store operations by kind and outcome"),
        &["operation", "outcome"]  // operation: put/get/delete, outcome: success/failure
    ).expect("metric creation failed");

    /// Messages resolved on receive, split by whether their body came
    /// from the blob store.
    pub static ref MESSAGES_RESOLVED: CounterVec = CounterVec::new(
        Opts::new("claimcheck_messages_resolved_total", "Messages resolved on receive"),
        &["source"]  // source: blob/inline
    ).expect("metric creation failed");

    /// Post-ack cleanup failures, swallowed after logging.
    pub static ref CLEANUP_FAILURES: Counter = Counter::new(
        "claimcheck_cleanup_failures_total",
        "Total blob cleanup failures after message acknowledgement"
    ).expect("metric creation failed");

    /// Lock renewal failures.
    pub static ref LOCK_RENEWAL_FAILURES: Counter = Counter::new(
        "claimcheck_lock_renewal_failures_total",
        "Total lock renewal failures"
    ).expect("metric creation failed");

    /// Duration of a blob put, observed from the send pipeline.
    pub static ref BLOB_PUT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "claimcheck_blob_put_duration_seconds",
            "Time spent uploading an offloaded payload"
        )
    ).expect("metric creation failed");
}

/// Handle for the registered metric set. Holding this keeps the metrics
/// registered; dropping it does not unregister them (the registry is
/// process-global), but gives callers an explicit init/shutdown point to
/// mirror the logging guard.
pub struct MetricsHandle {
    _private: (),
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_OFFLOADED.clone()),
        Box::new(MESSAGES_SENT_INLINE.clone()),
        Box::new(BLOB_OPERATIONS.clone()),
        Box::new(MESSAGES_RESOLVED.clone()),
        Box::new(CLEANUP_FAILURES.clone()),
        Box::new(LOCK_RENEWAL_FAILURES.clone()),
        Box::new(BLOB_PUT_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle { _private: () })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
