//! Prometheus metrics for leader election and the rebalancing pipeline.
//!
//! Metrics cover:
//! - Election attempts by outcome (won, lost, misconfigured, error)
//! - Whether this process currently holds the controller role
//! - Message selection decisions (selected, dropped)
//! - Pipeline pass duration
//!
//! # Safety
//!
//! All metrics are registered to a custom registry with the "helmsman" prefix to avoid
//! name collisions with other libraries using the default Prometheus registry.
//! Registration errors are handled gracefully - if a metric fails to register,
//! the unregistered metric is still returned instead of panicking.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Registry, TextEncoder, opts,
};
use tracing::warn;

/// Custom Prometheus registry for helmsman metrics.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("helmsman".to_string()), None).unwrap_or_else(|_| Registry::new())
});

/// Declare an IntGaugeVec metric with labels.
macro_rules! define_gauge_vec {
    ($name:ident, $metric_name:expr, $help:expr, [$($label:expr),+ $(,)?]) => {
        #[doc = $help]
        pub static $name: Lazy<IntGaugeVec> = Lazy::new(|| {
            register_int_gauge_vec_safe(&REGISTRY, $metric_name, $help, &[$($label),+])
        });
    };
}

/// Declare an IntCounterVec metric with labels.
macro_rules! define_counter_vec {
    ($name:ident, $metric_name:expr, $help:expr, [$($label:expr),+ $(,)?]) => {
        #[doc = $help]
        pub static $name: Lazy<IntCounterVec> = Lazy::new(|| {
            register_int_counter_vec_safe(&REGISTRY, $metric_name, $help, &[$($label),+])
        });
    };
}

/// Declare a HistogramVec metric with labels and buckets.
macro_rules! define_histogram_vec {
    ($name:ident, $metric_name:expr, $help:expr, [$($label:expr),+ $(,)?], [$($bucket:expr),+ $(,)?]) => {
        #[doc = $help]
        pub static $name: Lazy<HistogramVec> = Lazy::new(|| {
            register_histogram_vec_safe(&REGISTRY, $metric_name, $help, &[$($label),+], vec![$($bucket),+])
        });
    };
}

// =============================================================================
// Election metrics
// =============================================================================

define_counter_vec!(
    ELECTION_ATTEMPTS,
    "election_attempts_total",
    "Leader election attempts by outcome",
    ["outcome"]
);
define_gauge_vec!(
    CONTROLLER_ACTIVE,
    "controller_active",
    "1 if the instance currently holds the controller role of the cluster",
    ["cluster", "instance"]
);

// =============================================================================
// Pipeline metrics
// =============================================================================

define_counter_vec!(
    SELECTION_DECISIONS,
    "message_selection_decisions_total",
    "Candidate messages selected or dropped by the selection stage",
    ["decision"]
);
define_histogram_vec!(
    PIPELINE_PASS_DURATION,
    "pipeline_pass_duration_seconds",
    "Duration of one rebalancing pipeline pass",
    ["status"],
    [0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
);

/// Register an IntGaugeVec safely, returning the unregistered gauge on error.
fn register_int_gauge_vec_safe(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> IntGaugeVec {
    let gauge = IntGaugeVec::new(opts!(name, help), labels).expect("metric opts should be valid");
    match registry.register(Box::new(gauge.clone())) {
        Ok(()) => gauge,
        Err(e) => {
            warn!(name, error = %e, "Failed to register IntGaugeVec metric, using unregistered fallback");
            gauge
        }
    }
}

/// Register an IntCounterVec safely, returning the unregistered counter on error.
fn register_int_counter_vec_safe(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> IntCounterVec {
    let counter =
        IntCounterVec::new(opts!(name, help), labels).expect("metric opts should be valid");
    match registry.register(Box::new(counter.clone())) {
        Ok(()) => counter,
        Err(e) => {
            warn!(name, error = %e, "Failed to register IntCounterVec metric, using unregistered fallback");
            counter
        }
    }
}

/// Register a HistogramVec safely, returning the unregistered histogram on error.
fn register_histogram_vec_safe(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
    buckets: Vec<f64>,
) -> HistogramVec {
    let histogram = HistogramVec::new(HistogramOpts::new(name, help).buckets(buckets), labels)
        .expect("histogram opts should be valid");
    match registry.register(Box::new(histogram.clone())) {
        Ok(()) => histogram,
        Err(e) => {
            warn!(name, error = %e, "Failed to register HistogramVec metric, using unregistered fallback");
            histogram
        }
    }
}

/// Encode all metrics in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record the outcome of one election notification.
pub fn record_election(outcome: &str) {
    ELECTION_ATTEMPTS.with_label_values(&[outcome]).inc();
}

/// Set whether one instance holds the controller role of its cluster.
///
/// Labelled per instance so several elections in one process do not
/// overwrite each other.
pub fn set_controller_active(cluster: &str, instance: &str, active: bool) {
    CONTROLLER_ACTIVE
        .with_label_values(&[cluster, instance])
        .set(i64::from(active));
}

/// Current controller gauge reading for one instance.
pub fn controller_active(cluster: &str, instance: &str) -> bool {
    CONTROLLER_ACTIVE
        .with_label_values(&[cluster, instance])
        .get()
        > 0
}

/// Record selection decisions for one resource key.
pub fn record_selection(selected: usize, dropped: usize) {
    if selected > 0 {
        SELECTION_DECISIONS
            .with_label_values(&["selected"])
            .inc_by(selected as u64);
    }
    if dropped > 0 {
        SELECTION_DECISIONS
            .with_label_values(&["dropped"])
            .inc_by(dropped as u64);
    }
}

/// Record the duration of one pipeline pass.
pub fn record_pipeline_pass(status: &str, duration_secs: f64) {
    PIPELINE_PASS_DURATION
        .with_label_values(&[status])
        .observe(duration_secs);
}
