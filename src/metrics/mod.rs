//! Prometheus metrics for the database layer.
//!
//! - Startup probe metrics (attempts by outcome, inter-attempt delays)
//! - Pool metrics (open/idle/in-use connections, configured maximum)
//! - Idle connection error counter

mod helpers;

pub use helpers::{encode_metrics, PoolMetrics, ProbeMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, register_int_gauge_vec,
    IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "bmi";

lazy_static! {
    // ============================================================================
    // Startup Probe Metrics
    // ============================================================================

    /// Probe attempts by result (success / failure)
    pub static ref DB_PROBE_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_db_probe_attempts_total", METRIC_PREFIX),
        "Total startup probe attempts",
        &["result"]
    ).unwrap();

    /// Number of fixed delays slept between probe attempts
    pub static ref DB_PROBE_DELAYS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_db_probe_delays_total", METRIC_PREFIX),
        "Total delays between startup probe attempts"
    ).unwrap();

    // ============================================================================
    // Pool Metrics
    // ============================================================================

    /// Connections by state (idle / in_use)
    pub static ref DB_POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        format!("{}_db_pool_connections", METRIC_PREFIX),
        "Number of pooled connections by state",
        &["state"]
    ).unwrap();

    /// Configured upper bound on open connections
    pub static ref DB_POOL_MAX_CONNECTIONS: IntGauge = register_int_gauge!(
        format!("{}_db_pool_max_connections", METRIC_PREFIX),
        "Configured maximum number of pooled connections"
    ).unwrap();

    /// Errors raised by idle connections
    pub static ref DB_IDLE_ERRORS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_db_idle_errors_total", METRIC_PREFIX),
        "Total errors raised by idle pooled connections"
    ).unwrap();
}
