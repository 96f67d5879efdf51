//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    DB_IDLE_ERRORS_TOTAL, DB_POOL_CONNECTIONS, DB_POOL_MAX_CONNECTIONS, DB_PROBE_ATTEMPTS_TOTAL,
    DB_PROBE_DELAYS_TOTAL,
};
use crate::postgres::PoolStats;

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording startup probe metrics
pub struct ProbeMetrics;

impl ProbeMetrics {
    pub fn record_success() {
        DB_PROBE_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
    }

    pub fn record_failure() {
        DB_PROBE_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
    }

    pub fn record_delay() {
        DB_PROBE_DELAYS_TOTAL.inc();
    }
}

/// Helper struct for recording pool metrics
pub struct PoolMetrics;

impl PoolMetrics {
    /// Publish a pool statistics snapshot
    pub fn record_stats(stats: &PoolStats) {
        DB_POOL_CONNECTIONS
            .with_label_values(&["idle"])
            .set(stats.idle as i64);
        DB_POOL_CONNECTIONS
            .with_label_values(&["in_use"])
            .set(stats.in_use() as i64);
        DB_POOL_MAX_CONNECTIONS.set(stats.max as i64);
    }

    pub fn record_idle_error() {
        DB_IDLE_ERRORS_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_metrics_are_counted() {
        let before = DB_PROBE_ATTEMPTS_TOTAL.with_label_values(&["failure"]).get();
        ProbeMetrics::record_failure();
        ProbeMetrics::record_failure();
        let after = DB_PROBE_ATTEMPTS_TOTAL.with_label_values(&["failure"]).get();
        assert!(after >= before + 2);
    }

    #[test]
    fn test_pool_stats_published() {
        let stats = PoolStats {
            size: 4,
            idle: 1,
            max: 20,
        };
        PoolMetrics::record_stats(&stats);

        let text = encode_metrics().unwrap();
        assert!(text.contains("bmi_db_pool_max_connections"));
        assert!(text.contains("bmi_db_pool_connections"));
    }
}
