use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::MonitorConfig;
use crate::metrics::PoolMetrics;
use crate::postgres::DatabasePool;

/// Background task that samples pool occupancy into the pool gauges
pub struct PoolMonitorTask {
    config: MonitorConfig,
    pool: DatabasePool,
    shutdown: broadcast::Receiver<()>,
}

impl PoolMonitorTask {
    pub fn new(
        config: MonitorConfig,
        pool: DatabasePool,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            pool,
            shutdown,
        }
    }

    /// Run until the shutdown signal fires
    pub async fn run(mut self) {
        let interval = Duration::from_secs(self.config.interval_secs.max(1));
        let mut timer = tokio::time::interval(interval);

        tracing::info!(
            interval_secs = interval.as_secs(),
            "Pool monitor task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Pool monitor task received shutdown signal");
                    break;
                }
                _ = timer.tick() => {
                    self.sample();
                }
            }
        }

        tracing::info!("Pool monitor task stopped");
    }

    fn sample(&self) {
        let stats = self.pool.stats();
        PoolMetrics::record_stats(&stats);

        if stats.size >= stats.max {
            tracing::warn!(
                size = stats.size,
                idle = stats.idle,
                max = stats.max,
                "Connection pool at capacity"
            );
        } else {
            tracing::debug!(
                size = stats.size,
                idle = stats.idle,
                in_use = stats.in_use(),
                max = stats.max,
                "Connection pool stats"
            );
        }
    }
}
