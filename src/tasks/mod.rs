mod pool_monitor;

pub use pool_monitor::PoolMonitorTask;
