// Infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod postgres;
pub mod telemetry;

// Startup and background work
pub mod startup;
pub mod tasks;

pub use postgres::{DatabasePool, PooledConnection};
pub use startup::{connect_with_retry, StartupProber};
