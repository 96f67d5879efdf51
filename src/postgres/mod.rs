//! PostgreSQL persistence module.
//!
//! Provides the shared connection pool, checked-out connection handles and
//! the event channel that reports errors raised by idle connections.

mod events;
pub mod pool;

pub use events::{spawn_event_logger, IdlePoolError, PoolEvent, PoolEventReceiver, PoolEventSender};
pub use pool::{mask_database_url, DatabasePool, PoolStats, PooledConnection, LIVENESS_QUERY};
