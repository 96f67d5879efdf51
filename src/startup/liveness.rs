use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::postgres::DatabasePool;

/// Something the startup probe can check for a round trip.
#[async_trait]
pub trait LivenessCheck: Send + Sync {
    /// Perform one round trip and return the server clock.
    async fn check(&self) -> Result<DateTime<Utc>, DatabaseError>;
}

#[async_trait]
impl LivenessCheck for DatabasePool {
    /// Acquire, run `SELECT NOW()`, release.
    async fn check(&self) -> Result<DateTime<Utc>, DatabaseError> {
        let mut conn = self.acquire().await?;
        let server_time = conn.server_time().await;
        conn.release();
        server_time
    }
}
