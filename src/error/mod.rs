use thiserror::Error;

/// Errors returned to callers of the database pool.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// A connection could not be obtained: pool exhausted past the connect
    /// timeout, network failure, authentication failure or a malformed URL.
    ///
    /// The driver message is part of the display text, so the driver error is
    /// not chained as a source; use [`DatabaseError::sqlx`] to inspect it.
    #[error("Connection error: {0}")]
    Connection(sqlx::Error),

    /// The query reached the server but failed there.
    #[error("Query error: {0}")]
    Query(sqlx::Error),
}

impl DatabaseError {
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection(_))
    }

    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query(_))
    }

    /// The underlying driver error.
    pub fn sqlx(&self) -> &sqlx::Error {
        match self {
            DatabaseError::Connection(e) | DatabaseError::Query(e) => e,
        }
    }
}

/// Errors that abort process startup.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),
}
