use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds and checks the connection pool for the payload database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Creates a pool that connects on first use, so the API can start
    /// while the database is still coming up.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}
