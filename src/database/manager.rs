use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

use super::store::Collection;

/// Errors from the document stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database configuration: {0}")]
    Config(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True when the store could not be reached at all
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
                | DatabaseError::Sqlx(sqlx::Error::PoolClosed)
                | DatabaseError::Sqlx(sqlx::Error::Io(_))
                | DatabaseError::Sqlx(sqlx::Error::Tls(_))
        )
    }
}

/// Opens the process-wide connection pool. Called once at startup; the pool
/// lives as long as the server does.
pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
    let url = config
        .database_url()
        .map_err(|e| DatabaseError::Config(e.to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
        .connect(&url)
        .await?;

    info!(
        "Connected to database {} (max_connections={})",
        config.database.name, config.database.max_connections
    );
    Ok(pool)
}

/// Creates collection tables that do not exist yet
pub async fn ensure_collections(pool: &PgPool) -> Result<(), DatabaseError> {
    for collection in Collection::ALL {
        let table = quote_identifier(collection.name());
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                id UUID PRIMARY KEY, \
                seq BIGSERIAL NOT NULL, \
                doc JSONB NOT NULL DEFAULT '{{}}'::jsonb\
            )",
            table
        );
        sqlx::query(&ddl).execute(pool).await?;
        info!("Collection ready: {}", collection.name());
    }
    Ok(())
}

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
