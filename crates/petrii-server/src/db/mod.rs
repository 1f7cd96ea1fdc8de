//! Store handle and its lifecycle
//!
//! `Stores` is built once at startup, cloned into request state, and closed
//! explicitly on shutdown. Nothing in the crate reaches for a global pool.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::{
    config::DatabaseConfig,
    store::{
        CredentialStore, DatasetStore, MemoryCredentialStore, MemoryDatasetStore,
        PgCredentialStore, PgDatasetStore,
    },
};

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn CredentialStore>,
    pub datasets: Arc<dyn DatasetStore>,
    pool: Option<PgPool>,
}

impl Stores {
    /// Connect according to configuration. `memory://` selects the
    /// in-process stores; anything else is a PostgreSQL URL and has
    /// migrations applied before the handle is returned.
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        if config.is_memory() {
            tracing::warn!("Using in-memory stores; data is lost on shutdown");
            return Ok(Self::in_memory());
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connection pool created"
        );

        sqlx::migrate!("../../migrations").run(&pool).await?;
        tracing::info!("Database migrations completed");

        Ok(Self::postgres(pool))
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgCredentialStore::new(pool.clone())),
            datasets: Arc::new(PgDatasetStore::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryCredentialStore::new()),
            datasets: Arc::new(MemoryDatasetStore::new()),
            pool: None,
        }
    }

    pub async fn health_check(&self) -> DbResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }

    /// Release every pooled connection. Idempotent.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("Database connection pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MEMORY_DATABASE_URL;

    #[tokio::test]
    async fn test_memory_url_needs_no_database() {
        let config = DatabaseConfig {
            url: MEMORY_DATABASE_URL.to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_secs: 1,
            idle_timeout_secs: 1,
        };
        let stores = Stores::connect(&config).await.unwrap();
        assert!(stores.health_check().await.is_ok());
        stores.close().await;
    }
}
