//! PostgreSQL client
//!
//! Pooled connection handling for the structured zone, plus schema
//! bootstrap. The upsert protocol itself lives in
//! [`store`](crate::adapters::postgres::store).

use crate::config::schema::DatabaseConfig;
use crate::domain::{Result, StoreError};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

/// Pooled PostgreSQL client
pub struct PostgresClient {
    pool: Pool,
    config: DatabaseConfig,
}

impl PostgresClient {
    /// Create a client and its connection pool.
    ///
    /// The pool is lazy; no connection is opened until first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built from the configuration.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .password(config.password.expose_secret().as_ref())
            .dbname(&config.dbname);

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection with a trivial query.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("connection test failed: {e}")))?;

        tracing::info!(database = %self.safe_dsn(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Ensure the structured-zone schema exists.
    ///
    /// Runs the bundled migration; all statements are idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the migration fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        let migration_sql = include_str!("../../../migrations/001_initial_schema.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| StoreError::SchemaFailed(e.to_string()))?;

        tracing::info!("Structured-zone schema initialized");
        Ok(())
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained within the pool
    /// timeouts.
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("failed to get connection from pool: {e}"))
                    .into()
            })
    }

    /// Connection target without credentials, for logs.
    pub fn safe_dsn(&self) -> String {
        format!(
            "postgresql://{}:{}/{}",
            self.config.host, self.config.port, self.config.dbname
        )
    }

    /// Pool statistics.
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}
