//! Connection pool setup
//!
//! One database, one pool. Built from `Config` at startup and shared with
//! handlers and the repository layer via clone (deadpool pools are cheap
//! reference-counted handles).

use crate::config::Config;
use crate::error::{AppError, Result};
use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::info;

pub async fn connect(config: &Config) -> Result<Pool> {
    let pool = create_pool(&config.database_url, config.pool_max_size)?;

    // Ping before serving anything
    let client = pool.get().await.map_err(|e| AppError::ConnectionFailed {
        cause: e.to_string(),
    })?;

    client
        .execute("SELECT 1", &[])
        .await
        .map_err(|e| AppError::ConnectionFailed {
            cause: format!("Ping failed: {}", e),
        })?;

    info!("Connected to PostgreSQL");

    Ok(pool)
}

fn create_pool(database_url: &str, max_size: usize) -> Result<Pool> {
    let mut cfg = PoolConfig::new();
    cfg.url = Some(database_url.to_string());

    cfg.pool = Some(deadpool_postgres::PoolConfig {
        max_size,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(5)),
            recycle: Some(Duration::from_secs(5)),
        },
        ..Default::default()
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| AppError::Internal(format!("Failed to create pool: {}", e)))
}
