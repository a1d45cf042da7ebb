//! Minimal user identity root
//!
//! Users are an external identity concern; this module carries only what the
//! foreign keys and ownership cascades need. Deleting a user removes every
//! listing they host and every booking and review they authored.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for User {
    fn from(row: &Row) -> Self {
        User {
            id: row.get("id"),
            username: row.get("username"),
            created_at: row.get("created_at"),
        }
    }
}

pub async fn create_user(pool: &Pool, username: &str) -> Result<User> {
    let client = pool.get().await?;

    let row = client
        .query_one(
            "INSERT INTO users (username) VALUES ($1)
             RETURNING id, username, created_at",
            &[&username],
        )
        .await?;

    Ok(User::from(&row))
}

/// Delete a user account; their listings, bookings and reviews cascade
pub async fn delete_user(pool: &Pool, id: i64) -> Result<()> {
    let client = pool.get().await?;

    let deleted = client
        .execute("DELETE FROM users WHERE id = $1", &[&id])
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound { entity: "user", id });
    }

    info!("Deleted user {} (owned rows cascade)", id);
    Ok(())
}
