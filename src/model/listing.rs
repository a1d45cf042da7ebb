//! Listing records and repository
//!
//! A listing is the root of a cascade tree: deleting it removes its bookings
//! and reviews at the database level. `created_at` and `host_id` are set at
//! creation and never touched by updates.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price_per_night: Decimal,
    pub max_guests: i32,
    pub created_at: DateTime<Utc>,
    pub host_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewListing {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_per_night: Decimal,
    #[serde(default = "default_capacity")]
    pub max_guests: i32,
    pub host_id: i64,
}

/// Partial update; omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_night: Option<Decimal>,
    pub max_guests: Option<i32>,
}

fn default_capacity() -> i32 {
    1
}

impl From<&Row> for Listing {
    fn from(row: &Row) -> Self {
        Listing {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            price_per_night: row.get("price_per_night"),
            max_guests: row.get("max_guests"),
            created_at: row.get("created_at"),
            host_id: row.get("host_id"),
        }
    }
}

pub async fn create_listing(pool: &Pool, new: &NewListing) -> Result<Listing> {
    let client = pool.get().await?;

    let row = client
        .query_one(
            r#"
            INSERT INTO listings (title, description, price_per_night, max_guests, host_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, price_per_night, max_guests, created_at, host_id
            "#,
            &[
                &new.title,
                &new.description,
                &new.price_per_night,
                &new.max_guests,
                &new.host_id,
            ],
        )
        .await?;

    let listing = Listing::from(&row);
    info!("Created listing {} ({})", listing.id, listing.title);
    Ok(listing)
}

pub async fn get_listing(pool: &Pool, id: i64) -> Result<Listing> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            r#"
            SELECT id, title, description, price_per_night, max_guests, created_at, host_id
            FROM listings
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    row.map(|r| Listing::from(&r)).ok_or(AppError::NotFound {
        entity: "listing",
        id,
    })
}

pub async fn list_listings(pool: &Pool) -> Result<Vec<Listing>> {
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT id, title, description, price_per_night, max_guests, created_at, host_id
            FROM listings
            ORDER BY id
            "#,
            &[],
        )
        .await?;

    Ok(rows.iter().map(Listing::from).collect())
}

pub async fn update_listing(pool: &Pool, id: i64, update: &ListingUpdate) -> Result<Listing> {
    let client = pool.get().await?;

    // created_at and host_id are immutable; only the editable columns appear
    let row = client
        .query_opt(
            r#"
            UPDATE listings SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price_per_night = COALESCE($4, price_per_night),
                max_guests = COALESCE($5, max_guests)
            WHERE id = $1
            RETURNING id, title, description, price_per_night, max_guests, created_at, host_id
            "#,
            &[
                &id,
                &update.title,
                &update.description,
                &update.price_per_night,
                &update.max_guests,
            ],
        )
        .await?;

    row.map(|r| Listing::from(&r)).ok_or(AppError::NotFound {
        entity: "listing",
        id,
    })
}

/// Delete a listing; its bookings and reviews go with it (ON DELETE CASCADE)
pub async fn delete_listing(pool: &Pool, id: i64) -> Result<()> {
    let client = pool.get().await?;

    let deleted = client
        .execute("DELETE FROM listings WHERE id = $1", &[&id])
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound {
            entity: "listing",
            id,
        });
    }

    info!("Deleted listing {} (bookings and reviews cascade)", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_listing_defaults() {
        let new: NewListing = serde_json::from_value(json!({
            "title": "Seaside cabin",
            "price_per_night": "100.00",
            "host_id": 1
        }))
        .unwrap();

        assert_eq!(new.max_guests, 1);
        assert!(new.description.is_none());
        assert_eq!(new.price_per_night, Decimal::new(10000, 2));
    }

    #[test]
    fn test_price_keeps_two_decimal_places() {
        let listing = Listing {
            id: 1,
            title: "Seaside cabin".to_string(),
            description: None,
            price_per_night: Decimal::new(10000, 2),
            max_guests: 4,
            created_at: Utc::now(),
            host_id: 1,
        };

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["price_per_night"], json!("100.00"));
    }

    #[test]
    fn test_update_accepts_partial_payload() {
        let update: ListingUpdate = serde_json::from_value(json!({
            "price_per_night": "120.50"
        }))
        .unwrap();

        assert!(update.title.is_none());
        assert_eq!(update.price_per_night, Some(Decimal::new(12050, 2)));
    }
}
