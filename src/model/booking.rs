//! Booking records and repository
//!
//! The date-ordering invariant (end strictly after start) lives in the
//! database as the `booking_dates_valid` check constraint, so it is not
//! re-validated here; a violating insert comes back as a check-violation
//! error from the write itself.

use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub listing_id: i64,
    pub guest_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewBooking {
    pub listing_id: i64,
    pub guest_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_guests")]
    pub guests: i32,
}

fn default_guests() -> i32 {
    1
}

impl From<&Row> for Booking {
    fn from(row: &Row) -> Self {
        Booking {
            id: row.get("id"),
            listing_id: row.get("listing_id"),
            guest_id: row.get("guest_id"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            guests: row.get("guests"),
            created_at: row.get("created_at"),
        }
    }
}

pub async fn create_booking(pool: &Pool, new: &NewBooking) -> Result<Booking> {
    let client = pool.get().await?;

    let row = client
        .query_one(
            r#"
            INSERT INTO bookings (listing_id, guest_id, start_date, end_date, guests)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, listing_id, guest_id, start_date, end_date, guests, created_at
            "#,
            &[
                &new.listing_id,
                &new.guest_id,
                &new.start_date,
                &new.end_date,
                &new.guests,
            ],
        )
        .await?;

    let booking = Booking::from(&row);
    info!(
        "Created booking {} for listing {} ({} to {})",
        booking.id, booking.listing_id, booking.start_date, booking.end_date
    );
    Ok(booking)
}

pub async fn get_booking(pool: &Pool, id: i64) -> Result<Booking> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            r#"
            SELECT id, listing_id, guest_id, start_date, end_date, guests, created_at
            FROM bookings
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    row.map(|r| Booking::from(&r)).ok_or(AppError::NotFound {
        entity: "booking",
        id,
    })
}

pub async fn list_bookings_for_listing(pool: &Pool, listing_id: i64) -> Result<Vec<Booking>> {
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT id, listing_id, guest_id, start_date, end_date, guests, created_at
            FROM bookings
            WHERE listing_id = $1
            ORDER BY start_date, id
            "#,
            &[&listing_id],
        )
        .await?;

    Ok(rows.iter().map(Booking::from).collect())
}

pub async fn delete_booking(pool: &Pool, id: i64) -> Result<()> {
    let client = pool.get().await?;

    let deleted = client
        .execute("DELETE FROM bookings WHERE id = $1", &[&id])
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound {
            entity: "booking",
            id,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_booking_guest_count_defaults_to_one() {
        let new: NewBooking = serde_json::from_value(json!({
            "listing_id": 1,
            "guest_id": 2,
            "start_date": "2024-06-01",
            "end_date": "2024-06-03"
        }))
        .unwrap();

        assert_eq!(new.guests, 1);
        assert_eq!(
            new.start_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_booking_dates_serialize_as_calendar_dates() {
        let booking = Booking {
            id: 7,
            listing_id: 1,
            guest_id: 2,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            guests: 2,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["start_date"], json!("2024-06-01"));
        assert_eq!(value["end_date"], json!("2024-06-03"));
    }
}
