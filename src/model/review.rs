//! Review records and repository
//!
//! Rating range and the one-review-per-(listing, reviewer) rule are the
//! `review_rating_1_5` check and `review_one_per_reviewer` unique constraints
//! in the schema. A duplicate review surfaces as a conflict, an out-of-range
//! rating as a bad request.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub listing_id: i64,
    pub reviewer_id: i64,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub listing_id: i64,
    pub reviewer_id: i64,
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<&Row> for Review {
    fn from(row: &Row) -> Self {
        Review {
            id: row.get("id"),
            listing_id: row.get("listing_id"),
            reviewer_id: row.get("reviewer_id"),
            rating: row.get("rating"),
            comment: row.get("comment"),
            created_at: row.get("created_at"),
        }
    }
}

pub async fn create_review(pool: &Pool, new: &NewReview) -> Result<Review> {
    let client = pool.get().await?;

    let row = client
        .query_one(
            r#"
            INSERT INTO reviews (listing_id, reviewer_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, listing_id, reviewer_id, rating, comment, created_at
            "#,
            &[&new.listing_id, &new.reviewer_id, &new.rating, &new.comment],
        )
        .await?;

    let review = Review::from(&row);
    info!(
        "Created review {} on listing {} (rating {})",
        review.id, review.listing_id, review.rating
    );
    Ok(review)
}

pub async fn get_review(pool: &Pool, id: i64) -> Result<Review> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            r#"
            SELECT id, listing_id, reviewer_id, rating, comment, created_at
            FROM reviews
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    row.map(|r| Review::from(&r)).ok_or(AppError::NotFound {
        entity: "review",
        id,
    })
}

pub async fn list_reviews_for_listing(pool: &Pool, listing_id: i64) -> Result<Vec<Review>> {
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT id, listing_id, reviewer_id, rating, comment, created_at
            FROM reviews
            WHERE listing_id = $1
            ORDER BY id
            "#,
            &[&listing_id],
        )
        .await?;

    Ok(rows.iter().map(Review::from).collect())
}

pub async fn delete_review(pool: &Pool, id: i64) -> Result<()> {
    let client = pool.get().await?;

    let deleted = client
        .execute("DELETE FROM reviews WHERE id = $1", &[&id])
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound {
            entity: "review",
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
    fn test_new_review_comment_is_optional() {
        let new: NewReview = serde_json::from_value(json!({
            "listing_id": 1,
            "reviewer_id": 2,
            "rating": 5
        }))
        .unwrap();

        assert_eq!(new.rating, 5);
        assert!(new.comment.is_none());
    }

    #[test]
    fn test_review_round_trips_through_json() {
        let review = Review {
            id: 3,
            listing_id: 1,
            reviewer_id: 2,
            rating: 4,
            comment: Some("Great stay".to_string()),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["rating"], json!(4));
        assert_eq!(value["comment"], json!("Great stay"));
    }
}
