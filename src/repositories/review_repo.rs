//! Repository for the `reviews` table.

use sqlx::PgPool;

use crate::models::review::{Review, ReviewStatus};
use crate::DbId;

const COLUMNS: &str = "id, product_id, user_id, user_name, rating, comment, status, created_at";

pub struct ReviewRepo;

impl ReviewRepo {
    pub async fn list_published(pool: &PgPool, product_id: DbId) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews WHERE product_id = $1 AND status = 'published' \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Review>(&query).bind(product_id).fetch_all(pool).await
    }

    /// `(count, average rating)` over published reviews.
    pub async fn stats(pool: &PgPool, product_id: DbId) -> Result<(i64, Option<f64>), sqlx::Error> {
        sqlx::query_as::<_, (i64, Option<f64>)>(
            "SELECT COUNT(*)::BIGINT, AVG(rating)::DOUBLE PRECISION FROM reviews \
             WHERE product_id = $1 AND status = 'published'",
        )
        .bind(product_id)
        .fetch_one(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        product_id: DbId,
        user_id: &str,
        user_name: &str,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (product_id, user_id, user_name, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(product_id)
            .bind(user_id)
            .bind(user_name)
            .bind(rating)
            .bind(comment)
            .fetch_one(pool)
            .await
    }

    pub async fn set_status(pool: &PgPool, id: DbId, status: ReviewStatus) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("UPDATE reviews SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
