//! Repository for the `sliders` table.

use sqlx::PgPool;

use crate::models::slider::{Slider, SliderInput};
use crate::DbId;

const COLUMNS: &str = "\
    id, title, subtitle, image_url, image_public_id, link_url, \
    sort_order, is_active, created_at, updated_at";

pub struct SliderRepo;

impl SliderRepo {
    /// Home page banners in display order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Slider>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sliders WHERE is_active ORDER BY sort_order, id");
        sqlx::query_as::<_, Slider>(&query).fetch_all(pool).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Slider>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sliders ORDER BY sort_order, id");
        sqlx::query_as::<_, Slider>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Slider>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sliders WHERE id = $1");
        sqlx::query_as::<_, Slider>(&query).bind(id).fetch_optional(pool).await
    }

    pub async fn create(pool: &PgPool, dto: &SliderInput) -> Result<Slider, sqlx::Error> {
        let query = format!(
            "INSERT INTO sliders (title, subtitle, image_url, image_public_id, link_url, sort_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slider>(&query)
            .bind(dto.title.trim())
            .bind(&dto.subtitle)
            .bind(&dto.image_url)
            .bind(&dto.image_public_id)
            .bind(&dto.link_url)
            .bind(dto.sort_order)
            .bind(dto.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: DbId, dto: &SliderInput) -> Result<Option<Slider>, sqlx::Error> {
        let query = format!(
            "UPDATE sliders SET \
                 title = $2, subtitle = $3, image_url = $4, image_public_id = $5, \
                 link_url = $6, sort_order = $7, is_active = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slider>(&query)
            .bind(id)
            .bind(dto.title.trim())
            .bind(&dto.subtitle)
            .bind(&dto.image_url)
            .bind(&dto.image_public_id)
            .bind(&dto.link_url)
            .bind(dto.sort_order)
            .bind(dto.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Slider>, sqlx::Error> {
        let query = format!("DELETE FROM sliders WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Slider>(&query).bind(id).fetch_optional(pool).await
    }
}
