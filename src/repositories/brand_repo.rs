//! Repository for the `brands` table.

use sqlx::PgPool;

use crate::models::brand::Brand;
use crate::DbId;

/// Column list for `brands` queries.
const COLUMNS: &str = "id, name, slug, image_url, image_public_id, created_at, updated_at";

pub struct BrandRecord<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub image_url: Option<&'a str>,
    pub image_public_id: Option<&'a str>,
}

pub struct BrandRepo;

impl BrandRepo {
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands ORDER BY name, id");
        sqlx::query_as::<_, Brand>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands WHERE id = $1");
        sqlx::query_as::<_, Brand>(&query).bind(id).fetch_optional(pool).await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands WHERE slug = $1");
        sqlx::query_as::<_, Brand>(&query).bind(slug).fetch_optional(pool).await
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str, exclude_id: Option<DbId>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM brands WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn create(pool: &PgPool, rec: &BrandRecord<'_>) -> Result<Brand, sqlx::Error> {
        let query = format!(
            "INSERT INTO brands (name, slug, image_url, image_public_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(rec.name)
            .bind(rec.slug)
            .bind(rec.image_url)
            .bind(rec.image_public_id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: DbId, rec: &BrandRecord<'_>) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!(
            "UPDATE brands SET name = $2, slug = $3, image_url = $4, image_public_id = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .bind(rec.name)
            .bind(rec.slug)
            .bind(rec.image_url)
            .bind(rec.image_public_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a brand. Fails with a foreign-key violation while products
    /// reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!("DELETE FROM brands WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Brand>(&query).bind(id).fetch_optional(pool).await
    }
}
