//! Repository for the `categories` table.

use sqlx::PgPool;

use crate::catalog::category_tree::CategoryNode;
use crate::models::category::Category;
use crate::DbId;

/// Column list for `categories` queries.
const COLUMNS: &str = "\
    id, name, slug, parent_id, image_url, image_public_id, \
    is_featured, created_at, updated_at";

/// Normalised values for an insert or full update.
pub struct CategoryRecord<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub parent_id: Option<DbId>,
    pub image_url: Option<&'a str>,
    pub image_public_id: Option<&'a str>,
    pub is_featured: bool,
}

pub struct CategoryRepo;

impl CategoryRepo {
    /// `(id, parent_id)` for every category; input to `CategoryTree`.
    pub async fn list_nodes(pool: &PgPool) -> Result<Vec<CategoryNode>, sqlx::Error> {
        sqlx::query_as::<_, CategoryNode>("SELECT id, parent_id FROM categories")
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name, id");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    pub async fn list_featured(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE is_featured ORDER BY name, id");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query).bind(id).fetch_optional(pool).await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        sqlx::query_as::<_, Category>(&query).bind(slug).fetch_optional(pool).await
    }

    /// Categories with the given ids, sorted by name.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = ANY($1) ORDER BY name, id");
        sqlx::query_as::<_, Category>(&query).bind(ids).fetch_all(pool).await
    }

    pub async fn children_of(pool: &PgPool, parent_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE parent_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Category>(&query).bind(parent_id).fetch_all(pool).await
    }

    /// Whether another category already uses `slug`.
    pub async fn slug_exists(pool: &PgPool, slug: &str, exclude_id: Option<DbId>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn create(pool: &PgPool, rec: &CategoryRecord<'_>) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, slug, parent_id, image_url, image_public_id, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(rec.name)
            .bind(rec.slug)
            .bind(rec.parent_id)
            .bind(rec.image_url)
            .bind(rec.image_public_id)
            .bind(rec.is_featured)
            .fetch_one(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: DbId, rec: &CategoryRecord<'_>) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET \
                 name = $2, slug = $3, parent_id = $4, image_url = $5, \
                 image_public_id = $6, is_featured = $7, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(rec.name)
            .bind(rec.slug)
            .bind(rec.parent_id)
            .bind(rec.image_url)
            .bind(rec.image_public_id)
            .bind(rec.is_featured)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Fails with a foreign-key violation while products
    /// or subcategories still point at it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("DELETE FROM categories WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Category>(&query).bind(id).fetch_optional(pool).await
    }
}
