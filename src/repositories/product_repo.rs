//! Repository for the `products` table (admin writes; catalog reads live in
//! `crate::catalog`).

use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::media::MediaRef;
use crate::models::product::Product;
use crate::DbId;

/// Column list for `products` queries.
const COLUMNS: &str = "\
    id, sku, slug, name, description, keywords, price, original_price, buy_price, \
    stock, images, category_id, brand_id, is_trending, is_best_selling, is_featured, \
    status, created_at, updated_at";

/// Normalised values for an insert or full update.
pub struct ProductRecord<'a> {
    pub sku: &'a str,
    pub slug: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub keywords: &'a [String],
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub stock: i32,
    pub images: &'a [MediaRef],
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub is_trending: bool,
    pub is_best_selling: bool,
    pub is_featured: bool,
    pub status: &'a str,
}

pub struct ProductRepo;

impl ProductRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query).bind(id).fetch_optional(pool).await
    }

    pub async fn sku_exists(pool: &PgPool, sku: &str, exclude_id: Option<DbId>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(sku)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str, exclude_id: Option<DbId>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn create(pool: &PgPool, rec: &ProductRecord<'_>) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products ( \
                 sku, slug, name, description, keywords, price, original_price, buy_price, \
                 stock, images, category_id, brand_id, is_trending, is_best_selling, is_featured, status \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(rec.sku)
            .bind(rec.slug)
            .bind(rec.name)
            .bind(rec.description)
            .bind(rec.keywords)
            .bind(rec.price)
            .bind(rec.original_price)
            .bind(rec.buy_price)
            .bind(rec.stock)
            .bind(Json(rec.images))
            .bind(rec.category_id)
            .bind(rec.brand_id)
            .bind(rec.is_trending)
            .bind(rec.is_best_selling)
            .bind(rec.is_featured)
            .bind(rec.status)
            .fetch_one(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: DbId, rec: &ProductRecord<'_>) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET \
                 sku = $2, slug = $3, name = $4, description = $5, keywords = $6, \
                 price = $7, original_price = $8, buy_price = $9, stock = $10, images = $11, \
                 category_id = $12, brand_id = $13, is_trending = $14, is_best_selling = $15, \
                 is_featured = $16, status = $17, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(rec.sku)
            .bind(rec.slug)
            .bind(rec.name)
            .bind(rec.description)
            .bind(rec.keywords)
            .bind(rec.price)
            .bind(rec.original_price)
            .bind(rec.buy_price)
            .bind(rec.stock)
            .bind(Json(rec.images))
            .bind(rec.category_id)
            .bind(rec.brand_id)
            .bind(rec.is_trending)
            .bind(rec.is_best_selling)
            .bind(rec.is_featured)
            .bind(rec.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product. Fails with a foreign-key violation once it appears
    /// on an order.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("DELETE FROM products WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Product>(&query).bind(id).fetch_optional(pool).await
    }
}
