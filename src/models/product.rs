use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use validator::Validate;

use crate::domain::aggregates::ProductStatus;
use crate::media::MediaRef;
use crate::DbId;

/// Full `products` row, as edited in the admin panel.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: DbId,
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub stock: i32,
    pub images: Json<Vec<MediaRef>>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub is_trending: bool,
    pub is_best_selling: bool,
    pub is_featured: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized catalog row: a product with its category and brand names
/// joined in. Missing category or brand yields `None` names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductListing {
    pub id: DbId,
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: i32,
    pub images: Json<Vec<MediaRef>>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub brand_id: Option<DbId>,
    pub brand_name: Option<String>,
    pub brand_slug: Option<String>,
    pub is_trending: bool,
    pub is_best_selling: bool,
    pub is_featured: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin form for creating or replacing a product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 32, message = "SKU is required"))]
    pub sku: String,
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<MediaRef>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_best_selling: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub status: ProductStatus,
}

/// Product detail page payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product: ProductListing,
    pub breadcrumb: Vec<crate::models::category::Category>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}
