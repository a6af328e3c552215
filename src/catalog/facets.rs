//! Facet values that actually occur among matching products.
//!
//! Callers pass the clause built from the filter with the aggregated
//! dimension removed (`ProductFilter::without_brand` / `without_category`),
//! so picking a brand does not hide the other brands.

use serde::Serialize;
use sqlx::PgPool;

use crate::catalog::category_tree::CategoryTree;
use crate::catalog::filter::{bind_values, bind_values_scalar, WhereClause};
use crate::models::brand::Brand;
use crate::models::category::Category;
use crate::repositories::category_repo::CategoryRepo;
use crate::DbId;

#[derive(Debug, Clone, Serialize)]
pub struct Facets {
    pub brands: Vec<Brand>,
    pub categories: Vec<Category>,
}

/// Distinct brands of matching products, by name.
pub async fn brands_for_filter(pool: &PgPool, clause: &WhereClause) -> Result<Vec<Brand>, sqlx::Error> {
    let rendered = clause.render(1);
    let query = format!(
        "SELECT DISTINCT b.id, b.name, b.slug, b.image_url, b.image_public_id, b.created_at, b.updated_at \
         FROM brands b \
         INNER JOIN products p ON p.brand_id = b.id \
         {} \
         ORDER BY b.name, b.id",
        rendered.sql
    );
    bind_values(sqlx::query_as::<_, Brand>(&query), &rendered.binds).fetch_all(pool).await
}

/// Categories of matching products widened to every ancestor, so a matched
/// grandchild still brings its parent and grandparent into the filter tree.
pub async fn categories_for_filter(
    pool: &PgPool,
    clause: &WhereClause,
    tree: &CategoryTree,
) -> Result<Vec<Category>, sqlx::Error> {
    let matched = matched_category_ids(pool, clause).await?;
    let ids = tree.with_ancestors(&matched);
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    CategoryRepo::find_many(pool, &ids).await
}

async fn matched_category_ids(pool: &PgPool, clause: &WhereClause) -> Result<Vec<DbId>, sqlx::Error> {
    let rendered = clause.render(1);
    let query = format!(
        "SELECT DISTINCT p.category_id FROM products p \
         INNER JOIN categories c ON c.id = p.category_id \
         {}",
        rendered.sql
    );
    bind_values_scalar(sqlx::query_scalar::<_, DbId>(&query), &rendered.binds)
        .fetch_all(pool)
        .await
}
