//! Product page queries over a compiled [`WhereClause`].

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::catalog::category_tree::CategoryTree;
use crate::catalog::filter::{bind_values, bind_values_scalar, FilterBuilder, ProductFilter, WhereClause};
use crate::catalog::pagination::{page_window, PageItem, PageRequest, WINDOW_RADIUS};
use crate::models::product::ProductListing;

/// Denormalized product SELECT. Left joins keep products whose category or
/// brand is unset.
pub(crate) const LISTING_SELECT: &str = "\
    SELECT p.id, p.sku, p.slug, p.name, p.description, p.keywords, \
           p.price, p.original_price, p.stock, p.images, \
           p.category_id, c.name AS category_name, c.slug AS category_slug, \
           p.brand_id, b.name AS brand_name, b.slug AS brand_slug, \
           p.is_trending, p.is_best_selling, p.is_featured, p.status, \
           p.created_at, p.updated_at \
    FROM products p \
    LEFT JOIN categories c ON c.id = p.category_id \
    LEFT JOIN brands b ON b.id = p.brand_id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "name-asc")]
    NameAsc,
    #[serde(rename = "name-desc")]
    NameDesc,
}

impl SortBy {
    /// Unknown or missing values fall back to `Newest`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            Some("name-asc") => Self::NameAsc,
            Some("name-desc") => Self::NameDesc,
            _ => Self::Newest,
        }
    }

    /// `ORDER BY` body. `p.id` breaks ties so pages never overlap.
    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price::numeric ASC, p.id DESC",
            Self::PriceDesc => "p.price::numeric DESC, p.id DESC",
            Self::NameAsc => "p.name ASC, p.id DESC",
            Self::NameDesc => "p.name DESC, p.id DESC",
        }
    }
}

/// One page of products plus what a pager needs.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductListing>,
    pub total_count: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub pages: Vec<PageItem>,
}

pub struct ProductQuery;

impl ProductQuery {
    /// Fetch one page and the total match count. Both statements render the
    /// same clause, so `total_count` does not depend on `page` or `limit`.
    pub async fn run(
        pool: &PgPool,
        clause: &WhereClause,
        sort: SortBy,
        page: PageRequest,
    ) -> Result<ProductPage, sqlx::Error> {
        let products = Self::fetch_page(pool, clause, sort, page).await?;
        let total_count = Self::count(pool, clause).await?;
        let total_pages = page.total_pages(total_count);

        Ok(ProductPage {
            products,
            total_count,
            page: page.page,
            limit: page.limit,
            total_pages,
            pages: page_window(page.page, total_pages, WINDOW_RADIUS),
        })
    }

    pub async fn fetch_page(
        pool: &PgPool,
        clause: &WhereClause,
        sort: SortBy,
        page: PageRequest,
    ) -> Result<Vec<ProductListing>, sqlx::Error> {
        let rendered = clause.render(1);
        let query = page_sql(&rendered.sql, sort, rendered.next_index);
        bind_values(sqlx::query_as::<_, ProductListing>(&query), &rendered.binds)
            .bind(i64::from(page.limit))
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, clause: &WhereClause) -> Result<i64, sqlx::Error> {
        let rendered = clause.render(1);
        let query = count_sql(&rendered.sql);
        bind_values_scalar(sqlx::query_scalar::<_, i64>(&query), &rendered.binds)
            .fetch_one(pool)
            .await
    }

    /// Up to `limit` products, no count. Used by home page rails.
    pub async fn top(pool: &PgPool, clause: &WhereClause, sort: SortBy, limit: u32) -> Result<Vec<ProductListing>, sqlx::Error> {
        Self::fetch_page(pool, clause, sort, PageRequest::new(Some(1), Some(limit), limit)).await
    }

    /// Published products sharing `product`'s category (subcategories
    /// included), excluding the product itself. Empty when uncategorised.
    pub async fn related(
        pool: &PgPool,
        product: &ProductListing,
        tree: &CategoryTree,
        limit: u32,
    ) -> Result<Vec<ProductListing>, sqlx::Error> {
        let Some(category_id) = product.category_id else {
            return Ok(Vec::new());
        };
        let filter = ProductFilter {
            category_id: Some(category_id),
            exclude_product_id: Some(product.id),
            ..ProductFilter::storefront()
        };
        let clause = FilterBuilder::build(&filter, tree);
        Self::top(pool, &clause, SortBy::Newest, limit).await
    }

    /// Denormalized product by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str, published_only: bool) -> Result<Option<ProductListing>, sqlx::Error> {
        let status_clause = if published_only { " AND p.status = 'published'" } else { "" };
        let query = format!("{LISTING_SELECT} WHERE p.slug = $1{status_clause}");
        sqlx::query_as::<_, ProductListing>(&query).bind(slug).fetch_optional(pool).await
    }
}

fn page_sql(where_sql: &str, sort: SortBy, next_index: u32) -> String {
    format!(
        "{LISTING_SELECT} {where_sql} ORDER BY {} LIMIT ${next_index} OFFSET ${}",
        sort.order_by(),
        next_index + 1
    )
}

fn count_sql(where_sql: &str) -> String {
    format!("SELECT COUNT(*)::BIGINT FROM products p {where_sql}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parse() {
        assert_eq!(SortBy::parse(Some("price-asc")), SortBy::PriceAsc);
        assert_eq!(SortBy::parse(Some("name-desc")), SortBy::NameDesc);
        assert_eq!(SortBy::parse(Some("bogus")), SortBy::Newest);
        assert_eq!(SortBy::parse(None), SortBy::Newest);
    }

    #[test]
    fn price_sorts_are_numeric() {
        assert!(SortBy::PriceAsc.order_by().starts_with("p.price::numeric ASC"));
        assert!(SortBy::PriceDesc.order_by().starts_with("p.price::numeric DESC"));
    }

    #[test]
    fn page_and_count_share_the_predicate() {
        let filter = ProductFilter { brand_ids: vec![3], is_trending: Some(true), ..ProductFilter::storefront() };
        let rendered = FilterBuilder::build(&filter, &CategoryTree::default()).render(1);

        let page = page_sql(&rendered.sql, SortBy::PriceAsc, rendered.next_index);
        let count = count_sql(&rendered.sql);
        assert!(page.contains(&rendered.sql));
        assert!(count.contains(&rendered.sql));
        assert!(page.ends_with("ORDER BY p.price::numeric ASC, p.id DESC LIMIT $4 OFFSET $5"));
        assert!(!count.contains("LIMIT"));
    }

    #[test]
    fn unfiltered_page_has_no_where() {
        let page = page_sql("", SortBy::Newest, 1);
        assert!(!page.contains("WHERE"));
        assert!(page.ends_with("ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2"));
    }
}
