//! Public catalog endpoints.
//!
//! ```text
//! GET  /home
//! GET  /products                  listing + facets
//! GET  /products/:slug            detail
//! GET  /products/:slug/related
//! GET  /products/:slug/reviews
//! POST /products/:slug/reviews    (signed in)
//! GET  /categories
//! GET  /categories/:slug          category + listing
//! GET  /brands
//! GET  /brands/:slug              brand + listing
//! GET  /search?q=
//! GET  /sliders
//! GET  /orders/:order_number
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::catalog::{self, CatalogPage, CategoryTree, FilterBuilder, PageRequest, ProductFilter, ProductQuery, SortBy};
use crate::error::{AppError, AppResult};
use crate::models::brand::Brand;
use crate::models::category::{Category, CategoryDetail};
use crate::models::order::OrderWithItems;
use crate::models::product::{ProductDetail, ProductListing};
use crate::models::review::{CreateReview, Review, ReviewSummary};
use crate::models::slider::Slider;
use crate::repositories::{BrandRepo, CategoryRepo, OrderRepo, ReviewRepo, SliderRepo};
use crate::state::AppState;
use crate::DbId;

/// Products per home page rail.
const HOME_RAIL_SIZE: u32 = 8;
const RELATED_LIMIT: u32 = 8;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home))
        .route("/products", get(list_products))
        .route("/products/:slug", get(product_detail))
        .route("/products/:slug/related", get(related_products))
        .route("/products/:slug/reviews", get(list_reviews).post(create_review))
        .route("/categories", get(list_categories))
        .route("/categories/:slug", get(category_page))
        .route("/brands", get(list_brands))
        .route("/brands/:slug", get(brand_page))
        .route("/search", get(search))
        .route("/sliders", get(list_sliders))
        .route("/orders/:order_number", get(get_order))
}

/// Query string shared by every product listing. Id lists are
/// comma-separated; unparsable entries are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub q: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub categories: Option<String>,
    /// Brand slug.
    pub brand: Option<String>,
    pub brands: Option<String>,
    pub trending: Option<bool>,
    pub best_selling: Option<bool>,
    pub featured: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListingParams {
    /// Resolve slugs and id lists into a filter. An unknown slug is a 404.
    pub async fn to_filter(&self, pool: &PgPool, published_only: bool) -> AppResult<ProductFilter> {
        let category_id = match non_blank(self.category.as_deref()) {
            Some(slug) => Some(
                CategoryRepo::find_by_slug(pool, slug)
                    .await?
                    .ok_or_else(|| AppError::not_found("Category", slug))?
                    .id,
            ),
            None => None,
        };
        let brand_id = match non_blank(self.brand.as_deref()) {
            Some(slug) => Some(
                BrandRepo::find_by_slug(pool, slug)
                    .await?
                    .ok_or_else(|| AppError::not_found("Brand", slug))?
                    .id,
            ),
            None => None,
        };

        Ok(ProductFilter {
            query: non_blank(self.q.as_deref()).map(str::to_string),
            category_id,
            category_ids: parse_id_list(self.categories.as_deref()),
            brand_id,
            brand_ids: parse_id_list(self.brands.as_deref()),
            scope_category_id: None,
            scope_brand_id: None,
            is_trending: self.trending,
            is_best_selling: self.best_selling,
            is_featured: self.featured,
            exclude_product_id: None,
            published_only,
        })
    }

    pub fn sort(&self) -> SortBy {
        SortBy::parse(self.sort.as_deref())
    }

    pub fn page(&self, default_limit: u32) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `"3, 5,x,7"` → `[3, 5, 7]`.
pub fn parse_id_list(raw: Option<&str>) -> Vec<DbId> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<DbId>().ok())
        .collect()
}

async fn listing(state: &AppState, params: &ListingParams, filter: &ProductFilter) -> AppResult<CatalogPage> {
    let page = params.page(state.config.default_page_size);
    Ok(catalog::browse(&state.pool, filter, params.sort(), page).await?)
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub sliders: Vec<Slider>,
    pub featured_categories: Vec<Category>,
    pub trending: Vec<ProductListing>,
    pub best_selling: Vec<ProductListing>,
    pub featured: Vec<ProductListing>,
}

async fn home(State(state): State<AppState>) -> AppResult<Json<HomePage>> {
    let pool = &state.pool;
    let tree = CategoryTree::default();

    let rail = |flag: fn(&mut ProductFilter)| {
        let mut filter = ProductFilter::storefront();
        flag(&mut filter);
        FilterBuilder::build(&filter, &tree)
    };
    let trending = rail(|f| f.is_trending = Some(true));
    let best_selling = rail(|f| f.is_best_selling = Some(true));
    let featured = rail(|f| f.is_featured = Some(true));

    Ok(Json(HomePage {
        sliders: SliderRepo::list_active(pool).await?,
        featured_categories: CategoryRepo::list_featured(pool).await?,
        trending: ProductQuery::top(pool, &trending, SortBy::Newest, HOME_RAIL_SIZE).await?,
        best_selling: ProductQuery::top(pool, &best_selling, SortBy::Newest, HOME_RAIL_SIZE).await?,
        featured: ProductQuery::top(pool, &featured, SortBy::Newest, HOME_RAIL_SIZE).await?,
    }))
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

async fn list_products(State(state): State<AppState>, Query(params): Query<ListingParams>) -> AppResult<Json<CatalogPage>> {
    let filter = params.to_filter(&state.pool, true).await?;
    Ok(Json(listing(&state, &params, &filter).await?))
}

async fn search(State(state): State<AppState>, Query(params): Query<ListingParams>) -> AppResult<Json<CatalogPage>> {
    if non_blank(params.q.as_deref()).is_none() {
        return Err(AppError::BadRequest("Enter something to search for".into()));
    }
    let filter = params.to_filter(&state.pool, true).await?;
    Ok(Json(listing(&state, &params, &filter).await?))
}

async fn published_product(pool: &PgPool, slug: &str) -> AppResult<ProductListing> {
    ProductQuery::find_by_slug(pool, slug, true)
        .await?
        .ok_or_else(|| AppError::not_found("Product", slug))
}

async fn product_detail(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<ProductDetail>> {
    let product = published_product(&state.pool, &slug).await?;

    let breadcrumb = match product.category_id {
        Some(category_id) => {
            let tree = CategoryTree::new(CategoryRepo::list_nodes(&state.pool).await?);
            catalog::breadcrumb(&state.pool, &tree, category_id).await?
        }
        None => Vec::new(),
    };
    let (review_count, average_rating) = ReviewRepo::stats(&state.pool, product.id).await?;

    Ok(Json(ProductDetail { product, breadcrumb, average_rating, review_count }))
}

async fn related_products(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<Vec<ProductListing>>> {
    let product = published_product(&state.pool, &slug).await?;
    let tree = CategoryTree::new(CategoryRepo::list_nodes(&state.pool).await?);
    Ok(Json(ProductQuery::related(&state.pool, &product, &tree, RELATED_LIMIT).await?))
}

async fn list_reviews(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<ReviewSummary>> {
    let product = published_product(&state.pool, &slug).await?;
    let reviews = ReviewRepo::list_published(&state.pool, product.id).await?;
    let (count, average_rating) = ReviewRepo::stats(&state.pool, product.id).await?;
    Ok(Json(ReviewSummary { reviews, count, average_rating }))
}

async fn create_review(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(slug): Path<String>,
    Json(input): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    input.validate()?;
    let product = published_product(&state.pool, &slug).await?;

    let user_name = claims.name.as_deref().map(str::trim).filter(|n| !n.is_empty()).unwrap_or(&claims.email);
    let comment = input.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let review = ReviewRepo::create(&state.pool, product.id, &claims.sub, user_name, input.rating, comment).await?;
    tracing::info!(review_id = review.id, product_id = product.id, rating = review.rating, "Review created");
    Ok((StatusCode::CREATED, Json(review)))
}

// ---------------------------------------------------------------------------
// Categories and brands
// ---------------------------------------------------------------------------

async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(CategoryRepo::list_all(&state.pool).await?))
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    #[serde(flatten)]
    pub detail: CategoryDetail,
    #[serde(flatten)]
    pub listing: CatalogPage,
}

async fn category_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<CategoryPage>> {
    let category = CategoryRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::not_found("Category", &slug))?;

    let tree = CategoryTree::new(CategoryRepo::list_nodes(&state.pool).await?);
    let breadcrumb = catalog::breadcrumb(&state.pool, &tree, category.id).await?;
    let children = CategoryRepo::children_of(&state.pool, category.id).await?;

    let mut filter = params.to_filter(&state.pool, true).await?;
    filter.scope_category_id = Some(category.id);
    let listing = listing(&state, &params, &filter).await?;

    Ok(Json(CategoryPage { detail: CategoryDetail { category, breadcrumb, children }, listing }))
}

async fn list_brands(State(state): State<AppState>) -> AppResult<Json<Vec<Brand>>> {
    Ok(Json(BrandRepo::list_all(&state.pool).await?))
}

#[derive(Debug, Serialize)]
pub struct BrandPage {
    pub brand: Brand,
    #[serde(flatten)]
    pub listing: CatalogPage,
}

async fn brand_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<BrandPage>> {
    let brand = BrandRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::not_found("Brand", &slug))?;

    let mut filter = params.to_filter(&state.pool, true).await?;
    filter.scope_brand_id = Some(brand.id);
    let listing = listing(&state, &params, &filter).await?;

    Ok(Json(BrandPage { brand, listing }))
}

// ---------------------------------------------------------------------------
// Sliders and order tracking
// ---------------------------------------------------------------------------

async fn list_sliders(State(state): State<AppState>) -> AppResult<Json<Vec<Slider>>> {
    Ok(Json(SliderRepo::list_active(&state.pool).await?))
}

async fn get_order(State(state): State<AppState>, Path(order_number): Path<String>) -> AppResult<Json<OrderWithItems>> {
    let order_number = order_number.trim();
    OrderRepo::find_by_number(&state.pool, order_number)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order", order_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists_skip_garbage() {
        assert_eq!(parse_id_list(Some("3, 5,x,,7")), vec![3, 5, 7]);
        assert!(parse_id_list(Some("")).is_empty());
        assert!(parse_id_list(None).is_empty());
    }

    #[test]
    fn listing_defaults() {
        let params = ListingParams::default();
        assert_eq!(params.sort(), SortBy::Newest);
        assert_eq!(params.page(12), PageRequest { page: 1, limit: 12 });
    }
}
