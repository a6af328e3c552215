use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::PgPool;
use validator::Validate;

use super::{conflict_on_unique, in_use_on_fk};
use crate::auth::AdminUser;
use crate::catalog::{self, CatalogPage};
use crate::domain::aggregates::{ProductDraft, ProductStatus};
use crate::domain::events::DomainEvent;
use crate::error::{AppError, AppResult};
use crate::media::remove_quietly;
use crate::models::product::{Product, ProductInput};
use crate::repositories::product_repo::{ProductRecord, ProductRepo};
use crate::repositories::{BrandRepo, CategoryRepo};
use crate::routes::storefront::ListingParams;
use crate::state::AppState;
use crate::DbId;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/products", get(list).post(create))
        .route("/admin/products/:id", get(show).put(update).delete(destroy))
}

/// Drafts included; otherwise the same listing as the storefront.
async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<CatalogPage>> {
    let filter = params.to_filter(&state.pool, false).await?;
    let page = params.page(state.config.default_page_size);
    Ok(Json(catalog::browse(&state.pool, &filter, params.sort(), page).await?))
}

async fn show(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<Json<Product>> {
    ProductRepo::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Product", id))
}

/// Field checks, identifier normalisation, reference and uniqueness checks.
async fn prepare(pool: &PgPool, input: &ProductInput, exclude_id: Option<DbId>) -> AppResult<ProductDraft> {
    input.validate()?;
    let draft = ProductDraft::new(
        &input.sku,
        input.slug.as_deref(),
        &input.name,
        input.price,
        input.original_price,
        input.buy_price,
        &input.keywords,
    )?;

    if let Some(category_id) = input.category_id {
        if CategoryRepo::find_by_id(pool, category_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("Category {category_id} does not exist")));
        }
    }
    if let Some(brand_id) = input.brand_id {
        if BrandRepo::find_by_id(pool, brand_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("Brand {brand_id} does not exist")));
        }
    }

    if ProductRepo::sku_exists(pool, draft.sku.as_str(), exclude_id).await? {
        return Err(AppError::Conflict(format!("A product with SKU {} already exists", draft.sku.as_str())));
    }
    if ProductRepo::slug_exists(pool, draft.slug.as_str(), exclude_id).await? {
        return Err(AppError::Conflict(format!("A product with slug '{}' already exists", draft.slug.as_str())));
    }
    Ok(draft)
}

fn record<'a>(input: &'a ProductInput, draft: &'a ProductDraft) -> ProductRecord<'a> {
    ProductRecord {
        sku: draft.sku.as_str(),
        slug: draft.slug.as_str(),
        name: input.name.trim(),
        description: input.description.trim(),
        keywords: &draft.keywords,
        price: draft.price,
        original_price: draft.original_price,
        buy_price: draft.buy_price,
        stock: input.stock,
        images: &input.images,
        category_id: input.category_id,
        brand_id: input.brand_id,
        is_trending: input.is_trending,
        is_best_selling: input.is_best_selling,
        is_featured: input.is_featured,
        status: input.status.as_str(),
    }
}

async fn announce_published(state: &AppState, product: &Product) {
    state
        .events
        .publish(DomainEvent::ProductPublished { product_id: product.id, slug: product.slug.clone() })
        .await;
}

async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let draft = prepare(&state.pool, &input, None).await?;
    let product = ProductRepo::create(&state.pool, &record(&input, &draft))
        .await
        .map_err(|e| conflict_on_unique(e, "A product with this SKU or slug already exists"))?;

    tracing::info!(product_id = product.id, sku = %product.sku, status = %product.status, "Product created");
    if input.status == ProductStatus::Published {
        announce_published(&state, &product).await;
    }
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let existing = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    let draft = prepare(&state.pool, &input, Some(id)).await?;
    let product = ProductRepo::update(&state.pool, id, &record(&input, &draft))
        .await
        .map_err(|e| conflict_on_unique(e, "A product with this SKU or slug already exists"))?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    let dropped: Vec<String> = existing
        .images
        .iter()
        .filter(|old| !product.images.iter().any(|new| new.public_id == old.public_id))
        .map(|old| old.public_id.clone())
        .collect();
    remove_quietly(state.media.as_ref(), dropped).await;

    if existing.status != ProductStatus::Published.as_str() && input.status == ProductStatus::Published {
        announce_published(&state, &product).await;
    }
    Ok(Json(product))
}

async fn destroy(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let product = ProductRepo::delete(&state.pool, id)
        .await
        .map_err(|e| in_use_on_fk(e, "Product appears on existing orders; unpublish it instead"))?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    let images = product.images.0.into_iter().map(|image| image.public_id);
    remove_quietly(state.media.as_ref(), images).await;
    tracing::info!(product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
