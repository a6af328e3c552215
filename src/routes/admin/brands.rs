use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use validator::Validate;

use super::{conflict_on_unique, in_use_on_fk, replaced_media};
use crate::auth::AdminUser;
use crate::domain::value_objects::Slug;
use crate::error::{AppError, AppResult};
use crate::media::remove_quietly;
use crate::models::brand::{Brand, BrandInput};
use crate::repositories::brand_repo::{BrandRecord, BrandRepo};
use crate::state::AppState;
use crate::DbId;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/brands", get(list).post(create))
        .route("/admin/brands/:id", get(show).put(update).delete(destroy))
}

fn resolve_slug(input: &BrandInput) -> AppResult<Slug> {
    let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Slug::new(s),
        None => Slug::from_name(&input.name),
    };
    slug.map_err(|e| AppError::BadRequest(format!("Invalid slug: {e}")))
}

async fn list(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Json<Vec<Brand>>> {
    Ok(Json(BrandRepo::list_all(&state.pool).await?))
}

async fn show(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<Json<Brand>> {
    BrandRepo::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Brand", id))
}

async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<BrandInput>,
) -> AppResult<(StatusCode, Json<Brand>)> {
    input.validate()?;
    let slug = resolve_slug(&input)?;
    let duplicate = || format!("A brand with slug '{}' already exists", slug.as_str());
    if BrandRepo::slug_exists(&state.pool, slug.as_str(), None).await? {
        return Err(AppError::Conflict(duplicate()));
    }

    let rec = BrandRecord {
        name: input.name.trim(),
        slug: slug.as_str(),
        image_url: input.image_url.as_deref(),
        image_public_id: input.image_public_id.as_deref(),
    };
    let brand = BrandRepo::create(&state.pool, &rec)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate()))?;

    tracing::info!(brand_id = brand.id, slug = %brand.slug, "Brand created");
    Ok((StatusCode::CREATED, Json(brand)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<BrandInput>,
) -> AppResult<Json<Brand>> {
    input.validate()?;
    let existing = BrandRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Brand", id))?;

    let slug = resolve_slug(&input)?;
    let duplicate = || format!("A brand with slug '{}' already exists", slug.as_str());
    if BrandRepo::slug_exists(&state.pool, slug.as_str(), Some(id)).await? {
        return Err(AppError::Conflict(duplicate()));
    }

    let rec = BrandRecord {
        name: input.name.trim(),
        slug: slug.as_str(),
        image_url: input.image_url.as_deref(),
        image_public_id: input.image_public_id.as_deref(),
    };
    let brand = BrandRepo::update(&state.pool, id, &rec)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate()))?
        .ok_or_else(|| AppError::not_found("Brand", id))?;

    if let Some(old) = replaced_media(existing.image_public_id.as_deref(), brand.image_public_id.as_deref()) {
        remove_quietly(state.media.as_ref(), [old]).await;
    }
    Ok(Json(brand))
}

async fn destroy(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let brand = BrandRepo::delete(&state.pool, id)
        .await
        .map_err(|e| in_use_on_fk(e, "Brand is still in use by one or more products"))?
        .ok_or_else(|| AppError::not_found("Brand", id))?;

    remove_quietly(state.media.as_ref(), brand.image_public_id).await;
    tracing::info!(brand_id = id, "Brand deleted");
    Ok(StatusCode::NO_CONTENT)
}
