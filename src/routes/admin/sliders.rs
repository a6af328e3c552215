use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use validator::Validate;

use super::replaced_media;
use crate::auth::AdminUser;
use crate::error::{AppError, AppResult};
use crate::media::remove_quietly;
use crate::models::slider::{Slider, SliderInput};
use crate::repositories::SliderRepo;
use crate::state::AppState;
use crate::DbId;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/sliders", get(list).post(create))
        .route("/admin/sliders/:id", get(show).put(update).delete(destroy))
}

async fn list(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Json<Vec<Slider>>> {
    Ok(Json(SliderRepo::list_all(&state.pool).await?))
}

async fn show(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<Json<Slider>> {
    SliderRepo::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Slider", id))
}

async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<SliderInput>,
) -> AppResult<(StatusCode, Json<Slider>)> {
    input.validate()?;
    let slider = SliderRepo::create(&state.pool, &input).await?;
    tracing::info!(slider_id = slider.id, "Slider created");
    Ok((StatusCode::CREATED, Json(slider)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<SliderInput>,
) -> AppResult<Json<Slider>> {
    input.validate()?;
    let existing = SliderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Slider", id))?;
    let slider = SliderRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Slider", id))?;

    if let Some(old) = replaced_media(existing.image_public_id.as_deref(), slider.image_public_id.as_deref()) {
        remove_quietly(state.media.as_ref(), [old]).await;
    }
    Ok(Json(slider))
}

async fn destroy(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let slider = SliderRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Slider", id))?;
    remove_quietly(state.media.as_ref(), slider.image_public_id).await;
    Ok(StatusCode::NO_CONTENT)
}
