//! Signed-in customer endpoints.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::models::order::Order;
use crate::models::user::{UpdateProfile, UserProfile};
use crate::repositories::{OrderRepo, UserRepo};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/account/sync", post(sync_profile))
        .route("/account", get(get_profile).put(update_profile))
        .route("/account/orders", get(my_orders))
}

/// Create or refresh the profile from the token claims. Called by the client
/// after every sign-in.
async fn sync_profile(State(state): State<AppState>, CurrentUser(claims): CurrentUser) -> AppResult<Json<UserProfile>> {
    let profile = UserRepo::sync(&state.pool, &claims.sub, &claims.email, claims.name.as_deref()).await?;
    tracing::info!(uid = %profile.id, "Profile synced");
    Ok(Json(profile))
}

async fn get_profile(State(state): State<AppState>, CurrentUser(claims): CurrentUser) -> AppResult<Json<UserProfile>> {
    UserRepo::find_by_id(&state.pool, &claims.sub)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Profile", &claims.sub))
}

async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<UserProfile>> {
    input.validate()?;
    UserRepo::update_profile(&state.pool, &claims.sub, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Profile", &claims.sub))
}

async fn my_orders(State(state): State<AppState>, CurrentUser(claims): CurrentUser) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(OrderRepo::list_for_user(&state.pool, &claims.sub).await?))
}
