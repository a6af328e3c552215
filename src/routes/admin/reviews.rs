use axum::extract::{Path, State};
use axum::routing::put;
use axum::{Json, Router};

use crate::auth::AdminUser;
use crate::error::{AppError, AppResult};
use crate::models::review::{Review, SetReviewStatus};
use crate::repositories::ReviewRepo;
use crate::state::AppState;
use crate::DbId;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/reviews/:id/status", put(set_status))
}

/// Hide a review from the product page or publish it again.
async fn set_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<SetReviewStatus>,
) -> AppResult<Json<Review>> {
    let review = ReviewRepo::set_status(&state.pool, id, input.status)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))?;
    tracing::info!(review_id = id, status = %review.status, "Review moderated");
    Ok(Json(review))
}
