//! `POST /checkout`: place an order as a guest or signed-in customer.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::auth::MaybeUser;
use crate::checkout::{self, CheckoutRequest};
use crate::domain::events::DomainEvent;
use crate::error::AppResult;
use crate::models::order::OrderWithItems;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout", post(place_order))
}

async fn place_order(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<OrderWithItems>)> {
    let placed = checkout::place_order(&state.pool, &req, claims.map(|c| c.sub)).await?;

    state
        .events
        .publish(DomainEvent::OrderPlaced {
            order_id: placed.order.id,
            order_number: placed.order.order_number.clone(),
            total_amount: placed.order.total_amount,
            item_count: placed.items.len(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(placed)))
}
