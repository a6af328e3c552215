use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::AdminUser;
use crate::catalog::pagination::{page_window, PageItem, WINDOW_RADIUS};
use crate::catalog::PageRequest;
use crate::domain::aggregates::OrderStatus;
use crate::domain::events::DomainEvent;
use crate::error::{AppError, AppResult};
use crate::models::order::{Order, OrderListParams, OrderWithItems, TransitionRequest};
use crate::repositories::OrderRepo;
use crate::state::AppState;
use crate::DbId;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list))
        .route("/admin/orders/:id", get(show))
        .route("/admin/orders/:id/transition", post(transition))
}

#[derive(Debug, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total_count: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub pages: Vec<PageItem>,
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match raw.map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
        None => Ok(None),
        Some(s) => OrderStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown order status '{s}'"))),
    }
}

async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<OrderPage>> {
    let status = parse_status(params.status.as_deref())?;
    let page = PageRequest::new(params.page, params.limit, state.config.default_page_size);
    let (orders, total_count) = OrderRepo::list(&state.pool, status, page).await?;
    let total_pages = page.total_pages(total_count);

    Ok(Json(OrderPage {
        orders,
        total_count,
        page: page.page,
        limit: page.limit,
        total_pages,
        pages: page_window(page.page, total_pages, WINDOW_RADIUS),
    }))
}

async fn show(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<Json<OrderWithItems>> {
    OrderRepo::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order", id))
}

async fn transition(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<DbId>,
    Json(req): Json<TransitionRequest>,
) -> AppResult<Json<OrderWithItems>> {
    let (updated, step) = OrderRepo::apply_transition(&state.pool, id, req.event).await?;

    state
        .events
        .publish(DomainEvent::OrderStatusChanged {
            order_id: updated.order.id,
            order_number: updated.order.order_number.clone(),
            event: req.event,
            order_status: step.order_status,
            payment_status: updated.order.payment(),
        })
        .await;

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("all")).unwrap(), None);
        assert_eq!(parse_status(Some("shipped")).unwrap(), Some(OrderStatus::Shipped));
        assert!(parse_status(Some("lost")).is_err());
    }
}
