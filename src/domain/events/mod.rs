//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::aggregates::{OrderEvent, OrderStatus, PaymentStatus};
use crate::DbId;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    OrderPlaced { order_id: DbId, order_number: String, total_amount: Decimal, item_count: usize },
    OrderStatusChanged {
        order_id: DbId,
        order_number: String,
        event: OrderEvent,
        order_status: OrderStatus,
        payment_status: PaymentStatus,
    },
    ProductPublished { product_id: DbId, slug: String },
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "shop.orders.placed",
            Self::OrderStatusChanged { .. } => "shop.orders.status_changed",
            Self::ProductPublished { .. } => "shop.products.published",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_payload() {
        let e = DomainEvent::ProductPublished { product_id: 7, slug: "tee".into() };
        assert_eq!(e.subject(), "shop.products.published");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "product_published");
        assert_eq!(json["product_id"], 7);
    }
}
