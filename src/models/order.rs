use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{OrderEvent, OrderStatus, PaymentStatus};
use crate::DbId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub user_id: Option<String>,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub district: String,
    pub notes: Option<String>,
    pub delivery_method: String,
    pub delivery_fee: Decimal,
    pub subtotal: Decimal,
    pub total_amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
    pub order_status: String,
    pub created_at: DateTime<Utc>,
    pub processing_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::parse(&self.order_status).unwrap_or_default()
    }

    pub fn payment(&self) -> PaymentStatus {
        PaymentStatus::parse(&self.payment_status).unwrap_or_default()
    }
}

/// Line item; `price` is the unit price snapshotted at checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub product_id: DbId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Header values for a new order, computed by the checkout writer.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<String>,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub district: String,
    pub notes: Option<String>,
    pub delivery_method: String,
    pub delivery_fee: Decimal,
    pub payment_method: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub event: OrderEvent,
}

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
