//! Order Aggregate
//!
//! Orders are written once at checkout and afterwards only move through the
//! status transition table below. The table is the single place where the
//! order status and the payment status are coupled.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { #[default] Pending, Processing, Shipped, Delivered, Cancelled }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus { #[default] Pending, Paid }

/// Admin actions that move an order forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEvent { Process, Ship, Deliver, Cancel, MarkPaid }

/// Column updates that accompany a status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    StampProcessingAt,
    StampShippedAt,
    StampDeliveredAt,
    StampCancelledAt,
    MarkPaid,
    RestockItems,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub order_status: OrderStatus,
    pub effects: Vec<SideEffect>,
}

impl Transition {
    pub fn payment_status(&self, current: PaymentStatus) -> PaymentStatus {
        if self.effects.contains(&SideEffect::MarkPaid) { PaymentStatus::Paid } else { current }
    }
    pub fn has(&self, effect: SideEffect) -> bool { self.effects.contains(&effect) }
}

/// A delivered order is always settled: delivery implies payment.
pub const DELIVERY_SETTLES_PAYMENT: bool = true;

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pending => "pending", Self::Paid => "paid" }
    }
    pub fn parse(value: &str) -> Option<Self> {
        match value { "pending" => Some(Self::Pending), "paid" => Some(Self::Paid), _ => None }
    }
}

/// Compute the outcome of applying `event` to an order currently in
/// `(status, payment)`.
pub fn transition(status: OrderStatus, payment: PaymentStatus, event: OrderEvent) -> Result<Transition, OrderError> {
    use OrderEvent as E;
    use OrderStatus as S;
    use SideEffect as FX;

    let (order_status, mut effects) = match (status, event) {
        (S::Pending, E::Process) => (S::Processing, vec![FX::StampProcessingAt]),
        (S::Processing, E::Ship) => (S::Shipped, vec![FX::StampShippedAt]),
        (S::Shipped, E::Deliver) => (S::Delivered, vec![FX::StampDeliveredAt]),
        // Delivered goods are with the customer; their stock is not returned.
        (S::Delivered, E::Cancel) => (S::Cancelled, vec![FX::StampCancelledAt]),
        (s, E::Cancel) if s != S::Cancelled => (S::Cancelled, vec![FX::StampCancelledAt, FX::RestockItems]),
        (s, E::MarkPaid) if s != S::Cancelled => {
            if payment == PaymentStatus::Paid { return Err(OrderError::AlreadyPaid); }
            (s, vec![])
        }
        (from, event) => return Err(OrderError::InvalidTransition { from, event }),
    };

    let settles = event == E::MarkPaid || (DELIVERY_SETTLES_PAYMENT && order_status == S::Delivered);
    if settles && payment != PaymentStatus::Paid {
        effects.push(FX::MarkPaid);
    }

    Ok(Transition { order_status, effects })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Cannot apply {event:?} to an order that is {}", .from.as_str())]
    InvalidTransition { from: OrderStatus, event: OrderEvent },
    #[error("Order is already paid")]
    AlreadyPaid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_workflow() {
        let t = transition(OrderStatus::Pending, PaymentStatus::Pending, OrderEvent::Process).unwrap();
        assert_eq!(t.order_status, OrderStatus::Processing);
        assert_eq!(t.effects, vec![SideEffect::StampProcessingAt]);
        let t = transition(OrderStatus::Processing, PaymentStatus::Pending, OrderEvent::Ship).unwrap();
        assert_eq!(t.order_status, OrderStatus::Shipped);
        assert_eq!(t.payment_status(PaymentStatus::Pending), PaymentStatus::Pending);
    }

    #[test]
    fn test_deliver_marks_paid() {
        let t = transition(OrderStatus::Shipped, PaymentStatus::Pending, OrderEvent::Deliver).unwrap();
        assert_eq!(t.order_status, OrderStatus::Delivered);
        assert!(t.has(SideEffect::StampDeliveredAt));
        assert!(t.has(SideEffect::MarkPaid));
        assert_eq!(t.payment_status(PaymentStatus::Pending), PaymentStatus::Paid);
    }

    #[test]
    fn test_deliver_already_paid_keeps_paid_timestamp() {
        let t = transition(OrderStatus::Shipped, PaymentStatus::Paid, OrderEvent::Deliver).unwrap();
        assert!(!t.has(SideEffect::MarkPaid));
        assert_eq!(t.payment_status(PaymentStatus::Paid), PaymentStatus::Paid);
    }

    #[test]
    fn test_cancel_from_any_open_state() {
        for s in [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Shipped] {
            let t = transition(s, PaymentStatus::Pending, OrderEvent::Cancel).unwrap();
            assert_eq!(t.order_status, OrderStatus::Cancelled);
            assert!(t.has(SideEffect::RestockItems));
        }
    }

    #[test]
    fn test_cancel_delivered_order() {
        let t = transition(OrderStatus::Delivered, PaymentStatus::Paid, OrderEvent::Cancel).unwrap();
        assert_eq!(t.order_status, OrderStatus::Cancelled);
        assert_eq!(t.effects, vec![SideEffect::StampCancelledAt]);
        assert_eq!(t.payment_status(PaymentStatus::Paid), PaymentStatus::Paid);
    }

    #[test]
    fn test_cancelled_is_final() {
        assert_eq!(
            transition(OrderStatus::Cancelled, PaymentStatus::Pending, OrderEvent::Cancel),
            Err(OrderError::InvalidTransition { from: OrderStatus::Cancelled, event: OrderEvent::Cancel })
        );
        assert!(transition(OrderStatus::Delivered, PaymentStatus::Paid, OrderEvent::Ship).is_err());
        assert!(transition(OrderStatus::Cancelled, PaymentStatus::Pending, OrderEvent::Process).is_err());
        assert!(transition(OrderStatus::Cancelled, PaymentStatus::Pending, OrderEvent::MarkPaid).is_err());
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(transition(OrderStatus::Pending, PaymentStatus::Pending, OrderEvent::Deliver).is_err());
        assert!(transition(OrderStatus::Pending, PaymentStatus::Pending, OrderEvent::Ship).is_err());
    }

    #[test]
    fn test_mark_paid() {
        let t = transition(OrderStatus::Processing, PaymentStatus::Pending, OrderEvent::MarkPaid).unwrap();
        assert_eq!(t.order_status, OrderStatus::Processing);
        assert_eq!(t.effects, vec![SideEffect::MarkPaid]);
        assert_eq!(
            transition(OrderStatus::Processing, PaymentStatus::Paid, OrderEvent::MarkPaid),
            Err(OrderError::AlreadyPaid)
        );
    }

    #[test]
    fn test_status_strings() {
        for s in [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert_eq!(OrderStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }
}
