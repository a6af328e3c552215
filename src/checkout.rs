//! Checkout: request validation, delivery fee table, and order placement.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use validator::{Validate, ValidationError};

use crate::domain::aggregates::{Cart, CartError, CartLine};
use crate::error::AppResult;
use crate::models::order::{NewOrder, OrderWithItems};
use crate::repositories::OrderRepo;
use crate::DbId;

/// Largest quantity accepted for a single line.
pub const MAX_LINE_QUANTITY: u32 = 100;

/// Delivery zone. The fee is a flat amount per order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Inside Gaibandha district.
    Gaibandha,
    /// Anywhere else in the country.
    FullCountry,
}

impl DeliveryMethod {
    pub fn fee(&self) -> Decimal {
        match self {
            Self::Gaibandha => Decimal::from(50),
            Self::FullCountry => Decimal::from(100),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gaibandha => "gaibandha",
            Self::FullCountry => "full_country",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    Bkash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::Bkash => "bkash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: DbId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub customer_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 80, message = "District is required"))]
    pub district: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[validate(custom = "validate_items")]
    pub items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    /// Requested lines folded into a cart (duplicates merged).
    pub fn cart(&self) -> Result<Cart, CartError> {
        Cart::from_lines(
            self.items
                .iter()
                .map(|item| CartLine { product_id: item.product_id, quantity: item.quantity }),
        )
    }

    /// Order header for this request. Blank optional fields become `None`.
    pub fn new_order(&self, user_id: Option<String>) -> NewOrder {
        NewOrder {
            user_id,
            customer_name: self.customer_name.trim().to_string(),
            email: non_blank(self.email.as_deref()),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            district: self.district.trim().to_string(),
            notes: non_blank(self.notes.as_deref()),
            delivery_method: self.delivery_method.as_str().to_string(),
            delivery_fee: self.delivery_method.fee(),
            payment_method: self.payment_method.as_str().to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Optional form fields arrive as `""` when left empty.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank(value.as_deref()))
}

/// Bangladeshi mobile number: 11 digits starting with `01`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.len() == 11 && phone.starts_with("01") && phone.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(());
    }
    let mut err = ValidationError::new("phone");
    err.message = Some(Cow::from("Enter an 11-digit mobile number starting with 01"));
    Err(err)
}

fn validate_items(items: &[CheckoutItem]) -> Result<(), ValidationError> {
    let message = if items.is_empty() {
        "Your cart is empty"
    } else if items.iter().any(|i| i.product_id <= 0) {
        "Cart contains an unknown product"
    } else if items.iter().any(|i| i.quantity == 0 || merged_quantity(items, i.product_id) > MAX_LINE_QUANTITY) {
        "Quantity must be between 1 and 100"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("items");
    err.message = Some(Cow::from(message));
    Err(err)
}

/// Total requested for `product_id` once repeated lines are merged.
fn merged_quantity(items: &[CheckoutItem], product_id: DbId) -> u32 {
    items
        .iter()
        .filter(|i| i.product_id == product_id)
        .fold(0u32, |total, i| total.saturating_add(i.quantity))
}

/// Validate `req` and write the order with its lines in one transaction.
pub async fn place_order(pool: &PgPool, req: &CheckoutRequest, user_id: Option<String>) -> AppResult<OrderWithItems> {
    req.validate()?;
    let cart = req.cart()?;
    let new = req.new_order(user_id);
    OrderRepo::create_from_checkout(pool, &new, cart).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Rahim Uddin".into(),
            phone: "01712345678".into(),
            email: Some(" ".into()),
            address: "Station Road".into(),
            district: "Gaibandha".into(),
            notes: None,
            delivery_method: DeliveryMethod::Gaibandha,
            payment_method: PaymentMethod::CashOnDelivery,
            items: vec![
                CheckoutItem { product_id: 1, quantity: 2 },
                CheckoutItem { product_id: 2, quantity: 1 },
            ],
        }
    }

    #[test]
    fn fee_table() {
        assert_eq!(DeliveryMethod::Gaibandha.fee(), dec!(50));
        assert_eq!(DeliveryMethod::FullCountry.fee(), dec!(100));
    }

    #[test]
    fn delivery_method_wire_names() {
        let m: DeliveryMethod = serde_json::from_str("\"full_country\"").unwrap();
        assert_eq!(m, DeliveryMethod::FullCountry);
        assert!(serde_json::from_str::<DeliveryMethod>("\"express\"").is_err());
    }

    #[test]
    fn phone_rules() {
        assert!(validate_phone("01712345678").is_ok());
        assert!(validate_phone("0171234567").is_err());
        assert!(validate_phone("02712345678").is_err());
        assert!(validate_phone("0171234567a").is_err());
    }

    #[test]
    fn valid_request_passes() {
        let mut req = request();
        req.email = None;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn invalid_fields_are_reported() {
        let mut req = request();
        req.phone = "123".into();
        req.customer_name.clear();
        req.items.clear();
        req.email = None;
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("customer_name"));
        assert!(fields.contains_key("items"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut req = request();
        req.email = None;
        req.items[0].quantity = 0;
        assert!(req.validate().unwrap_err().field_errors().contains_key("items"));
    }

    #[test]
    fn merged_duplicates_respect_the_line_limit() {
        let mut req = request();
        req.email = None;
        req.items = vec![
            CheckoutItem { product_id: 1, quantity: MAX_LINE_QUANTITY },
            CheckoutItem { product_id: 1, quantity: MAX_LINE_QUANTITY },
        ];
        let errors = req.validate().unwrap_err();
        let items = &errors.field_errors()["items"];
        assert_eq!(items[0].message.as_deref(), Some("Quantity must be between 1 and 100"));

        req.items = vec![CheckoutItem { product_id: 1, quantity: 60 }, CheckoutItem { product_id: 1, quantity: 40 }];
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_optional_fields_deserialize_to_none() {
        let req: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "customer_name": "Rahim Uddin",
            "phone": "01712345678",
            "email": "",
            "address": "Station Road",
            "district": "Gaibandha",
            "notes": "   ",
            "delivery_method": "gaibandha",
            "items": [{ "product_id": 1, "quantity": 1 }]
        }))
        .unwrap();
        assert_eq!(req.email, None);
        assert_eq!(req.notes, None);
        assert!(req.validate().is_ok());

        let bad: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "customer_name": "Rahim Uddin",
            "phone": "01712345678",
            "email": "not-an-email",
            "address": "Station Road",
            "district": "Gaibandha",
            "delivery_method": "gaibandha",
            "items": [{ "product_id": 1, "quantity": 1 }]
        }))
        .unwrap();
        assert!(bad.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn header_carries_fee_and_drops_blank_email() {
        let order = request().new_order(Some("uid-1".into()));
        assert_eq!(order.delivery_fee, dec!(50));
        assert_eq!(order.delivery_method, "gaibandha");
        assert_eq!(order.payment_method, "cash_on_delivery");
        assert_eq!(order.email, None);
        assert_eq!(order.user_id.as_deref(), Some("uid-1"));
    }

    #[test]
    fn total_is_subtotal_plus_fee() {
        let req = CheckoutRequest { delivery_method: DeliveryMethod::FullCountry, ..request() };
        let mut cart = req.cart().unwrap();
        cart.price_line(1, "Panjabi", dec!(199.00)).unwrap();
        cart.price_line(2, "Cap", dec!(10.50)).unwrap();
        let header = req.new_order(None);
        assert_eq!(cart.subtotal(), dec!(408.50));
        assert_eq!(cart.subtotal() + header.delivery_fee, dec!(508.50));
    }

    #[test]
    fn duplicate_lines_merge() {
        let mut req = request();
        req.items.push(CheckoutItem { product_id: 1, quantity: 3 });
        let cart = req.cart().unwrap();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 5);
    }
}
