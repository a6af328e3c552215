//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{normalize_keywords, ProductDraft, ProductError, ProductStatus};
pub use order::{transition, OrderError, OrderEvent, OrderStatus, PaymentStatus, SideEffect, Transition};
pub use cart::{Cart, CartError, CartItem, CartLine};
