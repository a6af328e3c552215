//! Abrar Shop
//!
//! Storefront and back-office API for a single-currency online shop.
//!
//! ## Features
//! - Catalog browsing: category subtree filters, brand and flag filters,
//!   text search, sorting, pagination and facets
//! - Checkout with server-side price snapshots and stock reservation
//! - Order status workflow with timestamps and payment settlement
//! - Admin CRUD for products, brands, categories and sliders
//! - Reviews, customer profiles, image uploads

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod media;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

/// Primary key type for every `BIGSERIAL` table.
pub type DbId = i64;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use state::AppState;
