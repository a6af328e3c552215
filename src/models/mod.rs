//! Row types (`sqlx::FromRow`) and request DTOs (`validator::Validate`).
//!
//! One module per table. Rows serialize straight into API responses; DTOs
//! carry the validation rules for admin forms and customer submissions.

pub mod brand;
pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod slider;
pub mod user;
