//! Data access, one repository per table.
//!
//! Repositories are zero-sized structs with `async fn(pool, ...)` methods
//! returning `sqlx::Error`; HTTP semantics are applied by the callers.

pub mod brand_repo;
pub mod category_repo;
pub mod order_repo;
pub mod product_repo;
pub mod review_repo;
pub mod slider_repo;
pub mod user_repo;

pub use brand_repo::BrandRepo;
pub use category_repo::CategoryRepo;
pub use order_repo::OrderRepo;
pub use product_repo::ProductRepo;
pub use review_repo::ReviewRepo;
pub use slider_repo::SliderRepo;
pub use user_repo::UserRepo;
