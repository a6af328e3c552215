//! Back-office endpoints. Every handler takes an [`AdminUser`](crate::auth::AdminUser).
//!
//! ```text
//! GET|POST        /admin/products          GET|PUT|DELETE /admin/products/:id
//! GET|POST        /admin/brands            GET|PUT|DELETE /admin/brands/:id
//! GET|POST        /admin/categories        GET|PUT|DELETE /admin/categories/:id
//! GET|POST        /admin/sliders           GET|PUT|DELETE /admin/sliders/:id
//! POST            /admin/uploads
//! GET             /admin/orders            GET /admin/orders/:id
//! POST            /admin/orders/:id/transition
//! PUT             /admin/reviews/:id/status
//! ```

pub mod brands;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sliders;
pub mod uploads;

use axum::Router;

use crate::error::{is_foreign_key_violation, is_unique_violation, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(brands::router())
        .merge(categories::router())
        .merge(sliders::router())
        .merge(uploads::router())
        .merge(orders::router())
        .merge(reviews::router())
}

/// A unique index caught a duplicate the pre-flight check missed (concurrent
/// write); report it like the pre-flight would.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(message.into())
    } else {
        AppError::Database(err)
    }
}

/// Delete refused by a foreign key.
pub(crate) fn in_use_on_fk(err: sqlx::Error, message: impl Into<String>) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::InUse(message.into())
    } else {
        AppError::Database(err)
    }
}

/// Resource id of a replaced image, if the image changed.
pub(crate) fn replaced_media(old: Option<&str>, new: Option<&str>) -> Option<String> {
    match (old, new) {
        (Some(old), Some(new)) if old == new => None,
        (Some(old), _) => Some(old.to_string()),
        (None, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaced_media_only_when_changed() {
        assert_eq!(replaced_media(Some("a"), Some("a")), None);
        assert_eq!(replaced_media(Some("a"), Some("b")).as_deref(), Some("a"));
        assert_eq!(replaced_media(Some("a"), None).as_deref(), Some("a"));
        assert_eq!(replaced_media(None, Some("b")), None);
    }

    #[test]
    fn non_constraint_errors_pass_through() {
        assert!(matches!(conflict_on_unique(sqlx::Error::RowNotFound, "dup"), AppError::Database(_)));
        assert!(matches!(in_use_on_fk(sqlx::Error::PoolTimedOut, "busy"), AppError::Database(_)));
    }
}
