//! Application-level error type for HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::aggregates::{CartError, OrderError, ProductError};
use crate::media::MediaError;

/// Every failure a handler can surface. Implements [`IntoResponse`] to
/// produce a consistent JSON body: `{ "error", "code", "fields"? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed form input, reported per field.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// Duplicate slug/sku found by the pre-flight check or the unique index.
    #[error("{0}")]
    Conflict(String),

    /// Delete blocked by rows that still reference the entity.
    #[error("{0}")]
    InUse(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// Media host or other third-party failure.
    #[error("External service error: {0}")]
    External(String),

    /// Checkout transaction rolled back; nothing was written.
    #[error("Order was not saved: {0}")]
    OrderNotPersisted(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound { entity, key: key.to_string() }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::External(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;
        let (status, code, message) = match &self {
            AppError::Validation(errors) => {
                fields = Some(field_messages(errors));
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Please correct the highlighted fields".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::InUse(msg) => (StatusCode::CONFLICT, "IN_USE", msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AppError::External(msg) => {
                tracing::error!(error = %msg, "External service failure");
                (StatusCode::BAD_GATEWAY, "EXTERNAL_ERROR", "Upload failed, please try again".to_string())
            }
            AppError::OrderNotPersisted(msg) => {
                tracing::error!(error = %msg, "Order not persisted");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ORDER_NOT_PERSISTED",
                    "Your order could not be saved. Please try again.".to_string(),
                )
            }
            AppError::Order(err) => (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string()),
            AppError::Product(ProductError::InsufficientInventory) => {
                (StatusCode::CONFLICT, "INSUFFICIENT_STOCK", self.to_string())
            }
            AppError::Product(err) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string()),
            AppError::Cart(err) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string()),
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = fields;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// `{ field: [message, ...] }` for every failed field.
fn field_messages(errors: &validator::ValidationErrors) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for (field, errs) in errors.field_errors() {
        let messages: Vec<String> = errs
            .iter()
            .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| format!("invalid {}", e.code)))
            .collect();
        out.insert(field.to_string(), json!(messages));
    }
    serde_json::Value::Object(out)
}

/// PostgreSQL `unique_violation`.
pub const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `foreign_key_violation`.
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// True when `err` is a foreign-key violation (delete of a referenced row).
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(PG_FOREIGN_KEY_VIOLATION))
}

/// True when `err` is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION))
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations map to 409 `CONFLICT`.
/// - Foreign-key violations map to 409 `IN_USE`.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found".to_string()),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(PG_UNIQUE_VIOLATION) => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                (StatusCode::CONFLICT, "CONFLICT", format!("Duplicate value violates unique constraint: {constraint}"))
            }
            Some(PG_FOREIGN_KEY_VIOLATION) => {
                (StatusCode::CONFLICT, "IN_USE", "This record is still in use".to_string())
            }
            _ => {
                tracing::error!(error = %db_err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        },
        other => {
            tracing::error!(error = %other, "Database error");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "An internal error occurred".to_string())
        }
    }
}
