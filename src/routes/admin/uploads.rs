//! Image uploads to the media host. The returned [`MediaRef`] is sent back
//! with the product/brand/category/slider form.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::auth::AdminUser;
use crate::error::{AppError, AppResult};
use crate::media::MediaRef;
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/uploads", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("image/"))
}

/// Accepts one `file` field.
async fn upload(
    State(state): State<AppState>,
    _admin: AdminUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<MediaRef>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        if !is_image(content_type.as_deref()) {
            return Err(AppError::BadRequest("Only image files can be uploaded".into()));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }

        let media = state.media.upload(&file_name, content_type.as_deref(), bytes.to_vec()).await?;
        tracing::info!(public_id = %media.public_id, size = bytes.len(), "Image uploaded");
        return Ok((StatusCode::CREATED, Json(media)));
    }
    Err(AppError::BadRequest("Missing 'file' field".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_are_accepted() {
        assert!(is_image(Some("image/png")));
        assert!(!is_image(Some("application/pdf")));
        assert!(!is_image(None));
    }
}
