use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use validator::Validate;

use super::{conflict_on_unique, in_use_on_fk, replaced_media};
use crate::auth::AdminUser;
use crate::catalog::CategoryTree;
use crate::domain::value_objects::Slug;
use crate::error::{AppError, AppResult};
use crate::media::remove_quietly;
use crate::models::category::{Category, CategoryInput};
use crate::repositories::category_repo::{CategoryRecord, CategoryRepo};
use crate::state::AppState;
use crate::DbId;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/categories", get(list).post(create))
        .route("/admin/categories/:id", get(show).put(update).delete(destroy))
}

fn resolve_slug(input: &CategoryInput) -> AppResult<Slug> {
    let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Slug::new(s),
        None => Slug::from_name(&input.name),
    };
    slug.map_err(|e| AppError::BadRequest(format!("Invalid slug: {e}")))
}

/// The parent must exist and, for an existing category, must not be the
/// category itself or anything below it.
fn check_parent(tree: &CategoryTree, id: Option<DbId>, parent_id: Option<DbId>) -> AppResult<()> {
    let Some(parent) = parent_id else {
        return Ok(());
    };
    if !tree.contains(parent) {
        return Err(AppError::BadRequest("Parent category does not exist".into()));
    }
    if let Some(id) = id {
        if tree.would_cycle(id, parent) {
            return Err(AppError::BadRequest(
                "A category cannot be placed under itself or one of its subcategories".into(),
            ));
        }
    }
    Ok(())
}

fn record<'a>(input: &'a CategoryInput, slug: &'a Slug) -> CategoryRecord<'a> {
    CategoryRecord {
        name: input.name.trim(),
        slug: slug.as_str(),
        parent_id: input.parent_id,
        image_url: input.image_url.as_deref(),
        image_public_id: input.image_public_id.as_deref(),
        is_featured: input.is_featured,
    }
}

async fn list(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(CategoryRepo::list_all(&state.pool).await?))
}

async fn show(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<Json<Category>> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Category", id))
}

async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    input.validate()?;
    let slug = resolve_slug(&input)?;
    let tree = CategoryTree::new(CategoryRepo::list_nodes(&state.pool).await?);
    check_parent(&tree, None, input.parent_id)?;

    let duplicate = || format!("A category with slug '{}' already exists", slug.as_str());
    if CategoryRepo::slug_exists(&state.pool, slug.as_str(), None).await? {
        return Err(AppError::Conflict(duplicate()));
    }

    let category = CategoryRepo::create(&state.pool, &record(&input, &slug))
        .await
        .map_err(|e| conflict_on_unique(e, duplicate()))?;

    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    input.validate()?;
    let existing = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Category", id))?;

    let slug = resolve_slug(&input)?;
    let tree = CategoryTree::new(CategoryRepo::list_nodes(&state.pool).await?);
    check_parent(&tree, Some(id), input.parent_id)?;

    let duplicate = || format!("A category with slug '{}' already exists", slug.as_str());
    if CategoryRepo::slug_exists(&state.pool, slug.as_str(), Some(id)).await? {
        return Err(AppError::Conflict(duplicate()));
    }

    let category = CategoryRepo::update(&state.pool, id, &record(&input, &slug))
        .await
        .map_err(|e| conflict_on_unique(e, duplicate()))?
        .ok_or_else(|| AppError::not_found("Category", id))?;

    if let Some(old) = replaced_media(existing.image_public_id.as_deref(), category.image_public_id.as_deref()) {
        remove_quietly(state.media.as_ref(), [old]).await;
    }
    Ok(Json(category))
}

async fn destroy(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let category = CategoryRepo::delete(&state.pool, id)
        .await
        .map_err(|e| in_use_on_fk(e, "Category still has products or subcategories"))?
        .ok_or_else(|| AppError::not_found("Category", id))?;

    remove_quietly(state.media.as_ref(), category.image_public_id).await;
    tracing::info!(category_id = id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryNode;

    fn tree() -> CategoryTree {
        // 1 ─ 2 ─ 3, 4 standalone
        CategoryTree::new([
            CategoryNode { id: 1, parent_id: None },
            CategoryNode { id: 2, parent_id: Some(1) },
            CategoryNode { id: 3, parent_id: Some(2) },
            CategoryNode { id: 4, parent_id: None },
        ])
    }

    #[test]
    fn parent_must_exist() {
        assert!(check_parent(&tree(), None, Some(99)).is_err());
        assert!(check_parent(&tree(), None, Some(3)).is_ok());
        assert!(check_parent(&tree(), None, None).is_ok());
    }

    #[test]
    fn parent_cannot_be_self_or_descendant() {
        assert!(check_parent(&tree(), Some(1), Some(1)).is_err());
        assert!(check_parent(&tree(), Some(1), Some(3)).is_err());
        assert!(check_parent(&tree(), Some(3), Some(4)).is_ok());
        assert!(check_parent(&tree(), Some(2), Some(1)).is_ok());
    }
}
