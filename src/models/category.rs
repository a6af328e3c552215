use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<DbId>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin form for creating or replacing a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    pub slug: Option<String>,
    pub parent_id: Option<DbId>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// A category page: the category, its breadcrumb (root first) and direct children.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub breadcrumb: Vec<Category>,
    pub children: Vec<Category>,
}
