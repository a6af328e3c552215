use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin form for creating or replacing a brand.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BrandInput {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}
