use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::DbId;

/// Promotional banner on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Slider {
    pub id: DbId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub image_public_id: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SliderInput {
    #[validate(length(min = 1, max = 160, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 240))]
    pub subtitle: Option<String>,
    #[validate(url)]
    pub image_url: String,
    pub image_public_id: Option<String>,
    #[validate(length(max = 500))]
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
