use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: DbId,
    pub product_id: DbId,
    pub user_id: Option<String>,
    pub user_name: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Published,
    Hidden,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetReviewStatus {
    pub status: ReviewStatus,
}

/// Published reviews for a product with their aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub reviews: Vec<Review>,
    pub count: i64,
    pub average_rating: Option<f64>,
}
