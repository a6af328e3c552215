//! Repository for the `users` table (profiles synced from the identity provider).

use sqlx::PgPool;

use crate::models::user::{UpdateProfile, UserProfile};

const COLUMNS: &str = "id, email, name, phone, address, district, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserProfile>(&query).bind(id).fetch_optional(pool).await
    }

    /// Insert on first sign-in; afterwards refresh the email and fill the
    /// name only if the customer has not set one.
    pub async fn sync(pool: &PgPool, id: &str, email: &str, display_name: Option<&str>) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email, name) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET \
                 email = EXCLUDED.email, \
                 name = COALESCE(users.name, EXCLUDED.name), \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .bind(email)
            .bind(display_name)
            .fetch_one(pool)
            .await
    }

    /// Partial update; `None` fields keep their value.
    pub async fn update_profile(pool: &PgPool, id: &str, dto: &UpdateProfile) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 phone = COALESCE($3, phone), \
                 address = COALESCE($4, address), \
                 district = COALESCE($5, district), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.phone)
            .bind(&dto.address)
            .bind(&dto.district)
            .fetch_optional(pool)
            .await
    }
}
