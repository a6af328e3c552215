//! Identity-provider token verification and request extractors.
//!
//! The identity provider issues HS256-signed ID tokens. This service only
//! verifies them; sign-in and sign-out happen between the client and the
//! provider.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Claims carried by an ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Provider uid.
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication is not configured")]
    NotConfigured,
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Verify `token` against the configured secret, issuer and audience.
pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    let secret = config.jwt_secret.as_deref().ok_or(AuthError::NotConfigured)?;

    let mut validation = Validation::new(Algorithm::HS256);
    match &config.issuer {
        Some(issuer) => validation.set_issuer(&[issuer]),
        None => validation.iss = None,
    }
    match &config.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims)
}

impl AuthConfig {
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Signed-in customer. Rejects with 401 when the token is missing or invalid.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let claims = verify_token(token, &state.config.auth).map_err(|err| {
            tracing::debug!(error = %err, "Rejected bearer token");
            AppError::Unauthorized
        })?;
        Ok(CurrentUser(claims))
    }
}

/// Optional identity: `None` without a header, 401 for a bad token.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if bearer_token(parts).is_none() {
            return Ok(MaybeUser(None));
        }
        let CurrentUser(claims) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(MaybeUser(Some(claims)))
    }
}

/// Back-office user: signed in with an email on the admin list, else 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(claims) = CurrentUser::from_request_parts(parts, state).await?;
        if !state.config.auth.is_admin(&claims.email) {
            tracing::warn!(uid = %claims.sub, "Non-admin denied back-office access");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: Some("test-secret".into()),
            issuer: None,
            audience: None,
            admin_emails: vec!["owner@abrar.shop".into()],
        }
    }

    fn token(secret: &str, exp: i64) -> String {
        let claims = Claims { sub: "uid-1".into(), email: "Owner@Abrar.shop".into(), name: None, exp };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn valid_token_verifies() {
        let claims = verify_token(&token("test-secret", future()), &config()).unwrap();
        assert_eq!(claims.sub, "uid-1");
    }

    #[test]
    fn wrong_secret_and_expiry_are_rejected() {
        assert!(verify_token(&token("other", future()), &config()).is_err());
        assert!(verify_token(&token("test-secret", 1_000), &config()).is_err());
    }

    #[test]
    fn missing_secret_is_not_configured() {
        let cfg = AuthConfig { jwt_secret: None, ..config() };
        assert!(matches!(verify_token("x", &cfg), Err(AuthError::NotConfigured)));
    }

    #[test]
    fn admin_match_ignores_case() {
        assert!(config().is_admin("OWNER@abrar.shop"));
        assert!(!config().is_admin("guest@abrar.shop"));
    }
}
