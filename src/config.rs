//! Service configuration loaded from environment variables.
//!
//! `main` calls `dotenvy::dotenv()` first, so a local `.env` file works for
//! development.

use std::collections::HashMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} is invalid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Empty means permissive CORS.
    pub cors_origins: Vec<String>,
    pub default_page_size: u32,
    pub nats_url: Option<String>,
    pub auth: AuthConfig,
    /// `None` disables uploads.
    pub media: Option<MediaConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// `None` rejects every bearer token.
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Lowercased emails allowed into `/admin`.
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var              | Default      |
    /// |----------------------|--------------|
    /// | `DATABASE_URL`       | required     |
    /// | `HOST`               | `0.0.0.0`    |
    /// | `PORT`               | `8083`       |
    /// | `DB_MAX_CONNECTIONS` | `10`         |
    /// | `CORS_ORIGINS`       | permissive   |
    /// | `DEFAULT_PAGE_SIZE`  | `12`         |
    /// | `NATS_URL`           | unset        |
    /// | `AUTH_JWT_SECRET`    | unset        |
    /// | `AUTH_ISSUER`        | unset        |
    /// | `AUTH_AUDIENCE`      | unset        |
    /// | `ADMIN_EMAILS`       | empty        |
    /// | `MEDIA_CLOUD_NAME`, `MEDIA_API_KEY`, `MEDIA_API_SECRET` | unset |
    /// | `MEDIA_FOLDER`       | `abrar-shop` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", get("PORT"), 8083u16)?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10u32)?;
        let default_page_size = parse_or("DEFAULT_PAGE_SIZE", get("DEFAULT_PAGE_SIZE"), 12u32)?;
        if default_page_size == 0 || default_page_size > crate::catalog::MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid { name: "DEFAULT_PAGE_SIZE", value: default_page_size.to_string() });
        }

        let auth = AuthConfig {
            jwt_secret: get("AUTH_JWT_SECRET"),
            issuer: get("AUTH_ISSUER"),
            audience: get("AUTH_AUDIENCE"),
            admin_emails: split_list(get("ADMIN_EMAILS")).into_iter().map(|e| e.to_lowercase()).collect(),
        };

        let media = match (get("MEDIA_CLOUD_NAME"), get("MEDIA_API_KEY"), get("MEDIA_API_SECRET")) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(MediaConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: get("MEDIA_FOLDER").unwrap_or_else(|| "abrar-shop".into()),
            }),
            (None, None, None) => None,
            _ => return Err(ConfigError::Missing("MEDIA_CLOUD_NAME/MEDIA_API_KEY/MEDIA_API_SECRET")),
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            cors_origins: split_list(get("CORS_ORIGINS")),
            default_page_size,
            nats_url: get("NATS_URL"),
            auth,
            media,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply() {
        let cfg = AppConfig::from_map(&vars(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8083");
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.default_page_size, 12);
        assert!(cfg.cors_origins.is_empty());
        assert!(cfg.media.is_none());
        assert!(cfg.auth.jwt_secret.is_none());
    }

    #[test]
    fn database_url_required() {
        assert_eq!(AppConfig::from_map(&HashMap::new()).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn invalid_port_rejected() {
        let err = AppConfig::from_map(&vars(&[("DATABASE_URL", "x"), ("PORT", "eighty")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { name: "PORT", value: "eighty".into() });
    }

    #[test]
    fn lists_and_media_parse() {
        let cfg = AppConfig::from_map(&vars(&[
            ("DATABASE_URL", "x"),
            ("ADMIN_EMAILS", "Owner@Shop.com, ops@shop.com ,"),
            ("CORS_ORIGINS", "https://shop.example"),
            ("MEDIA_CLOUD_NAME", "demo"),
            ("MEDIA_API_KEY", "k"),
            ("MEDIA_API_SECRET", "s"),
        ]))
        .unwrap();
        assert_eq!(cfg.auth.admin_emails, vec!["owner@shop.com", "ops@shop.com"]);
        assert_eq!(cfg.cors_origins, vec!["https://shop.example"]);
        assert_eq!(cfg.media.unwrap().folder, "abrar-shop");
    }

    #[test]
    fn partial_media_config_rejected() {
        let err = AppConfig::from_map(&vars(&[("DATABASE_URL", "x"), ("MEDIA_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }
}
