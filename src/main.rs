//! Abrar Shop API server.

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use abrar_shop::events::EventPublisher;
use abrar_shop::media::{CloudinaryHost, DisabledMediaHost, MediaHost};
use abrar_shop::{build_router, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!(error = %err, "NATS unavailable, events disabled");
                None
            }
        },
        None => None,
    };

    let media: Arc<dyn MediaHost> = match &config.media {
        Some(media) => Arc::new(CloudinaryHost::new(media)?),
        None => {
            tracing::warn!("Media host not configured, uploads disabled");
            Arc::new(DisabledMediaHost)
        }
    };
    if config.auth.jwt_secret.is_none() {
        tracing::warn!("AUTH_JWT_SECRET not set, signed-in and admin endpoints will reject every request");
    }

    let addr = config.bind_addr();
    let state = AppState {
        pool,
        config: Arc::new(config),
        media,
        events: EventPublisher::new(nats),
    };
    let app = build_router(state);

    tracing::info!("Abrar Shop listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
