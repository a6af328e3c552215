use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::events::EventPublisher;
use crate::media::MediaHost;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaHost>,
    pub events: EventPublisher,
}
