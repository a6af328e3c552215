//! Domain event publishing over NATS.

use crate::domain::events::DomainEvent;

/// Publishes [`DomainEvent`]s when a NATS client is configured. Failures are
/// logged and never propagate to the request.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn publish(&self, event: DomainEvent) {
        let Some(client) = &self.nats else {
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, subject = event.subject(), "Failed to encode event");
                return;
            }
        };
        if let Err(err) = client.publish(event.subject().to_string(), payload.into()).await {
            tracing::warn!(error = %err, subject = event.subject(), "Failed to publish event");
        }
    }
}
