//! Order lifecycle events, published to NATS when a broker is configured.

use serde::Serialize;
use uuid::Uuid;

const SUBJECT: &str = "takashop.orders";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Created { order_id: Uuid, order_number: String, total: i64 },
    Paid { order_id: Uuid, order_number: String },
    Completed { order_id: Uuid, order_number: String },
    Cancelled { order_id: Uuid, order_number: String },
    Refunded { order_id: Uuid, order_number: String },
}

/// Publish best-effort; a missing broker or publish failure only logs.
pub async fn publish(nats: Option<&async_nats::Client>, event: &OrderEvent) {
    let Some(client) = nats else { return };
    let payload = match serde_json::to_vec(event) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize order event");
            return;
        }
    };
    if let Err(e) = client.publish(SUBJECT, payload.into()).await {
        tracing::warn!(error = %e, "failed to publish order event");
    }
}
