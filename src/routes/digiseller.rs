//! Digiseller payment endpoints: hosted payment-URL generation and the
//! status webhook.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::audit;
use crate::error::ApiError;
use crate::events::{self, OrderEvent};
use crate::models::{payment_status, Order};
use crate::payments;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentUrlRequest {
    pub order_number: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentUrlResponse {
    pub url: String,
}

pub async fn payment_url(
    State(state): State<AppState>,
    Json(req): Json<PaymentUrlRequest>,
) -> Result<Json<PaymentUrlResponse>, ApiError> {
    let config = state.config.digiseller.as_ref().ok_or(ApiError::PaymentsNotConfigured)?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = $1")
        .bind(&req.order_number)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;
    if order.payment_status == payment_status::PAID {
        return Err(ApiError::BadRequest("order is already paid".into()));
    }

    // The order number doubles as the invoice id we hand to Digiseller.
    sqlx::query("UPDATE orders SET digiseller_invoice_id = $2, updated_at = NOW() WHERE id = $1")
        .bind(order.id)
        .bind(&order.order_number)
        .execute(&state.db)
        .await?;

    Ok(Json(PaymentUrlResponse { url: payments::payment_url(config, &order) }))
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub invoice_id: String,
    pub amount: i64,
    pub signature: String,
}

pub async fn webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let config = state.config.digiseller.as_ref().ok_or(ApiError::PaymentsNotConfigured)?;

    if !payments::verify_signature(config, &payload.invoice_id, payload.amount, &payload.signature) {
        audit::record(
            &state.db,
            "digiseller",
            "webhook signature rejected",
            serde_json::json!({ "invoice_id": payload.invoice_id }),
        )
        .await;
        return Err(ApiError::InvalidSignature);
    }

    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE digiseller_invoice_id = $1 OR order_number = $1",
    )
    .bind(&payload.invoice_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    // Idempotency is a single status check: a repeated callback is a no-op.
    if order.payment_status == payment_status::PAID {
        return Ok(Json(serde_json::json!({ "status": "ok" })));
    }

    if payload.amount != order.total {
        audit::record(
            &state.db,
            "digiseller",
            "webhook amount mismatch",
            serde_json::json!({
                "invoice_id": payload.invoice_id,
                "expected": order.total,
                "received": payload.amount,
            }),
        )
        .await;
        return Err(ApiError::BadRequest("amount does not match order total".into()));
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET payment_status = 'paid', status = 'paid', updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(order.id)
    .fetch_one(&state.db)
    .await?;

    events::publish(
        state.nats.as_ref(),
        &OrderEvent::Paid { order_id: order.id, order_number: order.order_number.clone() },
    )
    .await;

    if let Err(e) = crate::routes::notify::send_order_email(&state, &order, "payment_status").await {
        audit::record(
            &state.db,
            "email",
            "payment status email failed",
            serde_json::json!({ "order_number": order.order_number, "error": e.to_string() }),
        )
        .await;
    }

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
