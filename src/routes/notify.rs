//! Transactional email endpoints, one per notification the storefront sends.
//! Each loads the order, renders its stored template and delivers over SMTP;
//! failures land in the audit table and surface to the caller.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::audit;
use crate::email;
use crate::error::ApiError;
use crate::models::{EmailTemplate, Order};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub order_number: String,
}

/// Render the template stored under `template_key` for this order and send it
/// to the order's customer.
pub async fn send_order_email(
    state: &AppState,
    order: &Order,
    template_key: &str,
) -> Result<(), ApiError> {
    let mailer = state.mailer.as_ref().ok_or(ApiError::EmailNotConfigured)?;
    let template = sqlx::query_as::<_, EmailTemplate>("SELECT * FROM email_templates WHERE key = $1")
        .bind(template_key)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest(format!("unknown email template: {template_key}")))?;

    let vars = email::order_vars(order, &state.config);
    let subject = email::render(&template.subject, &vars);
    let body = email::render(&template.body, &vars);
    mailer.send(&order.customer_email, &subject, &body).await
}

async fn notify(
    state: AppState,
    order_number: &str,
    template_key: &str,
) -> Result<Json<serde_json::Value>, ApiError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = $1")
        .bind(order_number)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    match send_order_email(&state, &order, template_key).await {
        Ok(()) => {
            tracing::info!(order = order_number, template = template_key, "notification sent");
            Ok(Json(serde_json::json!({ "sent": true })))
        }
        Err(e) => {
            audit::record(
                &state.db,
                "email",
                "notification failed",
                serde_json::json!({
                    "order_number": order_number,
                    "template": template_key,
                    "error": e.to_string(),
                }),
            )
            .await;
            Err(e)
        }
    }
}

pub async fn order_confirmation(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    notify(state, &req.order_number, "order_confirmation").await
}

pub async fn delivery(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    notify(state, &req.order_number, "delivery").await
}

pub async fn payment_status(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    notify(state, &req.order_number, "payment_status").await
}

pub async fn refund(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    notify(state, &req.order_number, "refund").await
}

pub async fn cancellation(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    notify(state, &req.order_number, "cancellation").await
}
