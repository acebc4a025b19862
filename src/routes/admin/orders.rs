//! Admin order management: listing, status transitions, delivery-info
//! attachment.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::audit;
use crate::error::ApiError;
use crate::events::{self, OrderEvent};
use crate::models::{order_status, payment_status, Order};
use crate::routes::orders::{load_items, OrderDetail};
use crate::routes::{notify, ListParams, PaginatedResponse};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Order>>, ApiError> {
    let (limit, offset, page) = params.window();
    let search = params.search.as_deref().filter(|s| !s.trim().is_empty());
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::text IS NULL OR order_number ILIKE '%' || $2 || '%'
                OR customer_email ILIKE '%' || $2 || '%')
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(&params.status)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::text IS NULL OR order_number ILIKE '%' || $2 || '%'
                OR customer_email ILIKE '%' || $2 || '%')",
    )
    .bind(&params.status)
    .bind(search)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(PaginatedResponse { data: orders, total: total.0, page }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;
    let items = load_items(&state.db, order.id).await?;
    Ok(Json(OrderDetail { order, items }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    if !order_status::ALL.contains(&req.status.as_str()) {
        return Err(ApiError::BadRequest(format!("unknown order status: {}", req.status)));
    }

    // Refunds flip the payment status as well.
    let new_payment_status = match req.status.as_str() {
        order_status::PAID => Some(payment_status::PAID),
        order_status::REFUNDED => Some(payment_status::REFUNDED),
        _ => None,
    };

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2,
                payment_status = COALESCE($3, payment_status),
                updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.status)
    .bind(new_payment_status)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    let event = match order.status.as_str() {
        order_status::PAID => Some(OrderEvent::Paid {
            order_id: order.id,
            order_number: order.order_number.clone(),
        }),
        order_status::COMPLETED => Some(OrderEvent::Completed {
            order_id: order.id,
            order_number: order.order_number.clone(),
        }),
        order_status::CANCELLED => Some(OrderEvent::Cancelled {
            order_id: order.id,
            order_number: order.order_number.clone(),
        }),
        order_status::REFUNDED => Some(OrderEvent::Refunded {
            order_id: order.id,
            order_number: order.order_number.clone(),
        }),
        _ => None,
    };
    if let Some(event) = event {
        events::publish(state.nats.as_ref(), &event).await;
    }

    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct AttachDeliveryRequest {
    pub delivery_info: String,
    /// Skip the delivery email, e.g. when re-sending corrected credentials
    /// manually.
    #[serde(default)]
    pub suppress_email: bool,
}

/// Attach the redeemable code/credential and complete the order.
pub async fn attach_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttachDeliveryRequest>,
) -> Result<Json<Order>, ApiError> {
    if req.delivery_info.trim().is_empty() {
        return Err(ApiError::BadRequest("delivery_info must not be empty".into()));
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET delivery_info = $2, status = 'completed', updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.delivery_info.trim())
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    events::publish(
        state.nats.as_ref(),
        &OrderEvent::Completed { order_id: order.id, order_number: order.order_number.clone() },
    )
    .await;

    if !req.suppress_email {
        if let Err(e) = notify::send_order_email(&state, &order, "delivery").await {
            audit::record(
                &state.db,
                "email",
                "delivery email failed",
                serde_json::json!({ "order_number": order.order_number, "error": e.to_string() }),
            )
            .await;
        }
    }

    Ok(Json(order))
}
