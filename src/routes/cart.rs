//! Session-keyed cart endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::CartLine;
use crate::state::AppState;

const CART_LINES_SQL: &str = "SELECT ci.id, ci.product_id, ci.variant_id,
        p.name AS product_name, v.name AS variant_name, v.sku,
        v.price AS unit_price, v.stock, ci.quantity
     FROM cart_items ci
     JOIN products p ON p.id = ci.product_id
     JOIN product_variants v ON v.id = ci.variant_id
     WHERE ci.session_id = $1
     ORDER BY ci.created_at";

pub async fn lines(db: &sqlx::PgPool, session: &str) -> Result<Vec<CartLine>, ApiError> {
    Ok(sqlx::query_as::<_, CartLine>(CART_LINES_SQL).bind(session).fetch_all(db).await?)
}

pub fn subtotal(lines: &[CartLine]) -> i64 {
    lines.iter().map(CartLine::line_total).sum()
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: i64,
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    let items = lines(&state.db, &session).await?;
    let subtotal = subtotal(&items);
    Ok(Json(CartView { items, subtotal }))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub variant_id: Uuid,
    pub quantity: i32,
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>), ApiError> {
    if req.quantity < 1 {
        return Err(ApiError::BadRequest("quantity must be at least 1".into()));
    }
    let product_id: Option<(Uuid,)> = sqlx::query_as(
        "SELECT p.id FROM product_variants v
         JOIN products p ON p.id = v.product_id
         WHERE v.id = $1 AND p.status = 'active'",
    )
    .bind(req.variant_id)
    .fetch_optional(&state.db)
    .await?;
    let (product_id,) = product_id.ok_or(ApiError::NotFound)?;

    sqlx::query(
        "INSERT INTO cart_items (id, session_id, product_id, variant_id, quantity)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (session_id, variant_id)
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
    )
    .bind(Uuid::now_v7())
    .bind(&session)
    .bind(product_id)
    .bind(req.variant_id)
    .bind(req.quantity)
    .execute(&state.db)
    .await?;

    let items = lines(&state.db, &session).await?;
    let subtotal = subtotal(&items);
    Ok((StatusCode::CREATED, Json(CartView { items, subtotal })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

pub async fn update_item(
    State(state): State<AppState>,
    Path((session, id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    if req.quantity < 1 {
        return Err(ApiError::BadRequest("quantity must be at least 1".into()));
    }
    let updated = sqlx::query("UPDATE cart_items SET quantity = $3 WHERE session_id = $1 AND id = $2")
        .bind(&session)
        .bind(id)
        .bind(req.quantity)
        .execute(&state.db)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    let items = lines(&state.db, &session).await?;
    let subtotal = subtotal(&items);
    Ok(Json(CartView { items, subtotal }))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((session, id)): Path<(String, Uuid)>,
) -> Result<Json<CartView>, ApiError> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1 AND id = $2")
        .bind(&session)
        .bind(id)
        .execute(&state.db)
        .await?;
    let items = lines(&state.db, &session).await?;
    let subtotal = subtotal(&items);
    Ok(Json(CartView { items, subtotal }))
}

pub async fn clear(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&session)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
