//! Public order lookup: the customer needs the order number plus the email
//! it was placed under.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{Order, OrderItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderLookup {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(lookup): Query<OrderLookup>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE order_number = $1 AND LOWER(customer_email) = LOWER($2)",
    )
    .bind(&number)
    .bind(&lookup.email)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    let items = load_items(&state.db, order.id).await?;
    Ok(Json(OrderDetail { order, items }))
}

pub async fn load_items(db: &sqlx::PgPool, order_id: uuid::Uuid) -> Result<Vec<OrderItem>, ApiError> {
    Ok(sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(db)
        .await?)
}
