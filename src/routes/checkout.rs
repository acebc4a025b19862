//! Checkout: turn a cart into an order inside one transaction.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::audit;
use crate::error::ApiError;
use crate::events::{self, OrderEvent};
use crate::models::Order;
use crate::routes::{cart, coupons, notify};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub session_id: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
    pub payment_method: Option<String>,
    pub coupon_code: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

pub async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let lines = sqlx::query_as::<_, crate::models::CartLine>(
        "SELECT ci.id, ci.product_id, ci.variant_id,
                p.name AS product_name, v.name AS variant_name, v.sku,
                v.price AS unit_price, v.stock, ci.quantity
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         JOIN product_variants v ON v.id = ci.variant_id
         WHERE ci.session_id = $1
         ORDER BY ci.created_at
         FOR UPDATE OF ci, v",
    )
    .bind(&req.session_id)
    .fetch_all(&mut *tx)
    .await?;

    if lines.is_empty() {
        return Err(ApiError::BadRequest("cart is empty".into()));
    }
    for line in &lines {
        if line.stock < line.quantity {
            return Err(ApiError::InsufficientStock { sku: line.sku.clone() });
        }
    }
    let subtotal = cart::subtotal(&lines);

    let coupon_code = req.coupon_code.as_deref().map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty());
    let (coupon, discount) = match &coupon_code {
        Some(code) => {
            let (coupon, discount) =
                coupons::resolve(&mut *tx, code, &req.customer_email, subtotal).await?;
            (Some(coupon), discount)
        }
        None => (None, 0),
    };
    let total = subtotal - discount;

    let order_number = format!("ORD-{:08}", rand::random::<u32>());
    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, order_number, customer_email, customer_name, session_id,
                             status, payment_status, payment_method,
                             subtotal, discount, total, currency, coupon_code, notes)
         VALUES ($1, $2, $3, $4, $5, 'pending', 'pending', $6, $7, $8, $9, $10, $11, $12)
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&order_number)
    .bind(&req.customer_email)
    .bind(&req.customer_name)
    .bind(&req.session_id)
    .bind(&req.payment_method)
    .bind(subtotal)
    .bind(discount)
    .bind(total)
    .bind(&state.config.currency)
    .bind(coupon.as_ref().map(|c| c.code.clone()))
    .bind(&req.notes)
    .fetch_one(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, variant_id, name, variant_name,
                                      sku, quantity, unit_price, total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(Uuid::now_v7())
        .bind(order.id)
        .bind(line.product_id)
        .bind(line.variant_id)
        .bind(&line.product_name)
        .bind(&line.variant_name)
        .bind(&line.sku)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.line_total())
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query(
            "UPDATE product_variants SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
        )
        .bind(line.variant_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(ApiError::InsufficientStock { sku: line.sku.clone() });
        }
    }

    if let Some(coupon) = &coupon {
        sqlx::query("UPDATE coupons SET usage_count = usage_count + 1 WHERE id = $1")
            .bind(coupon.id)
            .execute(&mut *tx)
            .await?;
        // A concurrent checkout with the same email can slip past the
        // redemption guard; the unique constraint catches the loser here.
        sqlx::query(
            "INSERT INTO coupon_redemptions (id, coupon_id, customer_email, order_id)
             VALUES ($1, $2, LOWER($3), $4)",
        )
        .bind(Uuid::now_v7())
        .bind(coupon.id)
        .bind(&req.customer_email)
        .bind(order.id)
        .execute(&mut *tx)
        .await
        .map_err(redemption_error)?;
    }

    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&req.session_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    events::publish(
        state.nats.as_ref(),
        &OrderEvent::Created {
            order_id: order.id,
            order_number: order.order_number.clone(),
            total: order.total,
        },
    )
    .await;

    // Confirmation email is best-effort; checkout already succeeded.
    if let Err(e) = notify::send_order_email(&state, &order, "order_confirmation").await {
        audit::record(
            &state.db,
            "email",
            "order confirmation failed",
            serde_json::json!({ "order_number": order.order_number, "error": e.to_string() }),
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(order)))
}

/// Postgres unique_violation on the redemption insert means another checkout
/// already redeemed this code for the same customer.
fn redemption_error(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return ApiError::CouponRejected(crate::coupon::CouponRejection::AlreadyRedeemed);
        }
    }
    ApiError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::redemption_error;
    use crate::error::ApiError;

    #[test]
    fn non_constraint_errors_pass_through() {
        assert!(matches!(
            redemption_error(sqlx::Error::RowNotFound),
            ApiError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
