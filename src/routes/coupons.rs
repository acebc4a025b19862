//! Coupon validation endpoint.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::coupon::{discount_for, CouponRejection};
use crate::error::ApiError;
use crate::models::Coupon;
use crate::routes::cart;
use crate::state::AppState;

/// Look up a coupon and compute the discount it grants on `subtotal` for the
/// given customer. A missing row rejects the same way an inactive one does.
pub async fn resolve(
    conn: &mut sqlx::PgConnection,
    code: &str,
    customer_email: &str,
    subtotal: i64,
) -> Result<(Coupon, i64), ApiError> {
    let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(ApiError::CouponRejected(CouponRejection::UnknownCode))?;

    let redeemed: (bool,) = sqlx::query_as(
        "SELECT EXISTS (
            SELECT 1 FROM coupon_redemptions
            WHERE coupon_id = $1 AND LOWER(customer_email) = LOWER($2)
         )",
    )
    .bind(coupon.id)
    .bind(customer_email)
    .fetch_one(&mut *conn)
    .await?;

    let discount = discount_for(&coupon, subtotal, Utc::now(), redeemed.0)?;
    Ok((coupon, discount))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateCouponRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub session_id: String,
    #[validate(email)]
    pub customer_email: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateCouponResponse {
    pub code: String,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
}

pub async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateCouponRequest>,
) -> Result<Json<ValidateCouponResponse>, ApiError> {
    req.validate()?;
    let lines = cart::lines(&state.db, &req.session_id).await?;
    if lines.is_empty() {
        return Err(ApiError::BadRequest("cart is empty".into()));
    }
    let subtotal = cart::subtotal(&lines);
    let code = req.code.trim().to_uppercase();
    let mut conn = state.db.acquire().await?;
    let (coupon, discount) = resolve(&mut conn, &code, &req.customer_email, subtotal).await?;
    Ok(Json(ValidateCouponResponse {
        code: coupon.code,
        subtotal,
        discount,
        total: subtotal - discount,
    }))
}
