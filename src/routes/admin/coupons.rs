//! Admin coupon CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{coupon_kind, Coupon};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Coupon>>, ApiError> {
    let coupons = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(coupons))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CouponRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub kind: String,
    #[validate(range(min = 1))]
    pub value: i64,
    pub max_discount: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

impl CouponRequest {
    fn check(&self) -> Result<(), ApiError> {
        self.validate()?;
        match self.kind.as_str() {
            coupon_kind::PERCENTAGE => {
                if self.value > 100 {
                    return Err(ApiError::BadRequest("percentage value cannot exceed 100".into()));
                }
            }
            coupon_kind::FIXED => {}
            other => return Err(ApiError::BadRequest(format!("unknown coupon kind: {other}"))),
        }
        if let (Some(starts), Some(expires)) = (self.starts_at, self.expires_at) {
            if expires <= starts {
                return Err(ApiError::BadRequest("expires_at must be after starts_at".into()));
            }
        }
        Ok(())
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), ApiError> {
    req.check()?;
    let coupon = sqlx::query_as::<_, Coupon>(
        "INSERT INTO coupons (id, code, kind, value, max_discount, min_order_amount,
                              usage_limit, starts_at, expires_at, active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(req.code.trim().to_uppercase())
    .bind(&req.kind)
    .bind(req.value)
    .bind(req.max_discount)
    .bind(req.min_order_amount.unwrap_or(0))
    .bind(req.usage_limit)
    .bind(req.starts_at)
    .bind(req.expires_at)
    .bind(req.active.unwrap_or(true))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CouponRequest>,
) -> Result<Json<Coupon>, ApiError> {
    req.check()?;
    let coupon = sqlx::query_as::<_, Coupon>(
        "UPDATE coupons SET code = $2, kind = $3, value = $4, max_discount = $5,
                min_order_amount = $6, usage_limit = $7, starts_at = $8, expires_at = $9,
                active = $10
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.code.trim().to_uppercase())
    .bind(&req.kind)
    .bind(req.value)
    .bind(req.max_discount)
    .bind(req.min_order_amount.unwrap_or(0))
    .bind(req.usage_limit)
    .bind(req.starts_at)
    .bind(req.expires_at)
    .bind(req.active.unwrap_or(true))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(coupon))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let deleted = sqlx::query("DELETE FROM coupons WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
