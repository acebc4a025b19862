//! Review moderation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Review;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewFilter {
    pub approved: Option<bool>,
    pub product_id: Option<Uuid>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ReviewFilter>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews
         WHERE ($1::boolean IS NULL OR approved = $1)
           AND ($2::uuid IS NULL OR product_id = $2)
         ORDER BY created_at DESC",
    )
    .bind(filter.approved)
    .bind(filter.product_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(reviews))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError> {
    let review =
        sqlx::query_as::<_, Review>("UPDATE reviews SET approved = TRUE WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(ApiError::NotFound)?;
    Ok(Json(review))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
