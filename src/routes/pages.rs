//! Static pages, homepage sections and the public payment-method list.

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::models::{HomepageSection, Page, PaymentMethod};
use crate::state::AppState;

pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Page>, ApiError> {
    sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = $1 AND published")
        .bind(&slug)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn homepage_sections(
    State(state): State<AppState>,
) -> Result<Json<Vec<HomepageSection>>, ApiError> {
    let sections = sqlx::query_as::<_, HomepageSection>(
        "SELECT * FROM homepage_sections WHERE visible ORDER BY position",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(sections))
}

pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    let methods = sqlx::query_as::<_, PaymentMethod>(
        "SELECT * FROM payment_methods WHERE enabled ORDER BY position, name",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(methods))
}
