//! Admin CRUD for static pages, homepage sections, email templates and
//! payment methods, plus the audit-log listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{EmailTemplate, HomepageSection, Page, PaymentMethod};
use crate::routes::{ListParams, PaginatedResponse};
use crate::state::AppState;

use super::slugify;

// =============================================================================
// Pages
// =============================================================================

pub async fn list_pages(State(state): State<AppState>) -> Result<Json<Vec<Page>>, ApiError> {
    let pages = sqlx::query_as::<_, Page>("SELECT * FROM pages ORDER BY slug")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(pages))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PageRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub slug: Option<String>,
    pub body: String,
    pub published: Option<bool>,
}

pub async fn create_page(
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    req.validate()?;
    let slug = req.slug.clone().unwrap_or_else(|| slugify(&req.title));
    let page = sqlx::query_as::<_, Page>(
        "INSERT INTO pages (id, slug, title, body, published)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&slug)
    .bind(&req.title)
    .bind(&req.body)
    .bind(req.published.unwrap_or(true))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PageRequest>,
) -> Result<Json<Page>, ApiError> {
    req.validate()?;
    let slug = req.slug.clone().unwrap_or_else(|| slugify(&req.title));
    let page = sqlx::query_as::<_, Page>(
        "UPDATE pages SET slug = $2, title = $3, body = $4, published = $5, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&slug)
    .bind(&req.title)
    .bind(&req.body)
    .bind(req.published.unwrap_or(true))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(page))
}

pub async fn delete_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let deleted = sqlx::query("DELETE FROM pages WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Homepage sections
// =============================================================================

pub async fn list_sections(
    State(state): State<AppState>,
) -> Result<Json<Vec<HomepageSection>>, ApiError> {
    let sections =
        sqlx::query_as::<_, HomepageSection>("SELECT * FROM homepage_sections ORDER BY position")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(sections))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SectionRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub kind: String,
    pub payload: Option<serde_json::Value>,
    pub position: Option<i32>,
    pub visible: Option<bool>,
}

pub async fn create_section(
    State(state): State<AppState>,
    Json(req): Json<SectionRequest>,
) -> Result<(StatusCode, Json<HomepageSection>), ApiError> {
    req.validate()?;
    let section = sqlx::query_as::<_, HomepageSection>(
        "INSERT INTO homepage_sections (id, title, kind, payload, position, visible)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.title)
    .bind(&req.kind)
    .bind(req.payload.clone().unwrap_or_else(|| serde_json::json!({})))
    .bind(req.position.unwrap_or(0))
    .bind(req.visible.unwrap_or(true))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(section)))
}

pub async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SectionRequest>,
) -> Result<Json<HomepageSection>, ApiError> {
    req.validate()?;
    let section = sqlx::query_as::<_, HomepageSection>(
        "UPDATE homepage_sections SET title = $2, kind = $3, payload = $4, position = $5,
                visible = $6
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.kind)
    .bind(req.payload.clone().unwrap_or_else(|| serde_json::json!({})))
    .bind(req.position.unwrap_or(0))
    .bind(req.visible.unwrap_or(true))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(section))
}

pub async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted =
        sqlx::query("DELETE FROM homepage_sections WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Email templates
// =============================================================================

pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmailTemplate>>, ApiError> {
    let templates = sqlx::query_as::<_, EmailTemplate>("SELECT * FROM email_templates ORDER BY key")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(templates))
}

#[derive(Debug, Deserialize, Validate)]
pub struct TemplateRequest {
    #[validate(length(min = 1, max = 100))]
    pub key: String,
    #[validate(length(min = 1, max = 500))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<TemplateRequest>,
) -> Result<(StatusCode, Json<EmailTemplate>), ApiError> {
    req.validate()?;
    let template = sqlx::query_as::<_, EmailTemplate>(
        "INSERT INTO email_templates (id, key, subject, body)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.key)
    .bind(&req.subject)
    .bind(&req.body)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<EmailTemplate>, ApiError> {
    req.validate()?;
    let template = sqlx::query_as::<_, EmailTemplate>(
        "UPDATE email_templates SET key = $2, subject = $3, body = $4, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.key)
    .bind(&req.subject)
    .bind(&req.body)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted =
        sqlx::query("DELETE FROM email_templates WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Payment methods
// =============================================================================

pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    let methods =
        sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods ORDER BY position, name")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(methods))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentMethodRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub instructions: Option<String>,
    pub icon_url: Option<String>,
    pub enabled: Option<bool>,
    pub position: Option<i32>,
}

pub async fn create_payment_method(
    State(state): State<AppState>,
    Json(req): Json<PaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethod>), ApiError> {
    req.validate()?;
    let method = sqlx::query_as::<_, PaymentMethod>(
        "INSERT INTO payment_methods (id, name, code, instructions, icon_url, enabled, position)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.name)
    .bind(&req.code)
    .bind(&req.instructions)
    .bind(&req.icon_url)
    .bind(req.enabled.unwrap_or(true))
    .bind(req.position.unwrap_or(0))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn update_payment_method(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentMethodRequest>,
) -> Result<Json<PaymentMethod>, ApiError> {
    req.validate()?;
    let method = sqlx::query_as::<_, PaymentMethod>(
        "UPDATE payment_methods SET name = $2, code = $3, instructions = $4, icon_url = $5,
                enabled = $6, position = $7
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.code)
    .bind(&req.instructions)
    .bind(&req.icon_url)
    .bind(req.enabled.unwrap_or(true))
    .bind(req.position.unwrap_or(0))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(method))
}

pub async fn delete_payment_method(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted =
        sqlx::query("DELETE FROM payment_methods WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Audit log
// =============================================================================

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AuditRow {
    pub id: Uuid,
    pub scope: String,
    pub message: String,
    pub detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

pub async fn list_audit_log(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<AuditRow>>, ApiError> {
    let (limit, offset, page) = params.window();
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT * FROM audit_log ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_log").fetch_one(&state.db).await?;
    Ok(Json(PaginatedResponse { data: rows, total: total.0, page }))
}
