//! Product reviews: public listing of approved reviews and submissions,
//! which start unapproved until a moderator signs off.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::Review;
use crate::state::AppState;

pub async fn list_for_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT r.* FROM reviews r
         JOIN products p ON p.id = r.product_id
         WHERE p.slug = $1 AND r.approved
         ORDER BY r.created_at DESC",
    )
    .bind(&slug)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(reviews))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1, max = 100))]
    pub author_name: String,
    #[validate(email)]
    pub author_email: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 4000))]
    pub body: String,
}

pub async fn submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    req.validate()?;
    let product_id: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE slug = $1 AND status = 'active'")
            .bind(&slug)
            .fetch_optional(&state.db)
            .await?;
    let (product_id,) = product_id.ok_or(ApiError::NotFound)?;

    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (id, product_id, author_name, author_email, rating, body, approved)
         VALUES ($1, $2, $3, $4, $5, $6, FALSE) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(product_id)
    .bind(&req.author_name)
    .bind(&req.author_email)
    .bind(req.rating)
    .bind(&req.body)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: i32) -> SubmitReviewRequest {
        SubmitReviewRequest {
            author_name: "Rina".into(),
            author_email: "rina@example.com".into(),
            rating,
            body: "Arrived instantly.".into(),
        }
    }

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert!(request(0).validate().is_err());
        assert!(request(6).validate().is_err());
        for rating in 1..=5 {
            assert!(request(rating).validate().is_ok());
        }
    }

    #[test]
    fn author_email_must_be_valid() {
        let mut req = request(4);
        req.author_email = "not-an-email".into();
        assert!(req.validate().is_err());
    }
}
