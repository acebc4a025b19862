//! Service error type.
//!
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl maps each
//! variant to a status code and a JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::coupon::CouponRejection;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("{0}")]
    CouponRejected(CouponRejection),

    #[error("insufficient stock for {sku}")]
    InsufficientStock { sku: String },

    #[error("email delivery is not configured")]
    EmailNotConfigured,

    #[error("payment provider is not configured")]
    PaymentsNotConfigured,

    #[error("email delivery failed: {0}")]
    Email(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidSignature => StatusCode::FORBIDDEN,
            Self::CouponRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InsufficientStock { .. } => StatusCode::CONFLICT,
            Self::EmailNotConfigured | Self::PaymentsNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Email(_) => StatusCode::BAD_GATEWAY,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let message = match &self {
            Self::Database(sqlx::Error::RowNotFound) => "not found".to_string(),
            Self::Database(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<CouponRejection> for ApiError {
    fn from(r: CouponRejection) -> Self {
        Self::CouponRejected(r)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::BadRequest(e.to_string())
    }
}
