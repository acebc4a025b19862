//! HTTP surface. Public storefront endpoints live under `/api/v1`, admin
//! panels under `/api/v1/admin` behind the shared token header.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod digiseller;
pub mod notify;
pub mod orders;
pub mod pages;
pub mod reviews;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/products", get(catalog::list_products))
        .route("/products/:slug", get(catalog::get_product))
        .route("/products/:slug/reviews", get(reviews::list_for_product).post(reviews::submit))
        .route("/categories", get(catalog::list_categories))
        .route("/brands", get(catalog::list_brands))
        .route("/pages/:slug", get(pages::get_page))
        .route("/home/sections", get(pages::homepage_sections))
        .route("/payment-methods", get(pages::list_payment_methods))
        .route("/cart/:session", get(cart::get_cart).post(cart::add_item).delete(cart::clear))
        .route("/cart/:session/items/:id", put(cart::update_item).delete(cart::remove_item))
        .route("/coupons/validate", post(coupons::validate))
        .route("/checkout", post(checkout::checkout))
        .route("/orders/:number", get(orders::get_order))
        .route("/notify/order-confirmation", post(notify::order_confirmation))
        .route("/notify/delivery", post(notify::delivery))
        .route("/notify/payment-status", post(notify::payment_status))
        .route("/notify/refund", post(notify::refund))
        .route("/notify/cancellation", post(notify::cancellation))
        .route("/payments/digiseller/url", post(digiseller::payment_url))
        .route("/payments/digiseller/webhook", post(digiseller::webhook))
        .nest("/admin", admin::router(state.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "takashop" }))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<uuid::Uuid>,
    pub brand: Option<uuid::Uuid>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ListParams {
    /// (limit, offset, page); page starts at 1, per_page is capped at 100.
    pub fn window(&self) -> (i64, i64, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).min(100);
        let offset = i64::from(page - 1).saturating_mul(i64::from(per_page));
        (i64::from(per_page), offset, page)
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

#[cfg(test)]
mod tests {
    use super::ListParams;

    fn params(page: Option<u32>, per_page: Option<u32>) -> ListParams {
        ListParams {
            page,
            per_page,
            category: None,
            brand: None,
            featured: None,
            search: None,
            status: None,
        }
    }

    #[test]
    fn window_defaults_and_caps() {
        assert_eq!(params(None, None).window(), (20, 0, 1));
        assert_eq!(params(Some(3), Some(500)).window(), (100, 200, 3));
        assert_eq!(params(Some(0), Some(10)).window(), (10, 0, 1));
    }

    #[test]
    fn window_survives_huge_page_numbers() {
        let (limit, offset, page) = params(Some(u32::MAX), Some(100)).window();
        assert_eq!(limit, 100);
        assert_eq!(page, u32::MAX);
        assert_eq!(offset, i64::from(u32::MAX - 1) * 100);
    }
}
