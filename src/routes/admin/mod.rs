//! Admin CRUD panels, guarded by the `x-admin-token` header.

pub mod content;
pub mod coupons;
pub mod import_export;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route("/products/import", post(import_export::import_products))
        .route("/products/export", get(import_export::export_products))
        .route("/products/:id", get(products::get).put(products::update).delete(products::delete))
        .route("/products/:id/variants", post(products::create_variant))
        .route("/variants/:id", put(products::update_variant).delete(products::delete_variant))
        .route("/categories", post(products::create_category))
        .route("/categories/:id", put(products::update_category).delete(products::delete_category))
        .route("/brands", post(products::create_brand))
        .route("/brands/:id", put(products::update_brand).delete(products::delete_brand))
        .route("/orders", get(orders::list))
        .route("/orders/:id", get(orders::get))
        .route("/orders/:id/status", put(orders::update_status))
        .route("/orders/:id/delivery", put(orders::attach_delivery))
        .route("/coupons", get(coupons::list).post(coupons::create))
        .route("/coupons/:id", put(coupons::update).delete(coupons::delete))
        .route("/reviews", get(reviews::list))
        .route("/reviews/:id/approve", put(reviews::approve))
        .route("/reviews/:id", axum::routing::delete(reviews::delete))
        .route("/pages", get(content::list_pages).post(content::create_page))
        .route("/pages/:id", put(content::update_page).delete(content::delete_page))
        .route("/sections", get(content::list_sections).post(content::create_section))
        .route("/sections/:id", put(content::update_section).delete(content::delete_section))
        .route("/email-templates", get(content::list_templates).post(content::create_template))
        .route("/email-templates/:id", put(content::update_template).delete(content::delete_template))
        .route("/payment-methods", get(content::list_payment_methods).post(content::create_payment_method))
        .route("/payment-methods/:id", put(content::update_payment_method).delete(content::delete_payment_method))
        .route("/audit-log", get(content::list_audit_log))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request.headers().get("x-admin-token").and_then(|v| v.to_str().ok());
    if token != Some(state.config.admin_token.as_str()) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Lowercase, spaces to dashes, everything non-alphanumeric dropped.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_flattens_names() {
        assert_eq!(slugify("Steam Wallet  Card"), "steam-wallet--card");
        assert_eq!(slugify(" Gift Card (25) "), "gift-card-25");
    }
}
