//! Public catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{Brand, Category, Product, ProductVariant};
use crate::routes::{ListParams, PaginatedResponse};
use crate::state::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>, ApiError> {
    let (limit, offset, page) = params.window();
    let search = params.search.as_deref().filter(|s| !s.trim().is_empty());

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products
         WHERE status = 'active'
           AND ($1::uuid IS NULL OR category_id = $1)
           AND ($2::uuid IS NULL OR brand_id = $2)
           AND ($3::boolean IS NULL OR featured = $3)
           AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%' OR sku ILIKE '%' || $4 || '%')
         ORDER BY created_at DESC LIMIT $5 OFFSET $6",
    )
    .bind(params.category)
    .bind(params.brand)
    .bind(params.featured)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products
         WHERE status = 'active'
           AND ($1::uuid IS NULL OR category_id = $1)
           AND ($2::uuid IS NULL OR brand_id = $2)
           AND ($3::boolean IS NULL OR featured = $3)
           AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%' OR sku ILIKE '%' || $4 || '%')",
    )
    .bind(params.category)
    .bind(params.brand)
    .bind(params.featured)
    .bind(search)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(PaginatedResponse { data: products, total: total.0, page }))
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE slug = $1 AND status = 'active'",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    let variants = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE product_id = $1 ORDER BY position, price",
    )
    .bind(product.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ProductDetail { product, variants }))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY position, name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(categories))
}

pub async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>, ApiError> {
    let brands = sqlx::query_as::<_, Brand>("SELECT * FROM brands ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(brands))
}
