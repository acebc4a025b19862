//! Admin catalog CRUD: products, variants, categories, brands.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{Brand, Category, Product, ProductVariant};
use crate::routes::catalog::ProductDetail;
use crate::routes::{ListParams, PaginatedResponse};
use crate::state::AppState;

use super::slugify;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>, ApiError> {
    let (limit, offset, page) = params.window();
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products
         WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(&params.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;
    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR status = $1)")
            .bind(&params.status)
            .fetch_one(&state.db)
            .await?;
    Ok(Json(PaginatedResponse { data: products, total: total.0, page }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetail>, ApiError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;
    let variants = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE product_id = $1 ORDER BY position, price",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ProductDetail { product, variants }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(length(min = 1, max = 300))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    req.validate()?;
    let slug = req.slug.clone().unwrap_or_else(|| slugify(&req.name));
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, sku, name, slug, description, brand_id, category_id,
                               image_url, status, featured)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(req.sku.trim().to_uppercase())
    .bind(&req.name)
    .bind(&slug)
    .bind(&req.description)
    .bind(req.brand_id)
    .bind(req.category_id)
    .bind(&req.image_url)
    .bind(req.status.as_deref().unwrap_or("active"))
    .bind(req.featured.unwrap_or(false))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    req.validate()?;
    let slug = req.slug.clone().unwrap_or_else(|| slugify(&req.name));
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET sku = $2, name = $3, slug = $4, description = $5, brand_id = $6,
                category_id = $7, image_url = $8, status = $9, featured = $10, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.sku.trim().to_uppercase())
    .bind(&req.name)
    .bind(&slug)
    .bind(&req.description)
    .bind(req.brand_id)
    .bind(req.category_id)
    .bind(&req.image_url)
    .bind(req.status.as_deref().unwrap_or("active"))
    .bind(req.featured.unwrap_or(false))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(product))
}

/// Soft delete: archived products drop out of the storefront but keep their
/// order history intact.
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let updated = sqlx::query("UPDATE products SET status = 'archived', updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct VariantRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(range(min = 0))]
    pub price: i64,
    pub compare_at_price: Option<i64>,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub position: Option<i32>,
}

pub async fn create_variant(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<VariantRequest>,
) -> Result<(StatusCode, Json<ProductVariant>), ApiError> {
    req.validate()?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id)
        .fetch_one(&state.db)
        .await?;
    if !exists.0 {
        return Err(ApiError::NotFound);
    }
    let variant = sqlx::query_as::<_, ProductVariant>(
        "INSERT INTO product_variants (id, product_id, name, sku, price, compare_at_price, stock, position)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(product_id)
    .bind(&req.name)
    .bind(req.sku.trim().to_uppercase())
    .bind(req.price)
    .bind(req.compare_at_price)
    .bind(req.stock)
    .bind(req.position.unwrap_or(0))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn update_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VariantRequest>,
) -> Result<Json<ProductVariant>, ApiError> {
    req.validate()?;
    let variant = sqlx::query_as::<_, ProductVariant>(
        "UPDATE product_variants SET name = $2, sku = $3, price = $4, compare_at_price = $5,
                stock = $6, position = $7
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(req.sku.trim().to_uppercase())
    .bind(req.price)
    .bind(req.compare_at_price)
    .bind(req.stock)
    .bind(req.position.unwrap_or(0))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(variant))
}

pub async fn delete_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = sqlx::query("DELETE FROM product_variants WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub position: Option<i32>,
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    req.validate()?;
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, description, parent_id, image_url, position)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.name)
    .bind(slugify(&req.name))
    .bind(&req.description)
    .bind(req.parent_id)
    .bind(&req.image_url)
    .bind(req.position.unwrap_or(0))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    req.validate()?;
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2, slug = $3, description = $4, parent_id = $5,
                image_url = $6, position = $7
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(slugify(&req.name))
    .bind(&req.description)
    .bind(req.parent_id)
    .bind(&req.image_url)
    .bind(req.position.unwrap_or(0))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    let deleted = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct BrandRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub logo_url: Option<String>,
}

pub async fn create_brand(
    State(state): State<AppState>,
    Json(req): Json<BrandRequest>,
) -> Result<(StatusCode, Json<Brand>), ApiError> {
    req.validate()?;
    let brand = sqlx::query_as::<_, Brand>(
        "INSERT INTO brands (id, name, slug, logo_url) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.name)
    .bind(slugify(&req.name))
    .bind(&req.logo_url)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<BrandRequest>,
) -> Result<Json<Brand>, ApiError> {
    req.validate()?;
    let brand = sqlx::query_as::<_, Brand>(
        "UPDATE brands SET name = $2, slug = $3, logo_url = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(slugify(&req.name))
    .bind(&req.logo_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(brand))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("UPDATE products SET brand_id = NULL WHERE brand_id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    let deleted = sqlx::query("DELETE FROM brands WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
