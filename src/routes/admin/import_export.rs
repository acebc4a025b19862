//! WooCommerce CSV import/export endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::csv::{self, ImportedRow, RowKind};
use crate::error::ApiError;
use crate::models::{Product, ProductVariant};
use crate::state::AppState;

use super::slugify;

#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Import a WooCommerce product CSV posted as the raw request body.
/// Rows upsert by SKU; a row that fails to apply is counted and skipped.
pub async fn import_products(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportSummary>, ApiError> {
    let report = csv::parse_products(&body);
    let mut summary = ImportSummary { imported: 0, skipped: report.skipped };

    for row in &report.rows {
        match apply_row(&state.db, row).await {
            Ok(()) => summary.imported += 1,
            Err(e) => {
                tracing::warn!(sku = %row.sku, error = %e, "import row skipped");
                summary.skipped += 1;
            }
        }
    }
    Ok(Json(summary))
}

async fn apply_row(db: &sqlx::PgPool, row: &ImportedRow) -> Result<(), ApiError> {
    match row.kind {
        RowKind::Simple => {
            // Our own exports carry the product SKU in the parent column so a
            // round trip lands on the same product row.
            let product_sku = row.parent_sku.as_deref().unwrap_or(&row.sku);
            let product_id = upsert_product(db, product_sku, row).await?;
            upsert_variant(db, product_id, &row.sku, "Standard", row).await?;
        }
        RowKind::Variable => {
            upsert_product(db, &row.sku, row).await?;
        }
        RowKind::Variation => {
            let parent_sku = row
                .parent_sku
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("variation row without parent".into()))?;
            let parent: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE sku = $1")
                .bind(parent_sku.to_uppercase())
                .fetch_optional(db)
                .await?;
            let (product_id,) = parent
                .ok_or_else(|| ApiError::BadRequest(format!("unknown parent sku: {parent_sku}")))?;
            upsert_variant(db, product_id, &row.sku, &row.name, row).await?;
        }
    }
    Ok(())
}

async fn upsert_product(db: &sqlx::PgPool, sku: &str, row: &ImportedRow) -> Result<Uuid, ApiError> {
    let category_id = match &row.category {
        Some(name) => Some(find_or_create_category(db, name).await?),
        None => None,
    };
    let status = if row.published { "active" } else { "draft" };
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO products (id, sku, name, slug, description, category_id, image_url, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (sku) DO UPDATE SET
             name = EXCLUDED.name,
             description = COALESCE(EXCLUDED.description, products.description),
             category_id = COALESCE(EXCLUDED.category_id, products.category_id),
             image_url = COALESCE(EXCLUDED.image_url, products.image_url),
             status = EXCLUDED.status,
             updated_at = NOW()
         RETURNING id",
    )
    .bind(Uuid::now_v7())
    .bind(sku.to_uppercase())
    .bind(&row.name)
    .bind(slugify(&row.name))
    .bind(&row.description)
    .bind(category_id)
    .bind(&row.image_url)
    .bind(status)
    .fetch_one(db)
    .await?;
    Ok(id)
}

async fn upsert_variant(
    db: &sqlx::PgPool,
    product_id: Uuid,
    sku: &str,
    name: &str,
    row: &ImportedRow,
) -> Result<(), ApiError> {
    // A sale price becomes the live price; the regular price shows as the
    // compare-at strikethrough.
    let (price, compare_at) = match row.sale_price {
        Some(sale) => (sale, Some(row.price)),
        None => (row.price, None),
    };
    sqlx::query(
        "INSERT INTO product_variants (id, product_id, name, sku, price, compare_at_price, stock)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (sku) DO UPDATE SET
             product_id = EXCLUDED.product_id,
             name = EXCLUDED.name,
             price = EXCLUDED.price,
             compare_at_price = EXCLUDED.compare_at_price,
             stock = EXCLUDED.stock",
    )
    .bind(Uuid::now_v7())
    .bind(product_id)
    .bind(name)
    .bind(sku.to_uppercase())
    .bind(price)
    .bind(compare_at)
    .bind(row.stock)
    .execute(db)
    .await?;
    Ok(())
}

async fn find_or_create_category(db: &sqlx::PgPool, name: &str) -> Result<Uuid, ApiError> {
    let slug = slugify(name);
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(db)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3)
         ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(&slug)
    .fetch_one(db)
    .await?;
    Ok(id)
}

pub async fn export_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE status <> 'archived' ORDER BY created_at",
    )
    .fetch_all(&state.db)
    .await?;
    let variants = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants ORDER BY product_id, position, price",
    )
    .fetch_all(&state.db)
    .await?;

    let rows: Vec<(Product, Vec<ProductVariant>)> = products
        .into_iter()
        .map(|p| {
            let own: Vec<ProductVariant> =
                variants.iter().filter(|v| v.product_id == p.id).cloned().collect();
            (p, own)
        })
        .collect();

    let body = csv::export_products(&rows);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"products.csv\""),
        ],
        body,
    ))
}
