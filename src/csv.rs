//! WooCommerce-compatible product CSV import/export.
//!
//! The tokenizer is hand-rolled: double-quoted fields, `""` escapes, CRLF
//! and LF line endings. Import maps rows onto products and variants keyed by
//! SKU; a malformed row is counted and skipped, never aborting the file.

use crate::models::{Product, ProductVariant};

/// Column order for both import and export.
pub const HEADER: &[&str] = &[
    "Type",
    "SKU",
    "Parent",
    "Name",
    "Published",
    "Description",
    "Regular price",
    "Sale price",
    "Categories",
    "Images",
    "Stock",
];

// =============================================================================
// Tokenizer
// =============================================================================

/// Split CSV text into rows of fields. Blank lines are dropped.
pub fn parse(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => {
                row.push(std::mem::take(&mut field));
            }
            '\r' => {
                // Consumed as part of CRLF; a bare CR is treated the same.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, &mut row);
            }
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, &mut row);
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, &mut row);
    }
    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>) {
    let finished = std::mem::take(row);
    if finished.len() == 1 && finished[0].is_empty() {
        return;
    }
    rows.push(finished);
}

/// Quote a field for output when it contains a delimiter, quote, or newline.
pub fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// =============================================================================
// Import
// =============================================================================

/// A product row parsed from a WooCommerce export.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRow {
    pub kind: RowKind,
    pub sku: String,
    /// SKU of the parent product, set on variation rows.
    pub parent_sku: Option<String>,
    pub name: String,
    pub published: bool,
    pub description: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub stock: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Simple,
    Variable,
    Variation,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub rows: Vec<ImportedRow>,
    pub skipped: usize,
}

/// Parse a WooCommerce product CSV. Header names are matched
/// case-insensitively so exports from different WooCommerce versions load.
pub fn parse_products(input: &str) -> ImportReport {
    let mut report = ImportReport::default();
    let rows = parse(input);
    let Some((header, body)) = rows.split_first() else {
        return report;
    };

    let col = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let kind_col = col("Type");
    let sku_col = col("SKU");
    let parent_col = col("Parent");
    let name_col = col("Name");
    let published_col = col("Published");
    let description_col = col("Description");
    let price_col = col("Regular price");
    let sale_col = col("Sale price");
    let category_col = col("Categories");
    let images_col = col("Images");
    let stock_col = col("Stock");

    let get = |row: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i)).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    for row in body {
        let kind = match get(row, kind_col).to_ascii_lowercase().as_str() {
            "" | "simple" => RowKind::Simple,
            "variable" => RowKind::Variable,
            "variation" => RowKind::Variation,
            _ => {
                report.skipped += 1;
                continue;
            }
        };
        let sku = get(row, sku_col);
        let name = get(row, name_col);
        if sku.is_empty() || name.is_empty() {
            report.skipped += 1;
            continue;
        }
        let price = match parse_price(&get(row, price_col)) {
            Some(p) => p,
            // Variable parents carry no price of their own.
            None if kind == RowKind::Variable => 0,
            None => {
                report.skipped += 1;
                continue;
            }
        };
        let parent_sku = Some(get(row, parent_col)).filter(|s| !s.is_empty());
        if kind == RowKind::Variation && parent_sku.is_none() {
            report.skipped += 1;
            continue;
        }

        report.rows.push(ImportedRow {
            kind,
            sku,
            parent_sku,
            name,
            published: !matches!(get(row, published_col).as_str(), "0" | "-1"),
            description: Some(get(row, description_col)).filter(|s| !s.is_empty()),
            price,
            sale_price: parse_price(&get(row, sale_col)),
            category: Some(get(row, category_col)).filter(|s| !s.is_empty()),
            // WooCommerce joins multiple image URLs with ", "; keep the first.
            image_url: get(row, images_col).split(',').next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            stock: get(row, stock_col).parse().unwrap_or(0),
        });
    }
    report
}

/// Prices arrive as decimal strings; the store keeps whole units.
fn parse_price(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.round() as i64)
}

// =============================================================================
// Export
// =============================================================================

/// Render products and their variants as a WooCommerce CSV. A product with a
/// single variant exports as `simple`; otherwise a `variable` parent row is
/// followed by one `variation` row per variant. Simple rows carry the product
/// SKU in the `Parent` column so a reimport lands on the same product instead
/// of forking one keyed by the variant SKU.
pub fn export_products(products: &[(Product, Vec<ProductVariant>)]) -> String {
    let mut out = String::new();
    out.push_str(&HEADER.join(","));
    out.push('\n');

    for (product, variants) in products {
        let published = if product.status == "active" { "1" } else { "0" };
        match variants.as_slice() {
            [only] => {
                write_row(&mut out, &[
                    "simple",
                    &only.sku,
                    &product.sku,
                    &product.name,
                    published,
                    product.description.as_deref().unwrap_or(""),
                    &only.price.to_string(),
                    &only.compare_at_price.map(|p| p.to_string()).unwrap_or_default(),
                    "",
                    product.image_url.as_deref().unwrap_or(""),
                    &only.stock.to_string(),
                ]);
            }
            _ => {
                write_row(&mut out, &[
                    "variable",
                    &product.sku,
                    "",
                    &product.name,
                    published,
                    product.description.as_deref().unwrap_or(""),
                    "",
                    "",
                    "",
                    product.image_url.as_deref().unwrap_or(""),
                    "",
                ]);
                for variant in variants {
                    write_row(&mut out, &[
                        "variation",
                        &variant.sku,
                        &product.sku,
                        &format!("{} - {}", product.name, variant.name),
                        published,
                        "",
                        &variant.price.to_string(),
                        &variant.compare_at_price.map(|p| p.to_string()).unwrap_or_default(),
                        "",
                        "",
                        &variant.stock.to_string(),
                    ]);
                }
            }
        }
    }
    out
}

fn write_row(out: &mut String, fields: &[&str]) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&escape(field));
        first = false;
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_handles_quotes_and_crlf() {
        let rows = parse("a,\"b,c\",\"say \"\"hi\"\"\"\r\nd,e,f\n");
        assert_eq!(rows, vec![
            vec!["a".to_string(), "b,c".to_string(), "say \"hi\"".to_string()],
            vec!["d".to_string(), "e".to_string(), "f".to_string()],
        ]);
    }

    #[test]
    fn tokenizer_keeps_newlines_inside_quotes() {
        let rows = parse("sku,\"line one\nline two\"\n");
        assert_eq!(rows, vec![vec!["sku".to_string(), "line one\nline two".to_string()]]);
    }

    #[test]
    fn tokenizer_handles_missing_trailing_newline() {
        let rows = parse("a,b");
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn import_maps_simple_rows() {
        let csv = "Type,SKU,Parent,Name,Published,Description,Regular price,Sale price,Categories,Images,Stock\n\
                   simple,GC-10,,Gift Card 10,1,\"Ten unit card\",250.00,,Gift Cards,https://cdn/img.png,14\n";
        let report = parse_products(csv);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.kind, RowKind::Simple);
        assert_eq!(row.sku, "GC-10");
        assert_eq!(row.price, 250);
        assert_eq!(row.stock, 14);
        assert_eq!(row.category.as_deref(), Some("Gift Cards"));
    }

    #[test]
    fn import_skips_malformed_rows_without_aborting() {
        let csv = "Type,SKU,Parent,Name,Published,Description,Regular price,Sale price,Categories,Images,Stock\n\
                   simple,,,No Sku,1,,100,,,,1\n\
                   simple,OK-1,,Fine,1,,100,,,,1\n\
                   simple,BAD-1,,Bad Price,1,,not-a-price,,,,1\n";
        let report = parse_products(csv);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].sku, "OK-1");
    }

    #[test]
    fn variation_rows_need_a_parent() {
        let csv = "Type,SKU,Parent,Name,Published,Description,Regular price,Sale price,Categories,Images,Stock\n\
                   variable,GC,,Gift Card,1,,,,,,\n\
                   variation,GC-25,GC,Gift Card 25,1,,25,,,,5\n\
                   variation,GC-50,,Gift Card 50,1,,50,,,,5\n";
        let report = parse_products(csv);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].parent_sku.as_deref(), Some("GC"));
    }

    #[test]
    fn export_quotes_fields_and_splits_variants() {
        use chrono::Utc;
        use uuid::Uuid;
        let product = Product {
            id: Uuid::new_v4(),
            sku: "GC".into(),
            name: "Gift, Card".into(),
            slug: "gift-card".into(),
            description: None,
            brand_id: None,
            category_id: None,
            image_url: None,
            status: "active".into(),
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let product_id = product.id;
        let variant = |sku: &str, price: i64| ProductVariant {
            id: Uuid::new_v4(),
            product_id,
            name: format!("{price} units"),
            sku: sku.into(),
            price,
            compare_at_price: None,
            stock: 3,
            position: 0,
        };
        let out = export_products(&[(product, vec![variant("GC-25", 25), variant("GC-50", 50)])]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("variable,GC,,\"Gift, Card\",1"));
        assert!(lines[2].starts_with("variation,GC-25,GC,"));
        assert!(lines[3].starts_with("variation,GC-50,GC,"));
    }

    #[test]
    fn single_variant_export_reimports_onto_the_same_product() {
        use chrono::Utc;
        use uuid::Uuid;
        let product = Product {
            id: Uuid::new_v4(),
            sku: "GC".into(),
            name: "Gift Card".into(),
            slug: "gift-card".into(),
            description: None,
            brand_id: None,
            category_id: None,
            image_url: None,
            status: "active".into(),
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let variant = ProductVariant {
            id: Uuid::new_v4(),
            product_id: product.id,
            name: "25 units".into(),
            sku: "GC-25".into(),
            price: 25,
            compare_at_price: None,
            stock: 3,
            position: 0,
        };
        let out = export_products(&[(product, vec![variant])]);
        let report = parse_products(&out);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.kind, RowKind::Simple);
        // The variant keeps its own SKU; the parent column pins the product.
        assert_eq!(row.sku, "GC-25");
        assert_eq!(row.parent_sku.as_deref(), Some("GC"));
    }
}
