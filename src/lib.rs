//! Takashop - self-hosted digital-goods storefront service.
//!
//! A single axum service backed by Postgres:
//! - product catalog with variants, categories, brands
//! - session carts, coupon discounts, checkout
//! - order management with delivery-info handoff for digital goods
//! - admin CRUD panels and WooCommerce-compatible CSV import/export
//! - Digiseller payment URLs and status webhook
//! - transactional email over SMTP with DB-stored templates

pub mod audit;
pub mod config;
pub mod coupon;
pub mod csv;
pub mod email;
pub mod error;
pub mod events;
pub mod models;
pub mod payments;
pub mod routes;
pub mod state;
