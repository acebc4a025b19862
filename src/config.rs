//! Environment-driven configuration.

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub store_name: String,
    pub store_url: String,
    pub currency: String,
    pub admin_token: String,
    pub smtp: Option<SmtpConfig>,
    pub digiseller: Option<DigisellerConfig>,
    pub nats_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Clone, Debug)]
pub struct DigisellerConfig {
    pub seller_id: String,
    pub api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let port = match std::env::var("PORT") {
            Ok(v) => v.parse().context("PORT must be a number")?,
            Err(_) => 8083,
        };
        let admin_token = std::env::var("ADMIN_TOKEN").context("ADMIN_TOKEN is required")?;

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: std::env::var("SMTP_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(587),
                username: std::env::var("SMTP_USERNAME").context("SMTP_USERNAME is required when SMTP_HOST is set")?,
                password: std::env::var("SMTP_PASSWORD").context("SMTP_PASSWORD is required when SMTP_HOST is set")?,
                from_address: std::env::var("SMTP_FROM").context("SMTP_FROM is required when SMTP_HOST is set")?,
            }),
            Err(_) => None,
        };

        let digiseller = match std::env::var("DIGISELLER_SELLER_ID") {
            Ok(seller_id) => Some(DigisellerConfig {
                seller_id,
                api_key: std::env::var("DIGISELLER_API_KEY")
                    .context("DIGISELLER_API_KEY is required when DIGISELLER_SELLER_ID is set")?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            port,
            store_name: std::env::var("STORE_NAME").unwrap_or_else(|_| "Takashop".to_string()),
            store_url: std::env::var("STORE_URL").unwrap_or_else(|_| "http://localhost:8083".to_string()),
            currency: std::env::var("STORE_CURRENCY").unwrap_or_else(|_| "BDT".to_string()),
            admin_token,
            smtp,
            digiseller,
            nats_url: std::env::var("NATS_URL").ok(),
        })
    }
}
