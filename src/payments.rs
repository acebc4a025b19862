//! Digiseller payment integration.
//!
//! The provider never documented which exact digest its callbacks carry, so
//! verification tries each signature format observed in the wild and accepts
//! the first match.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::DigisellerConfig;
use crate::models::Order;

type HmacSha256 = Hmac<Sha256>;

const PAY_ENDPOINT: &str = "https://oplata.info/asp2/pay_wm.asp";

/// Build the hosted payment URL for an order. The signature covers the
/// seller id, invoice and amount, keyed with the API key.
pub fn payment_url(config: &DigisellerConfig, order: &Order) -> String {
    let sign = sign_hmac(
        &config.api_key,
        &format!("{}:{}:{}", config.seller_id, order.order_number, order.total),
    );
    format!(
        "{PAY_ENDPOINT}?id_d={}&invoice={}&amount={}&curr={}&sign={}",
        config.seller_id, order.order_number, order.total, order.currency, sign
    )
}

/// Verify a webhook signature against the candidate formats.
pub fn verify_signature(
    config: &DigisellerConfig,
    invoice_id: &str,
    amount: i64,
    provided: &str,
) -> bool {
    let provided = provided.trim().to_ascii_lowercase();
    if provided.is_empty() {
        return false;
    }
    candidates(config, invoice_id, amount).iter().any(|c| *c == provided)
}

fn candidates(config: &DigisellerConfig, invoice_id: &str, amount: i64) -> Vec<String> {
    vec![
        sign_hmac(&config.api_key, &format!("{invoice_id}:{amount}")),
        sign_sha256(&format!("{invoice_id}:{amount}:{}", config.api_key)),
        sign_sha256(&format!("{}:{invoice_id}:{amount}:{}", config.seller_id, config.api_key)),
    ]
}

fn sign_hmac(key: &str, message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn sign_sha256(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DigisellerConfig {
        DigisellerConfig { seller_id: "98765".into(), api_key: "sekret".into() }
    }

    #[test]
    fn accepts_each_candidate_format() {
        let cfg = config();
        for candidate in candidates(&cfg, "ORD-00000042", 500) {
            assert!(verify_signature(&cfg, "ORD-00000042", 500, &candidate));
        }
    }

    #[test]
    fn accepts_uppercase_hex() {
        let cfg = config();
        let sign = sign_sha256(&format!("ORD-1:120:{}", cfg.api_key)).to_ascii_uppercase();
        assert!(verify_signature(&cfg, "ORD-1", 120, &sign));
    }

    #[test]
    fn rejects_wrong_amount_and_empty_signature() {
        let cfg = config();
        let sign = sign_sha256(&format!("ORD-1:120:{}", cfg.api_key));
        assert!(!verify_signature(&cfg, "ORD-1", 121, &sign));
        assert!(!verify_signature(&cfg, "ORD-1", 120, ""));
    }

    #[test]
    fn payment_url_carries_invoice_and_signature() {
        use chrono::Utc;
        use uuid::Uuid;
        let order = Order {
            id: Uuid::new_v4(),
            order_number: "ORD-00000007".into(),
            customer_email: "x@example.com".into(),
            customer_name: None,
            session_id: None,
            status: "pending".into(),
            payment_status: "pending".into(),
            payment_method: Some("digiseller".into()),
            subtotal: 500,
            discount: 0,
            total: 500,
            currency: "BDT".into(),
            coupon_code: None,
            digiseller_invoice_id: None,
            delivery_info: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let url = payment_url(&config(), &order);
        assert!(url.starts_with(PAY_ENDPOINT));
        assert!(url.contains("invoice=ORD-00000007"));
        assert!(url.contains("amount=500"));
        assert!(url.contains("sign="));
    }
}
