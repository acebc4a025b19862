//! Transactional email over SMTP.
//!
//! Templates live in the `email_templates` table as plain text with
//! `{{placeholder}}` slots; rendering is string interpolation, and unknown
//! placeholders are left intact rather than failing the send.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{Config, SmtpConfig};
use crate::error::ApiError;
use crate::models::Order;

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();
        Ok(Self { transport, from_address: config.from_address.clone() })
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError> {
        let message = Message::builder()
            .from(self.from_address.parse().map_err(|_| ApiError::Email("invalid from address".into()))?)
            .to(to.parse().map_err(|_| ApiError::Email(format!("invalid recipient: {to}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| ApiError::Email(e.to_string()))?;
        self.transport.send(message).await.map_err(|e| ApiError::Email(e.to_string()))?;
        Ok(())
    }
}

/// Replace `{{key}}` slots. Unknown slots are left as-is.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// The placeholder set every order-scoped template can use.
pub fn order_vars(order: &Order, config: &Config) -> Vec<(&'static str, String)> {
    vec![
        ("order_number", order.order_number.clone()),
        ("customer_name", order.customer_name.clone().unwrap_or_else(|| "customer".to_string())),
        ("customer_email", order.customer_email.clone()),
        ("subtotal", order.subtotal.to_string()),
        ("discount", order.discount.to_string()),
        ("total", order.total.to_string()),
        ("currency", order.currency.clone()),
        ("status", order.status.clone()),
        ("payment_status", order.payment_status.clone()),
        ("delivery_info", order.delivery_info.clone().unwrap_or_default()),
        ("store_name", config.store_name.clone()),
        ("store_url", config.store_url.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_known_slots() {
        let out = render(
            "Order {{order_number}} for {{total}} {{currency}}",
            &[("order_number", "ORD-1".into()), ("total", "120".into()), ("currency", "BDT".into())],
        );
        assert_eq!(out, "Order ORD-1 for 120 BDT");
    }

    #[test]
    fn render_leaves_unknown_slots_intact() {
        let out = render("Hello {{name}}, code: {{mystery}}", &[("name", "Rina".into())]);
        assert_eq!(out, "Hello Rina, code: {{mystery}}");
    }

    #[test]
    fn render_replaces_repeated_slots() {
        let out = render("{{x}} and {{x}}", &[("x", "1".into())]);
        assert_eq!(out, "1 and 1");
    }
}
