//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::email::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub mailer: Option<Mailer>,
    pub nats: Option<async_nats::Client>,
}
