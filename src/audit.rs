//! Audit trail for side-effectful failures (email sends, webhook handling).
//! Writing the row itself never fails the request; a broken audit table is
//! only logged.

use sqlx::PgPool;
use uuid::Uuid;

pub async fn record(db: &PgPool, scope: &str, message: &str, detail: serde_json::Value) {
    let result = sqlx::query(
        "INSERT INTO audit_log (id, scope, message, detail) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::now_v7())
    .bind(scope)
    .bind(message)
    .bind(detail)
    .execute(db)
    .await;
    if let Err(e) = result {
        tracing::error!(error = %e, scope, "failed to write audit row");
    }
}
