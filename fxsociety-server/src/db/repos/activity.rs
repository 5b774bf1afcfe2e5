//! Customer activity log
//!
//! Entries are written on the executor of the mutation they describe, so a
//! rolled-back order or tag change leaves no trace in the log.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgExecutor};

use super::DbError;
use crate::models::ActivityKind;

/// Activity log record
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub customer_id: i64,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub reference_id: Option<String>,
    pub metadata_json: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Append an activity entry for a customer.
pub async fn log_activity<'e, E>(
    executor: E,
    customer_id: i64,
    kind: ActivityKind,
    reference_id: Option<&str>,
    metadata: Option<Value>,
) -> Result<(), DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO activity_logs (customer_id, type, reference_id, metadata_json)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(customer_id)
    .bind(kind.as_str())
    .bind(reference_id)
    .bind(metadata)
    .execute(executor)
    .await?;

    tracing::debug!(customer_id, kind = %kind, "activity logged");
    Ok(())
}
