//! CRM repository - dashboard counters, customer summaries, tags and notes
//!
//! Customer summaries are computed in one query with LATERAL joins rather
//! than one lookup per customer.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};

use super::activity::{log_activity, ActivityLog};
use super::{search_term, DbError};
use crate::models::crm::FOLLOW_UP_TAG;
use crate::models::{ActivityKind, CustomerFilter, NoteText, Pagination, TagName};

/// Admin dashboard counters
#[derive(Debug, Clone, FromRow)]
pub struct DashboardStats {
    pub pending_orders: i64,
    pub open_tickets: i64,
    pub new_customers_7d: i64,
    pub follow_up_needed: i64,
}

/// Customer with order totals, latest activity and tags
#[derive(Debug, Clone, FromRow)]
pub struct CustomerSummary {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub whatsapp: Option<String>,
    pub total_orders: i64,
    pub total_spend: i64,
    pub last_activity: DateTime<Utc>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Customer tag record
#[derive(Debug, Clone, FromRow)]
pub struct CustomerTag {
    pub id: i64,
    pub customer_id: i64,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

/// Customer note record
#[derive(Debug, Clone, FromRow)]
pub struct CustomerNote {
    pub id: i64,
    pub customer_id: i64,
    pub note: String,
    pub created_by_admin: String,
    pub created_at: DateTime<Utc>,
}

/// Summary columns over `users u`; callers append WHERE and ORDER BY.
const SUMMARY_SELECT: &str = r#"
    SELECT
        u.id,
        u.email,
        u.full_name,
        latest.whatsapp,
        totals.total_orders,
        totals.total_spend,
        COALESCE(activity.last_at, u.created_at) AS last_activity,
        COALESCE(tagged.tags, ARRAY[]::TEXT[]) AS tags,
        u.created_at
    FROM users u
    LEFT JOIN LATERAL (
        SELECT COUNT(*) AS total_orders, COALESCE(SUM(p.price_idr), 0)::BIGINT AS total_spend
        FROM orders o
        JOIN products p ON p.id = o.product_id
        WHERE o.user_id = u.id
    ) totals ON TRUE
    LEFT JOIN LATERAL (
        SELECT o.whatsapp
        FROM orders o
        WHERE o.user_id = u.id
        ORDER BY o.created_at DESC, o.id DESC
        LIMIT 1
    ) latest ON TRUE
    LEFT JOIN LATERAL (
        SELECT MAX(a.created_at) AS last_at
        FROM activity_logs a
        WHERE a.customer_id = u.id
    ) activity ON TRUE
    LEFT JOIN LATERAL (
        SELECT ARRAY_AGG(t.tag ORDER BY t.created_at, t.id) AS tags
        FROM customer_tags t
        WHERE t.customer_id = u.id
    ) tagged ON TRUE
"#;

fn missing_customer(customer_id: i64) -> impl FnOnce(sqlx::Error) -> DbError {
    move |e| {
        if matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
            DbError::NotFound {
                resource: "customer",
                id: customer_id.to_string(),
            }
        } else {
            DbError::Sqlx(e)
        }
    }
}

/// CRM repository
pub struct CrmRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CrmRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DbError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders,
                (SELECT COUNT(*) FROM tickets WHERE status = 'open') AS open_tickets,
                (SELECT COUNT(*) FROM users
                    WHERE created_at >= NOW() - INTERVAL '7 days') AS new_customers_7d,
                (SELECT COUNT(*) FROM customer_tags WHERE tag = $1) AS follow_up_needed
            "#,
        )
        .bind(FOLLOW_UP_TAG)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Page of customer summaries.
    ///
    /// Search matches email or full name case-insensitively; `tag` keeps only
    /// customers carrying that exact tag.
    pub async fn list_customers(
        &self,
        filter: &CustomerFilter,
        page: Pagination,
    ) -> Result<Vec<CustomerSummary>, DbError> {
        let search = search_term(filter.search.as_deref());
        let tag = filter
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let customers = sqlx::query_as::<_, CustomerSummary>(&format!(
            r#"
            SELECT * FROM ({SUMMARY_SELECT}
                WHERE ($1::TEXT IS NULL OR u.email ILIKE $1 OR u.full_name ILIKE $1)
                  AND ($2::TEXT IS NULL OR EXISTS (
                      SELECT 1 FROM customer_tags ct
                      WHERE ct.customer_id = u.id AND ct.tag = $2
                  ))
            ) summary
            ORDER BY {}
            LIMIT $3 OFFSET $4
            "#,
            filter.sort.order_clause()
        ))
        .bind(search.as_deref())
        .bind(tag)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn customer_summary(&self, id: i64) -> Result<Option<CustomerSummary>, DbError> {
        let summary = sqlx::query_as::<_, CustomerSummary>(&format!(
            "{SUMMARY_SELECT} WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(summary)
    }

    pub async fn tags(&self, customer_id: i64) -> Result<Vec<CustomerTag>, DbError> {
        let tags = sqlx::query_as::<_, CustomerTag>(
            r#"
            SELECT id, customer_id, tag, created_at
            FROM customer_tags
            WHERE customer_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(tags)
    }

    /// Tag a customer. Adding a tag twice returns the existing row and logs
    /// nothing the second time.
    pub async fn add_tag(&self, customer_id: i64, tag: &TagName) -> Result<CustomerTag, DbError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, CustomerTag>(
            r#"
            INSERT INTO customer_tags (customer_id, tag)
            VALUES ($1, $2)
            ON CONFLICT (customer_id, tag) DO NOTHING
            RETURNING id, customer_id, tag, created_at
            "#,
        )
        .bind(customer_id)
        .bind(tag.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(missing_customer(customer_id))?;

        let tag_row = match inserted {
            Some(row) => {
                log_activity(
                    &mut *tx,
                    customer_id,
                    ActivityKind::TagAdded,
                    None,
                    Some(json!({ "tag": row.tag })),
                )
                .await?;
                row
            }
            None => {
                sqlx::query_as::<_, CustomerTag>(
                    r#"
                    SELECT id, customer_id, tag, created_at
                    FROM customer_tags
                    WHERE customer_id = $1 AND tag = $2
                    "#,
                )
                .bind(customer_id)
                .bind(tag.as_str())
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(tag_row)
    }

    /// Remove a tag. Returns whether a tag was actually removed; only then is
    /// `tag_removed` logged.
    pub async fn remove_tag(&self, customer_id: i64, tag: &TagName) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM customer_tags WHERE customer_id = $1 AND tag = $2")
            .bind(customer_id)
            .bind(tag.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if removed {
            log_activity(
                &mut *tx,
                customer_id,
                ActivityKind::TagRemoved,
                None,
                Some(json!({ "tag": tag.as_str() })),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(removed)
    }

    /// Notes on a customer, newest first.
    pub async fn notes(&self, customer_id: i64) -> Result<Vec<CustomerNote>, DbError> {
        let notes = sqlx::query_as::<_, CustomerNote>(
            r#"
            SELECT id, customer_id, note, created_by_admin, created_at
            FROM customer_notes
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn add_note(
        &self,
        customer_id: i64,
        note: &NoteText,
        admin: &str,
    ) -> Result<CustomerNote, DbError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, CustomerNote>(
            r#"
            INSERT INTO customer_notes (customer_id, note, created_by_admin)
            VALUES ($1, $2, $3)
            RETURNING id, customer_id, note, created_by_admin, created_at
            "#,
        )
        .bind(customer_id)
        .bind(note.as_str())
        .bind(admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(missing_customer(customer_id))?;

        log_activity(
            &mut *tx,
            customer_id,
            ActivityKind::NoteAdded,
            Some(&created.id.to_string()),
            Some(json!({ "admin": admin })),
        )
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Activity feed of a customer, newest first.
    pub async fn activity(&self, customer_id: i64) -> Result<Vec<ActivityLog>, DbError> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, customer_id, type, reference_id, metadata_json, created_at
            FROM activity_logs
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
