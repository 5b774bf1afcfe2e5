//! Support ticket repository

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};

use super::activity::log_activity;
use super::DbError;
use crate::models::{ActivityKind, Listing, NewTicket, Pagination, TicketStatus};

/// Ticket record from database
#[derive(Debug, Clone, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket repository
pub struct TicketRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TicketRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a ticket for a customer and log `ticket_created`.
    pub async fn create(&self, user_id: i64, ticket: &NewTicket) -> Result<Ticket, DbError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (user_id, title, message)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, message, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&ticket.title)
        .bind(&ticket.message)
        .fetch_one(&mut *tx)
        .await?;

        log_activity(
            &mut *tx,
            user_id,
            ActivityKind::TicketCreated,
            Some(&created.id.to_string()),
            Some(json!({ "title": created.title })),
        )
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// A customer's tickets, most recently updated first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        page: Pagination,
    ) -> Result<Listing<Ticket>, DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let items = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, user_id, title, message, status, created_at, updated_at
            FROM tickets
            WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Listing { items, total })
    }

    /// Admin listing, most recently updated first, optionally filtered by status.
    pub async fn list_all(
        &self,
        status: Option<TicketStatus>,
        page: Pagination,
    ) -> Result<Listing<Ticket>, DbError> {
        let status = status.map(TicketStatus::as_str);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        let items = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, user_id, title, message, status, created_at, updated_at
            FROM tickets
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY updated_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Listing { items, total })
    }

    /// Every ticket of a customer, newest first (CRM view).
    pub async fn list_for_customer(&self, customer_id: i64) -> Result<Vec<Ticket>, DbError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, user_id, title, message, status, created_at, updated_at
            FROM tickets
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(tickets)
    }

    /// Move a ticket to a new status and log `ticket_updated`.
    ///
    /// Returns `None` when the ticket does not exist.
    pub async fn update_status(
        &self,
        id: i64,
        status: TicketStatus,
    ) -> Result<Option<Ticket>, DbError> {
        let mut tx = self.pool.begin().await?;

        let old: Option<String> =
            sqlx::query_scalar("SELECT status FROM tickets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(old_status) = old else {
            return Ok(None);
        };

        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, message, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        log_activity(
            &mut *tx,
            ticket.user_id,
            ActivityKind::TicketUpdated,
            Some(&ticket.id.to_string()),
            Some(json!({ "old_status": old_status, "new_status": status.as_str() })),
        )
        .await?;

        tx.commit().await?;
        Ok(Some(ticket))
    }
}
