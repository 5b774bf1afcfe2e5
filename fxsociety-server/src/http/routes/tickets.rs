//! Support ticket endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::require_user;
use crate::db::repos::{Ticket, TicketRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, CurrentUser, ValidJson, ValidPath, ValidQuery};
use crate::http::server::AppState;
use crate::models::order::status_filter;
use crate::models::pagination::DEFAULT_PAGE_SIZE;
use crate::models::{Listing, Pagination, PaginationParams, StatusUpdate, TicketCreate, TicketStatus};

/// Ticket response
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            title: t.title,
            message: t.message,
            status: t.status,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Admin listing query
#[derive(Debug, Default, Deserialize)]
pub struct AdminTicketQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/tickets
async fn my_tickets(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Listing<TicketResponse>>, ApiError> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    let user = require_user(&state, &current).await?;

    let result = TicketRepo::new(&state.pool).list_for_user(user.id, page).await?;
    Ok(Json(result.map(TicketResponse::from)))
}

/// POST /api/tickets
async fn create_ticket(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidJson(req): ValidJson<TicketCreate>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket = req.validate()?;
    let user = require_user(&state, &current).await?;

    let created = TicketRepo::new(&state.pool).create(user.id, &ticket).await?;
    tracing::info!(user_id = user.id, ticket_id = created.id, "ticket opened");
    Ok((StatusCode::CREATED, Json(TicketResponse::from(created))))
}

/// GET /api/tickets/admin/all
async fn list_all_tickets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidQuery(query): ValidQuery<AdminTicketQuery>,
) -> Result<Json<Listing<TicketResponse>>, ApiError> {
    let page = Pagination::from_query(query.page, query.page_size, DEFAULT_PAGE_SIZE)?;
    let status = status_filter::<TicketStatus>(query.status.as_deref())?;

    let result = TicketRepo::new(&state.pool).list_all(status, page).await?;
    Ok(Json(result.map(TicketResponse::from)))
}

/// PATCH /api/tickets/admin/{ticket_id}/status
async fn update_ticket_status(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidPath(ticket_id): ValidPath<i64>,
    ValidJson(req): ValidJson<StatusUpdate>,
) -> Result<Json<TicketResponse>, ApiError> {
    let status: TicketStatus = req.status.parse()?;

    let ticket = TicketRepo::new(&state.pool)
        .update_status(ticket_id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

    tracing::info!(admin = %admin.username, ticket_id, status = %status, "ticket status updated");
    Ok(Json(TicketResponse::from(ticket)))
}

/// Ticket routes, nested under `/api/tickets`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(my_tickets).post(create_ticket))
        .route("/admin/all", get(list_all_tickets))
        .route("/admin/{ticket_id}/status", patch(update_ticket_status))
}
