//! Admin CRM endpoints - dashboard, customers, tags, notes, activity
//!
//! Every route requires an admin token.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::orders::OrderWithProductResponse;
use super::tickets::TicketResponse;
use crate::db::repos::{
    ActivityLog, CrmRepo, CustomerNote, CustomerSummary, CustomerTag, DashboardStats, DbError,
    OrderRepo, TicketRepo,
};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ValidJson, ValidPath, ValidQuery};
use crate::http::server::AppState;
use crate::models::pagination::DEFAULT_PAGE_SIZE;
use crate::models::{CustomerFilter, CustomerSort, NoteCreate, NoteText, Pagination, TagCreate, TagName};

const CUSTOMER_NOT_FOUND: &str = "Customer not found";

#[derive(Debug, Serialize)]
pub struct DashboardStatsResponse {
    pub pending_orders: i64,
    pub open_tickets: i64,
    pub new_customers_7d: i64,
    pub follow_up_needed: i64,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(s: DashboardStats) -> Self {
        Self {
            pending_orders: s.pending_orders,
            open_tickets: s.open_tickets,
            new_customers_7d: s.new_customers_7d,
            follow_up_needed: s.follow_up_needed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerSummaryResponse {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub whatsapp: Option<String>,
    pub total_orders: i64,
    pub total_spend: i64,
    pub last_activity: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl From<CustomerSummary> for CustomerSummaryResponse {
    fn from(c: CustomerSummary) -> Self {
        Self {
            id: c.id,
            email: c.email,
            full_name: c.full_name,
            whatsapp: c.whatsapp,
            total_orders: c.total_orders,
            total_spend: c.total_spend,
            last_activity: c.last_activity,
            tags: c.tags,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerTagResponse {
    pub id: i64,
    pub customer_id: i64,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerTag> for CustomerTagResponse {
    fn from(t: CustomerTag) -> Self {
        Self {
            id: t.id,
            customer_id: t.customer_id,
            tag: t.tag,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerNoteResponse {
    pub id: i64,
    pub customer_id: i64,
    pub note: String,
    pub created_by_admin: String,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerNote> for CustomerNoteResponse {
    fn from(n: CustomerNote) -> Self {
        Self {
            id: n.id,
            customer_id: n.customer_id,
            note: n.note,
            created_by_admin: n.created_by_admin,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityLogResponse {
    pub id: i64,
    pub customer_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub reference_id: Option<String>,
    pub metadata_json: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLog> for ActivityLogResponse {
    fn from(a: ActivityLog) -> Self {
        Self {
            id: a.id,
            customer_id: a.customer_id,
            kind: a.kind,
            reference_id: a.reference_id,
            metadata_json: a.metadata_json,
            created_at: a.created_at,
        }
    }
}

/// Customer list query
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

fn customer_not_found(e: DbError) -> ApiError {
    match e {
        DbError::NotFound { .. } => ApiError::not_found(CUSTOMER_NOT_FOUND),
        other => other.into(),
    }
}

/// GET /api/admin/stats
async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<DashboardStatsResponse>, ApiError> {
    let stats = CrmRepo::new(&state.pool).stats().await?;
    Ok(Json(stats.into()))
}

/// GET /api/admin/customers
async fn list_customers(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidQuery(query): ValidQuery<CustomerQuery>,
) -> Result<Json<Vec<CustomerSummaryResponse>>, ApiError> {
    let page = Pagination::from_query(query.page, query.page_size, DEFAULT_PAGE_SIZE)?;
    let filter = CustomerFilter {
        sort: CustomerSort::parse(query.sort.as_deref()),
        search: query.search,
        tag: query.tag,
    };

    let customers = CrmRepo::new(&state.pool).list_customers(&filter, page).await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/customers/{customer_id}
async fn get_customer(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
) -> Result<Json<CustomerSummaryResponse>, ApiError> {
    let summary = CrmRepo::new(&state.pool)
        .customer_summary(customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found(CUSTOMER_NOT_FOUND))?;
    Ok(Json(summary.into()))
}

/// GET /api/admin/customers/{customer_id}/orders
async fn customer_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
) -> Result<Json<Vec<OrderWithProductResponse>>, ApiError> {
    let orders = OrderRepo::new(&state.pool).list_for_user(customer_id).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/customers/{customer_id}/tickets
async fn customer_tickets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let tickets = TicketRepo::new(&state.pool).list_for_customer(customer_id).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/customers/{customer_id}/tags
async fn list_tags(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
) -> Result<Json<Vec<CustomerTagResponse>>, ApiError> {
    let tags = CrmRepo::new(&state.pool).tags(customer_id).await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/customers/{customer_id}/tags
async fn add_tag(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
    ValidJson(req): ValidJson<TagCreate>,
) -> Result<Json<CustomerTagResponse>, ApiError> {
    let tag = TagName::new(&req.tag)?;
    let created = CrmRepo::new(&state.pool)
        .add_tag(customer_id, &tag)
        .await
        .map_err(customer_not_found)?;

    tracing::info!(admin = %admin.username, customer_id, tag = %created.tag, "customer tagged");
    Ok(Json(created.into()))
}

/// DELETE /api/admin/customers/{customer_id}/tags/{tag_name}
async fn remove_tag(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidPath((customer_id, tag_name)): ValidPath<(i64, String)>,
) -> Result<Json<Value>, ApiError> {
    let tag = TagName::new(&tag_name)?;
    let removed = CrmRepo::new(&state.pool)
        .remove_tag(customer_id, &tag)
        .await?;

    tracing::info!(admin = %admin.username, customer_id, tag = %tag.as_str(), removed, "customer tag removed");
    Ok(Json(json!({ "status": "ok" })))
}

/// GET /api/admin/customers/{customer_id}/notes
async fn list_notes(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
) -> Result<Json<Vec<CustomerNoteResponse>>, ApiError> {
    let notes = CrmRepo::new(&state.pool).notes(customer_id).await?;
    Ok(Json(notes.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/customers/{customer_id}/notes
async fn add_note(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
    ValidJson(req): ValidJson<NoteCreate>,
) -> Result<Json<CustomerNoteResponse>, ApiError> {
    let note = NoteText::new(&req.note)?;
    let created = CrmRepo::new(&state.pool)
        .add_note(customer_id, &note, &admin.username)
        .await
        .map_err(customer_not_found)?;
    Ok(Json(created.into()))
}

/// GET /api/admin/customers/{customer_id}/activity
async fn activity(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidPath(customer_id): ValidPath<i64>,
) -> Result<Json<Vec<ActivityLogResponse>>, ApiError> {
    let entries = CrmRepo::new(&state.pool).activity(customer_id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// CRM routes, nested under `/api/admin`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(stats))
        .route("/customers", get(list_customers))
        .route("/customers/{customer_id}", get(get_customer))
        .route("/customers/{customer_id}/orders", get(customer_orders))
        .route("/customers/{customer_id}/tickets", get(customer_tickets))
        .route("/customers/{customer_id}/tags", get(list_tags).post(add_tag))
        .route("/customers/{customer_id}/tags/{tag_name}", delete(remove_tag))
        .route("/customers/{customer_id}/notes", get(list_notes).post(add_note))
        .route("/customers/{customer_id}/activity", get(activity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_kind_serializes_as_type() {
        let entry = ActivityLogResponse {
            id: 1,
            customer_id: 2,
            kind: "tag_added".into(),
            reference_id: None,
            metadata_json: Some(json!({ "tag": "VIP" })),
            created_at: Utc::now(),
        };
        let body = serde_json::to_value(entry).unwrap();
        assert_eq!(body["type"], "tag_added");
        assert_eq!(body["metadata_json"]["tag"], "VIP");
    }
}
