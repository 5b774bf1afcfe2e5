//! Order endpoints
//!
//! Guests place and track orders; customers list their own; admins list all
//! and move orders through their statuses.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::require_user;
use crate::db::repos::{DbError, Order, OrderRepo, OrderWithProduct, ProductRepo, PublicOrderStatus};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, CurrentUser, ValidJson, ValidPath, ValidQuery};
use crate::http::server::AppState;
use crate::models::order::status_filter;
use crate::models::pagination::DEFAULT_PAGE_SIZE;
use crate::models::{Listing, OrderCreate, OrderStatus, Pagination, StatusUpdate, ValidationError};

/// Order response
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub order_code: String,
    pub product_id: i64,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            order_code: o.order_code,
            product_id: o.product_id,
            name: o.name,
            email: o.email,
            whatsapp: o.whatsapp,
            notes: o.notes,
            status: o.status,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

/// Order with product details for list views
#[derive(Debug, Serialize)]
pub struct OrderWithProductResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub product_title: String,
    pub product_price: i64,
    pub product_category: String,
    pub product_slug: String,
    pub product_image: Option<String>,
}

impl From<OrderWithProduct> for OrderWithProductResponse {
    fn from(o: OrderWithProduct) -> Self {
        Self {
            order: OrderResponse::from(o.order),
            product_title: o.product_title,
            product_price: o.product_price,
            product_category: o.product_category,
            product_slug: o.product_slug,
            product_image: o.product_image,
        }
    }
}

/// Public tracking response; no contact details
#[derive(Debug, Serialize)]
pub struct OrderStatusPublicResponse {
    pub order_code: String,
    pub status: String,
    pub product_title: String,
    pub product_price: i64,
    pub product_category: String,
    pub created_at: DateTime<Utc>,
}

impl From<PublicOrderStatus> for OrderStatusPublicResponse {
    fn from(o: PublicOrderStatus) -> Self {
        Self {
            order_code: o.order_code,
            status: o.status,
            product_title: o.product_title,
            product_price: o.product_price,
            product_category: o.product_category,
            created_at: o.created_at,
        }
    }
}

/// Admin listing query
#[derive(Debug, Default, Deserialize)]
pub struct AdminOrderQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// POST /api/orders
async fn create_order(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<OrderCreate>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = req.validate()?;

    let product = ProductRepo::new(&state.pool)
        .find_active_by_id(order.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Produk tidak ditemukan"))?;

    let created = OrderRepo::new(&state.pool)
        .create(&order, &product)
        .await
        .map_err(|e| match e {
            DbError::Conflict { .. } => ApiError::internal("could not allocate a unique order code"),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(created))))
}

/// GET /api/orders/me
async fn my_orders(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Listing<OrderWithProductResponse>>, ApiError> {
    let user = require_user(&state, &current).await?;
    let orders = OrderRepo::new(&state.pool).list_for_user(user.id).await?;
    Ok(Json(Listing::complete(orders).map(OrderWithProductResponse::from)))
}

/// GET /api/orders/{order_code}
async fn track_order(
    State(state): State<Arc<AppState>>,
    ValidPath(order_code): ValidPath<String>,
) -> Result<Json<OrderStatusPublicResponse>, ApiError> {
    let status = OrderRepo::new(&state.pool)
        .find_public(&order_code)
        .await?
        .ok_or_else(|| ApiError::not_found("Pesanan tidak ditemukan"))?;
    Ok(Json(OrderStatusPublicResponse::from(status)))
}

/// GET /api/orders/admin/all
async fn list_all_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidQuery(query): ValidQuery<AdminOrderQuery>,
) -> Result<Json<Listing<OrderWithProductResponse>>, ApiError> {
    let page = Pagination::from_query(query.page, query.page_size, DEFAULT_PAGE_SIZE)?;
    let status = status_filter::<OrderStatus>(query.status.as_deref())?;

    let result = OrderRepo::new(&state.pool).list_all(status, page).await?;
    Ok(Json(result.map(OrderWithProductResponse::from)))
}

/// PATCH /api/orders/admin/{order_id}/status
async fn update_order_status(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidPath(order_id): ValidPath<i64>,
    ValidJson(req): ValidJson<StatusUpdate>,
) -> Result<Json<OrderResponse>, ApiError> {
    let status: OrderStatus = req.status.parse().map_err(|_: ValidationError| {
        ApiError::bad_request(format!(
            "Status tidak valid. Gunakan: {}",
            OrderStatus::ALL.join(", ")
        ))
    })?;

    let order = OrderRepo::new(&state.pool)
        .update_status(order_id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Order tidak ditemukan"))?;

    tracing::debug!(admin = %admin.username, order_id, "order status changed by admin");
    Ok(Json(OrderResponse::from(order)))
}

/// Order routes, nested under `/api/orders`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_order))
        .route("/me", get(my_orders))
        .route("/admin/all", get(list_all_orders))
        .route("/admin/{order_id}/status", patch(update_order_status))
        .route("/{order_code}", get(track_order))
}
