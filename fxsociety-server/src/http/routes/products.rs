//! Product catalog endpoints
//!
//! Public catalog reads plus admin management under `/admin`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repos::{DbError, Product, ProductRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ValidJson, ValidPath, ValidQuery};
use crate::http::server::AppState;
use crate::models::pagination::{CATALOG_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use crate::models::{Paginated, Pagination, ProductCreate, ProductFilter, ProductSort, ProductUpdate};

/// Product response
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description_short: String,
    pub description_full: Option<String>,
    pub price_idr: i64,
    pub category: String,
    pub badges: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            description_short: p.description_short,
            description_full: p.description_full,
            price_idr: p.price_idr,
            category: p.category,
            badges: p.badges,
            images: p.images,
            is_active: p.is_active,
            created_at: p.created_at,
        }
    }
}

/// Public catalog query
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Admin listing query
#[derive(Debug, Default, Deserialize)]
pub struct AdminProductQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

const PRODUCT_NOT_FOUND: &str = "Produk tidak ditemukan";

/// GET /api/products
async fn list_products(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<CatalogQuery>,
) -> Result<Json<Paginated<ProductResponse>>, ApiError> {
    let page = Pagination::from_query(query.page, query.page_size, CATALOG_PAGE_SIZE)?;
    let filter = ProductFilter {
        sort: ProductSort::parse(query.sort.as_deref()),
        category: query.category,
        search: query.search,
    };

    let result = ProductRepo::new(&state.pool).list_active(&filter, page).await?;
    Ok(Json(result.map(ProductResponse::from)))
}

/// GET /api/products/{id_or_slug}
async fn get_product(
    State(state): State<Arc<AppState>>,
    ValidPath(id_or_slug): ValidPath<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = ProductRepo::new(&state.pool)
        .get_active(&id_or_slug)
        .await?
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;
    Ok(Json(ProductResponse::from(product)))
}

/// GET /api/products/admin/all
async fn list_all_products(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidQuery(query): ValidQuery<AdminProductQuery>,
) -> Result<Json<Paginated<ProductResponse>>, ApiError> {
    let page = Pagination::from_query(query.page, query.page_size, DEFAULT_PAGE_SIZE)?;
    let result = ProductRepo::new(&state.pool)
        .list_all(query.search.as_deref(), page)
        .await?;
    Ok(Json(result.map(ProductResponse::from)))
}

/// POST /api/products/admin
async fn create_product(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidJson(req): ValidJson<ProductCreate>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = req.validate()?;
    let created = ProductRepo::new(&state.pool)
        .create(&product)
        .await
        .map_err(|e| match e {
            DbError::Conflict { .. } => ApiError::bad_request("Slug sudah digunakan"),
            other => other.into(),
        })?;

    tracing::info!(admin = %admin.username, product_id = created.id, slug = %created.slug, "product created");
    Ok((StatusCode::CREATED, Json(ProductResponse::from(created))))
}

/// PATCH /api/products/admin/{product_id}
async fn update_product(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidPath(product_id): ValidPath<i64>,
    ValidJson(req): ValidJson<ProductUpdate>,
) -> Result<Json<ProductResponse>, ApiError> {
    let changes = req.validate()?;
    let updated = ProductRepo::new(&state.pool)
        .update(product_id, &changes)
        .await
        .map_err(|e| match e {
            DbError::Conflict { .. } => ApiError::bad_request("Slug already in use"),
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    tracing::info!(admin = %admin.username, product_id, "product updated");
    Ok(Json(ProductResponse::from(updated)))
}

/// PATCH /api/products/admin/{product_id}/toggle-active
async fn toggle_product(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ValidPath(product_id): ValidPath<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = ProductRepo::new(&state.pool)
        .toggle_active(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    tracing::info!(admin = %admin.username, product_id, is_active = product.is_active, "product visibility toggled");
    Ok(Json(ProductResponse::from(product)))
}

/// Product routes, nested under `/api/products`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/admin", post(create_product))
        .route("/admin/all", get(list_all_products))
        .route("/admin/{product_id}", patch(update_product))
        .route("/admin/{product_id}/toggle-active", patch(toggle_product))
        .route("/{id_or_slug}", get(get_product))
}
