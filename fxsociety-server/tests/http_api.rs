//! Router-level tests that never reach the database.
//!
//! The pool is lazy and points at an unreachable address, so every request
//! here must be answered by routing, extractors, auth guards, validation or
//! the rate limiter.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use fxsociety_server::auth::Role;
use fxsociety_server::db::create_lazy_pool;
use fxsociety_server::{build_router, AppConfig, AppState};

fn test_state() -> Arc<AppState> {
    let config = AppConfig::from_lookup(|key| match key {
        "ENVIRONMENT" => Some("development".to_string()),
        "SECRET_KEY" => Some("router-test-secret".to_string()),
        "ADMIN_USERNAME" => Some("dev_admin".to_string()),
        "ADMIN_PASSWORD" => Some("dev_password_123".to_string()),
        "DATABASE_URL" => Some("postgres://fxsociety@127.0.0.1:1/unreachable".to_string()),
        _ => None,
    })
    .expect("test config");
    let pool = create_lazy_pool(&config.database_url).expect("lazy pool");
    Arc::new(AppState::new(pool, config))
}

fn app_from(state: Arc<AppState>, peer: [u8; 4]) -> Router {
    build_router(state).layer(MockConnectInfo(SocketAddr::from((peer, 40000))))
}

fn app() -> (Router, Arc<AppState>) {
    let state = test_state();
    (app_from(state.clone(), [10, 0, 0, 1]), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn admin_login_form() -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=dev_admin&password=dev_password_123"))
        .unwrap()
}

// === Health ===

#[tokio::test]
async fn root_and_health_respond() {
    let (app, _) = app();

    let (status, _, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "message": "fxsociety API is running" }));

    let (status, _, body) = send(&app, get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

// === Auth guards ===

#[tokio::test]
async fn protected_routes_require_token() {
    let (app, _) = app();

    for uri in [
        "/api/auth/me",
        "/api/orders/me",
        "/api/tickets",
        "/api/orders/admin/all",
        "/api/products/admin/all",
        "/api/tickets/admin/all",
        "/api/admin/stats",
        "/api/admin/customers",
        "/api/admin/customers/1/activity",
    ] {
        let (status, headers, body) = send(&app, get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer", "{uri}");
        assert_eq!(body["detail"], "Could not validate credentials", "{uri}");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (app, _) = app();
    let (status, _, _) = send(&app, get("/api/admin/stats", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_token_cannot_reach_admin_routes() {
    let (app, state) = app();
    let token = state.tokens.issue("budi@example.com", Role::User).unwrap();

    let (status, _, _) = send(&app, get("/api/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, get("/api/orders/admin/all", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_token_cannot_reach_customer_routes() {
    let (app, state) = app();
    let token = state.tokens.issue("dev_admin", Role::Admin).unwrap();

    let (status, _, _) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, get("/api/tickets", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_role_for_another_username_is_rejected() {
    let (app, state) = app();
    let token = state.tokens.issue("someone_else", Role::Admin).unwrap();

    let (status, _, _) = send(&app, get("/api/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// === Login ===

#[tokio::test]
async fn admin_login_accepts_form_and_json() {
    let (app, state) = app();

    let (status, _, body) = send(&app, admin_login_form()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let claims = state.tokens.verify(body["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.sub, "dev_admin");

    let request = json_request(
        Method::POST,
        "/api/auth/login",
        None,
        json!({ "username": "dev_admin", "password": "dev_password_123" }),
    );
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn login_is_rate_limited_per_client() {
    let state = test_state();
    let first = app_from(state.clone(), [10, 0, 0, 1]);
    let second = app_from(state.clone(), [10, 0, 0, 2]);

    for _ in 0..5 {
        let (status, _, _) = send(&first, admin_login_form()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = send(&first, admin_login_form()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(headers.contains_key(header::RETRY_AFTER));
    assert_eq!(body["detail"], "Too many login attempts. Please try again later.");

    let (status, _, _) = send(&second, admin_login_form()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_login_bodies_count_against_the_limit() {
    let (app, _) = app();

    for _ in 0..5 {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _, _) = send(&app, admin_login_form()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

// === Validation happens before the database ===

#[tokio::test]
async fn register_rejects_bad_email() {
    let (app, _) = app();
    let request = json_request(
        Method::POST,
        "/api/auth/register",
        None,
        json!({ "email": "not-an-email", "password": "secret" }),
    );
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn order_rejects_bad_whatsapp() {
    let (app, _) = app();
    let request = json_request(
        Method::POST,
        "/api/orders",
        None,
        json!({
            "product_id": 1,
            "name": "Budi",
            "email": "budi@example.com",
            "whatsapp": "12345"
        }),
    );
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Format nomor WhatsApp tidak valid"));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn catalog_rejects_out_of_range_paging() {
    let (app, _) = app();

    let (status, _, _) = send(&app, get("/api/products?page=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, get("/api/products?page_size=101", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, get("/api/products?page=abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_order_status_update_validates_status() {
    let (app, state) = app();
    let token = state.tokens.issue("dev_admin", Role::Admin).unwrap();

    let request = json_request(
        Method::PATCH,
        "/api/orders/admin/1/status",
        Some(&token),
        json!({ "status": "shipped" }),
    );
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "Status tidak valid. Gunakan: pending, confirmed, completed, cancelled"
    );
}

#[tokio::test]
async fn admin_order_filter_rejects_unknown_status() {
    let (app, state) = app();
    let token = state.tokens.issue("dev_admin", Role::Admin).unwrap();

    let (status, _, _) = send(&app, get("/api/orders/admin/all?status=shipped", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_path_id_is_400() {
    let (app, state) = app();
    let token = state.tokens.issue("dev_admin", Role::Admin).unwrap();

    let (status, _, body) = send(&app, get("/api/admin/customers/abc", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn empty_tag_is_rejected() {
    let (app, state) = app();
    let token = state.tokens.issue("dev_admin", Role::Admin).unwrap();

    let request = json_request(
        Method::POST,
        "/api/admin/customers/1/tags",
        Some(&token),
        json!({ "tag": "   " }),
    );
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_tag_in_delete_path_is_rejected() {
    let (app, state) = app();
    let token = state.tokens.issue("dev_admin", Role::Admin).unwrap();

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/admin/customers/1/tags/%20%20")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
