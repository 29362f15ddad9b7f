#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use beacon_api::auth::jwt::JwtConfig;
use beacon_api::auth::password::hash_password;
use beacon_api::config::{Integrations, ServerConfig, SyncConfig};
use beacon_api::router::build_app_router;
use beacon_api::state::AppState;
use beacon_core::types::DbId;
use beacon_db::models::company::{Company, CreateCompany};
use beacon_db::models::user::{CreateUser, User};
use beacon_db::repositories::{CompanyRepo, RoleRepo, UserRepo};

pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const WEBHOOK_TOKEN: &str = "hook-secret";

/// A `ServerConfig` with no vendor integrations configured, so any endpoint
/// that needs one answers 503.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-of-reasonable-length".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        sync: SyncConfig::default(),
        sendgrid_webhook_token: None,
        integrations: Integrations::default(),
    }
}

/// The production router over `pool` with [`test_config`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

/// Same as [`build_test_app`] with the webhook token set to [`WEBHOOK_TOKEN`].
pub fn build_test_app_with_webhook_token(pool: PgPool) -> Router {
    let mut config = test_config();
    config.sendgrid_webhook_token = Some(WEBHOOK_TOKEN.to_string());
    build_app_router(AppState::new(pool, config))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router should respond")
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, json_request("GET", uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, json_request("GET", uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("POST", uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("POST", uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("PUT", uri, Some(token), Some(body))).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("PATCH", uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, json_request("DELETE", uri, Some(token), None)).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active user with [`TEST_PASSWORD`].
pub async fn create_test_user(
    pool: &PgPool,
    username: &str,
    role: &str,
    company_id: Option<DbId>,
) -> User {
    let role = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("role should be seeded");
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role.id,
            company_id,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn create_test_company(
    pool: &PgPool,
    name: &str,
    account_rep_id: Option<DbId>,
) -> Company {
    CompanyRepo::create(
        pool,
        &CreateCompany {
            name: name.to_string(),
            website: None,
            account_rep_id,
            email_category: Some(name.to_lowercase().replace(' ', "-")),
        },
    )
    .await
    .expect("company creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login_user(pool: &PgPool, username: &str) -> String {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        serde_json::json!({ "username": username, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("login should return an access token")
        .to_string()
}
