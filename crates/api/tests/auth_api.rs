//! HTTP-level tests for login, refresh, logout, `/me` and account lockout.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    body_json, create_test_company, create_test_user, get, get_auth, login_user, post_json,
    post_json_auth, TEST_PASSWORD,
};
use sqlx::PgPool;
use tower::ServiceExt;

fn credentials(username: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "username": username, "password": password })
}

// ---------------------------------------------------------------------------
// Test: login returns tokens, user info and the session cookie
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_success(pool: PgPool) {
    let user = create_test_user(&pool, "ada", "admin", None).await;
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/auth/login", credentials("ada", TEST_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("beacon_session="));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "admin");
    assert!(json["user"].get("password_hash").is_none());
}

// ---------------------------------------------------------------------------
// Test: wrong password and unknown user are both 401
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn bad_credentials_are_unauthorized(pool: PgPool) {
    create_test_user(&pool, "bob", "account_rep", None).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        credentials("bob", "not-the-password"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/login",
        credentials("ghost", TEST_PASSWORD),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: five failures lock the account, even for the right password
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_failures_lock_account(pool: PgPool) {
    create_test_user(&pool, "carol", "client", None).await;

    for _ in 0..5 {
        let response = post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/auth/login",
            credentials("carol", "wrong-password-guess"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/login",
        credentials("carol", TEST_PASSWORD),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: an admin password reset lifts the lockout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn password_reset_unlocks_account(pool: PgPool) {
    create_test_user(&pool, "admin", "admin", None).await;
    let locked = create_test_user(&pool, "erin", "client", None).await;
    let admin_token = login_user(&pool, "admin").await;

    for _ in 0..5 {
        post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/auth/login",
            credentials("erin", "not-the-password"),
        )
        .await;
    }

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}/reset-password", locked.id),
        serde_json::json!({ "new_password": "a-brand-new-passphrase" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/login",
        credentials("erin", "a-brand-new-passphrase"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: refresh rotates the token and the old one stops working
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_token(pool: PgPool) {
    create_test_user(&pool, "dora", "admin", None).await;
    let login = body_json(
        post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/auth/login",
            credentials("dora", TEST_PASSWORD),
        )
        .await,
    )
    .await;
    let original = login["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": original });
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), original);

    let reused = post_json(common::build_test_app(pool), "/api/v1/auth/refresh", body).await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: /me includes the client's company
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn me_includes_client_company(pool: PgPool) {
    let company = create_test_company(&pool, "Harbor Dental", None).await;
    create_test_user(&pool, "erin", "client", Some(company.id)).await;
    let token = login_user(&pool, "erin").await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["username"], "erin");
    assert_eq!(json["data"]["user"]["role"], "client");
    assert_eq!(json["data"]["company"]["id"], company.id);
}

// ---------------------------------------------------------------------------
// Test: the session cookie authenticates like a bearer token
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn session_cookie_authenticates(pool: PgPool) {
    create_test_user(&pool, "finn", "account_rep", None).await;
    let token = login_user(&pool, "finn").await;

    let request = Request::builder()
        .uri("/api/v1/me")
        .header("cookie", format!("theme=dark; beacon_session={token}"))
        .body(Body::empty())
        .unwrap();
    let response = common::build_test_app(pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: missing or garbage credentials are 401
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_authentication(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(common::build_test_app(pool), "/api/v1/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: logout revokes refresh tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    create_test_user(&pool, "gus", "admin", None).await;
    let login = body_json(
        post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/auth/login",
            credentials("gus", TEST_PASSWORD),
        )
        .await,
    )
    .await;
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/logout",
        serde_json::json!({}),
        access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
