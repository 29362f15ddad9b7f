//! Support tickets end to end: filing, triage, comments and the
//! notifications they raise.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_company, create_test_user, delete_auth, get_auth, login_user,
    patch_json_auth, post_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

struct Fixture {
    ticket_id: i64,
    rep_token: String,
    client_token: String,
}

/// A company with a rep and a client, and one ticket filed by the client.
async fn filed_ticket(pool: &PgPool) -> Fixture {
    let rep = create_test_user(pool, "rep", "account_rep", None).await;
    let company = create_test_company(pool, "Acme", Some(rep.id)).await;
    create_test_user(pool, "client", "client", Some(company.id)).await;
    let rep_token = login_user(pool, "rep").await;
    let client_token = login_user(pool, "client").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/tickets",
        json!({ "subject": "Report looks empty", "body": "No GA numbers since Monday" }),
        &client_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["company_id"], company.id);
    assert_eq!(json["data"]["status"], "open");
    assert_eq!(json["data"]["priority"], "normal");

    Fixture {
        ticket_id: json["data"]["id"].as_i64().unwrap(),
        rep_token,
        client_token,
    }
}

async fn unread_count(pool: &PgPool, token: &str) -> i64 {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/unread-count",
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["count"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Test: filing a ticket notifies the company's rep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn new_ticket_notifies_rep(pool: PgPool) {
    let fx = filed_ticket(&pool).await;
    assert_eq!(unread_count(&pool, &fx.rep_token).await, 1);
    assert_eq!(unread_count(&pool, &fx.client_token).await, 0);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications",
        &fx.rep_token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["kind"], "ticket_created");
    assert_eq!(json["data"][0]["link"], format!("/tickets/{}", fx.ticket_id));

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/unread-count",
        &fx.rep_token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["by_kind"]["ticket_created"], 1);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications?kind=ticket_comment",
        &fx.rep_token,
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/read-all",
        json!({}),
        &fx.rep_token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["marked_read"], 1);
    assert_eq!(unread_count(&pool, &fx.rep_token).await, 0);

    let notification_id = json["data"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/notifications/{notification_id}");
    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &fx.rep_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete_auth(common::build_test_app(pool), &uri, &fx.client_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: triage follows the ticket lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn triage_follows_lifecycle(pool: PgPool) {
    let fx = filed_ticket(&pool).await;
    let uri = format!("/api/v1/rep/tickets/{}", fx.ticket_id);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "status": "in_progress", "priority": "high" }),
        &fx.rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "in_progress");
    assert_eq!(json["data"]["priority"], "high");
    assert_eq!(unread_count(&pool, &fx.client_token).await, 1);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "status": "closed" }),
        &fx.rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "status": "open" }),
        &fx.rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(
        common::build_test_app(pool),
        &uri,
        json!({ "status": "pending" }),
        &fx.rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: clients cannot triage, and only assign staff
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn triage_requires_staff(pool: PgPool) {
    let fx = filed_ticket(&pool).await;
    let uri = format!("/api/v1/rep/tickets/{}", fx.ticket_id);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "status": "closed" }),
        &fx.client_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let client_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE username = 'client'")
        .fetch_one(&pool)
        .await
        .unwrap();
    let response = patch_json_auth(
        common::build_test_app(pool),
        &uri,
        json!({ "assigned_to": client_id }),
        &fx.rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: tickets are invisible outside their company
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn other_company_cannot_read_ticket(pool: PgPool) {
    let fx = filed_ticket(&pool).await;
    let other = create_test_company(&pool, "Other", None).await;
    create_test_user(&pool, "outsider", "client", Some(other.id)).await;
    let outsider = login_user(&pool, "outsider").await;

    let uri = format!("/api/v1/tickets/{}", fx.ticket_id);
    let response = get_auth(common::build_test_app(pool.clone()), &uri, &outsider).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/tickets", &outsider).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/tickets", &fx.client_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: comments notify the other side of the conversation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn comments_notify_counterpart(pool: PgPool) {
    let fx = filed_ticket(&pool).await;
    let uri = format!("/api/v1/tickets/{}/comments", fx.ticket_id);

    // Rep already has the creation notice.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "body": "Any update?" }),
        &fx.client_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(unread_count(&pool, &fx.rep_token).await, 2);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "body": "Reconnecting the property now" }),
        &fx.rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(unread_count(&pool, &fx.client_token).await, 1);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "body": "   " }),
        &fx.rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let detail = format!("/api/v1/tickets/{}", fx.ticket_id);
    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, &detail, &fx.client_token).await).await;
    let comments = json["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["body"], "Any update?");
}

// ---------------------------------------------------------------------------
// Test: staff must name the company
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn staff_ticket_requires_company(pool: PgPool) {
    create_test_user(&pool, "admin", "admin", None).await;
    let token = login_user(&pool, "admin").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/tickets",
        json!({ "subject": "Check", "body": "Body" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
