//! SendGrid event webhook: reconciliation into `email_recipients`.

mod common;

use axum::http::StatusCode;
use beacon_db::models::email_campaign::{EmailCampaign, UpsertEmailCampaign};
use beacon_db::repositories::{EmailCampaignRepo, EmailRecipientRepo};
use common::{body_json, post_json};
use sqlx::PgPool;

async fn seed_campaign(pool: &PgPool) -> EmailCampaign {
    EmailCampaignRepo::upsert_by_external_id(
        pool,
        &UpsertEmailCampaign {
            external_id: "ss-100".into(),
            name: "Spring Newsletter".into(),
            status: Some("triggered".into()),
            category: Some("acme".into()),
            send_at: None,
            vendor_updated_at: None,
        },
    )
    .await
    .expect("campaign upsert should succeed")
}

fn event(kind: &str, email: Option<&str>, message_id: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "event": kind,
        "email": email,
        "timestamp": 1_714_000_000,
        "sg_message_id": message_id,
        "singlesend_id": "ss-100",
    })
}

// ---------------------------------------------------------------------------
// Test: events without email or message id are skipped and not stored
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn events_without_identity_are_skipped(pool: PgPool) {
    let campaign = seed_campaign(&pool).await;

    let body = serde_json::json!([event("open", None, None)]);
    let response =
        post_json(common::build_test_app(pool.clone()), "/api/v1/webhooks/sendgrid", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["received"], 1);
    assert_eq!(json["data"]["skipped"], 1);
    assert_eq!(json["data"]["created"], 0);

    let recipients = EmailRecipientRepo::list_for_campaign(&pool, campaign.id)
        .await
        .unwrap();
    assert!(recipients.is_empty());
}

// ---------------------------------------------------------------------------
// Test: first event creates the recipient, later ones increment counters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn events_create_then_increment(pool: PgPool) {
    let campaign = seed_campaign(&pool).await;

    let body = serde_json::json!([
        event("delivered", Some("Pat@Example.com"), Some("msg-1.filter0001")),
        event("open", Some("pat@example.com"), Some("msg-1.filter0001")),
        event("open", Some("pat@example.com"), None),
        event("processed", Some("pat@example.com"), None),
    ]);
    let response =
        post_json(common::build_test_app(pool.clone()), "/api/v1/webhooks/sendgrid", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["received"], 4);
    assert_eq!(json["data"]["created"], 1);
    assert_eq!(json["data"]["updated"], 2);
    assert_eq!(json["data"]["skipped"], 1);

    let recipients = EmailRecipientRepo::list_for_campaign(&pool, campaign.id)
        .await
        .unwrap();
    assert_eq!(recipients.len(), 1);
    let pat = &recipients[0];
    assert_eq!(pat.email, "pat@example.com");
    assert_eq!(pat.delivered_count, 1);
    assert_eq!(pat.open_count, 2);
    assert_eq!(pat.last_event_type.as_deref(), Some("open"));
}

// ---------------------------------------------------------------------------
// Test: events for unknown campaigns are skipped
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_campaign_is_skipped(pool: PgPool) {
    let body = serde_json::json!([{
        "event": "click",
        "email": "someone@example.com",
        "singlesend_id": "does-not-exist",
    }]);
    let response =
        post_json(common::build_test_app(pool), "/api/v1/webhooks/sendgrid", body).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["skipped"], 1);
}

// ---------------------------------------------------------------------------
// Test: a configured token must match
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn webhook_token_is_enforced(pool: PgPool) {
    seed_campaign(&pool).await;
    let body = serde_json::json!([event("open", Some("a@example.com"), None)]);

    let missing = post_json(
        common::build_test_app_with_webhook_token(pool.clone()),
        "/api/v1/webhooks/sendgrid",
        body.clone(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = post_json(
        common::build_test_app_with_webhook_token(pool.clone()),
        "/api/v1/webhooks/sendgrid?token=nope",
        body.clone(),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let ok = post_json(
        common::build_test_app_with_webhook_token(pool),
        &format!("/api/v1/webhooks/sendgrid?token={}", common::WEBHOOK_TOKEN),
        body,
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: a body that is not an event array is rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn non_array_body_is_bad_request(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/webhooks/sendgrid",
        serde_json::json!("not events"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
