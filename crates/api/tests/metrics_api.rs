//! Company dashboards: range handling, summaries and access scoping.

mod common;

use axum::http::StatusCode;
use beacon_db::models::ga::{CreateGaAccount, UpsertGaDailyMetric};
use beacon_db::repositories::{GaAccountRepo, GaMetricRepo};
use chrono::NaiveDate;
use common::{body_json, create_test_company, create_test_user, get_auth, login_user};
use sqlx::PgPool;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

async fn seed_ga(pool: &PgPool, company_id: i64, rows: &[(u32, i64)]) {
    let account = GaAccountRepo::create(
        pool,
        &CreateGaAccount {
            company_id,
            property_id: "properties/123".into(),
            display_name: "Main site".into(),
        },
    )
    .await
    .unwrap();
    for &(d, sessions) in rows {
        GaMetricRepo::upsert(
            pool,
            account.id,
            &UpsertGaDailyMetric {
                metric_date: day(d),
                sessions,
                total_users: sessions / 2,
                new_users: sessions / 4,
                page_views: sessions * 3,
                bounce_rate: 40.0,
                avg_session_duration: 75.0,
                conversions: 2,
            },
        )
        .await
        .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Test: GA rows and summary compare against the previous window
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn ga_metrics_summarize_against_previous_window(pool: PgPool) {
    let company = create_test_company(&pool, "Acme", None).await;
    create_test_user(&pool, "admin", "admin", None).await;
    // Current window: March 11-20. Previous: March 1-10.
    seed_ga(&pool, company.id, &[(2, 100), (5, 100), (11, 150), (20, 250)]).await;
    let token = login_user(&pool, "admin").await;

    let uri = format!(
        "/api/v1/companies/{}/metrics/ga?start=2025-03-11&end=2025-03-20",
        company.id
    );
    let response = get_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["range"]["start"], "2025-03-11");
    assert_eq!(data["previous_range"]["start"], "2025-03-01");
    assert_eq!(data["previous_range"]["end"], "2025-03-10");
    assert_eq!(data["rows"].as_array().unwrap().len(), 2);

    let sessions = &data["summary"]["sessions"];
    assert_eq!(sessions["total"], 400.0);
    assert_eq!(sessions["previous_total"], 200.0);
    assert_eq!(sessions["pct_change"], 100.0);
    assert_eq!(data["summary"]["bounce_rate"]["average"], 40.0);
}

// ---------------------------------------------------------------------------
// Test: an empty previous window has no percentage change
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_previous_window_has_null_change(pool: PgPool) {
    let company = create_test_company(&pool, "Acme", None).await;
    create_test_user(&pool, "admin", "admin", None).await;
    seed_ga(&pool, company.id, &[(15, 80)]).await;
    let token = login_user(&pool, "admin").await;

    let uri = format!(
        "/api/v1/companies/{}/metrics/ga?start=2025-03-11&end=2025-03-20",
        company.id
    );
    let json = body_json(get_auth(common::build_test_app(pool), &uri, &token).await).await;
    assert!(json["data"]["summary"]["sessions"]["pct_change"].is_null());
}

// ---------------------------------------------------------------------------
// Test: an inverted range is rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn inverted_range_is_bad_request(pool: PgPool) {
    let company = create_test_company(&pool, "Acme", None).await;
    create_test_user(&pool, "admin", "admin", None).await;
    let token = login_user(&pool, "admin").await;

    let uri = format!(
        "/api/v1/companies/{}/metrics/email?start=2025-03-20&end=2025-03-01",
        company.id
    );
    let response = get_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn earliest_representable_date_is_bad_request(pool: PgPool) {
    let company = create_test_company(&pool, "Acme", None).await;
    create_test_user(&pool, "admin", "admin", None).await;
    let token = login_user(&pool, "admin").await;

    let min = NaiveDate::MIN;
    for query in [format!("end={min}"), format!("start={min}&end={min}")] {
        let uri = format!("/api/v1/companies/{}/metrics/ga?{query}", company.id);
        let response = get_auth(common::build_test_app(pool.clone()), &uri, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {query}");
    }
}

// ---------------------------------------------------------------------------
// Test: company scoping for clients and reps
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn metrics_are_scoped_to_company(pool: PgPool) {
    let rep = create_test_user(&pool, "rep", "account_rep", None).await;
    let mine = create_test_company(&pool, "Mine", Some(rep.id)).await;
    let other = create_test_company(&pool, "Other", None).await;
    create_test_user(&pool, "client", "client", Some(mine.id)).await;
    let rep_token = login_user(&pool, "rep").await;
    let client_token = login_user(&pool, "client").await;

    for channel in ["ga", "social", "email", "direct-mail"] {
        for token in [&rep_token, &client_token] {
            let own = format!("/api/v1/companies/{}/metrics/{channel}", mine.id);
            let response = get_auth(common::build_test_app(pool.clone()), &own, token).await;
            assert_eq!(response.status(), StatusCode::OK, "{own}");

            let foreign = format!("/api/v1/companies/{}/metrics/{channel}", other.id);
            let response = get_auth(common::build_test_app(pool.clone()), &foreign, token).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{foreign}");
        }
    }

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/companies/999999/campaigns",
        &rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: email rows carry rates over delivered
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn email_metrics_report_rates(pool: PgPool) {
    let company = create_test_company(&pool, "Acme", None).await;
    create_test_user(&pool, "admin", "admin", None).await;
    let token = login_user(&pool, "admin").await;

    let campaign_id: i64 = sqlx::query_scalar(
        "INSERT INTO email_campaigns (external_id, name, company_id, send_at)
         VALUES ('ss-9', 'March promo', $1, '2025-03-12T15:00:00Z')
         RETURNING id",
    )
    .bind(company.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    let recipients = [
        ("a@x.com", 1, 1),
        ("b@x.com", 0, 0),
        ("c@x.com", 2, 0),
        ("d@x.com", 0, 0),
    ];
    for (email, opens, clicks) in recipients {
        sqlx::query(
            "INSERT INTO email_recipients (campaign_id, email, delivered_count, open_count, click_count)
             VALUES ($1, $2, 1, $3, $4)",
        )
        .bind(campaign_id)
        .bind(email)
        .bind(opens)
        .bind(clicks)
        .execute(&pool)
        .await
        .unwrap();
    }

    let uri = format!(
        "/api/v1/companies/{}/metrics/email?start=2025-03-01&end=2025-03-31",
        company.id
    );
    let json = body_json(get_auth(common::build_test_app(pool), &uri, &token).await).await;
    let row = &json["data"]["rows"][0];
    assert_eq!(row["name"], "March promo");
    assert_eq!(row["delivered"], 4);
    assert_eq!(row["open_rate"], 50.0);
    assert_eq!(row["click_rate"], 25.0);
    assert_eq!(json["data"]["summary"]["campaigns"]["total"], 1.0);
}
