//! Admin-triggered data pulls: SendGrid single sends, GA and Sprout daily
//! metrics, and the direct-mail drop import.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use beacon_campaigns::{sync_single_sends, SyncSummary};
use beacon_core::error::CoreError;
use beacon_core::types::DbId;
use beacon_db::models::direct_mail::{DirectMailDrop, UpsertDirectMailDrop};
use beacon_db::models::ga::UpsertGaDailyMetric;
use beacon_db::models::social::UpsertSocialDailyMetric;
use beacon_db::repositories::{
    CompanyRepo, DirectMailRepo, GaAccountRepo, GaMetricRepo, SocialMetricRepo,
    SocialProfileRepo,
};
use beacon_db::DbPool;
use beacon_vendors::google_analytics::GaDailyRow;
use beacon_vendors::sprout_social::SocialDailyRow;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Serialize)]
pub struct GaSyncSummary {
    pub accounts: usize,
    pub rows_upserted: usize,
    pub rows_failed: usize,
    /// Accounts whose report request failed; logged and skipped.
    pub failed_accounts: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct SocialSyncSummary {
    pub profiles: usize,
    pub rows_upserted: usize,
    /// Rows for profiles not linked to this company.
    pub rows_skipped: usize,
    pub rows_failed: usize,
}

#[derive(Debug, Deserialize)]
pub struct DirectMailImport {
    pub drops: Vec<UpsertDirectMailDrop>,
}

#[derive(Debug, Serialize)]
pub struct DirectMailImportResult {
    pub upserted: usize,
    pub drops: Vec<DirectMailDrop>,
}

/// POST /api/v1/admin/sync/single-sends
pub async fn run_single_sends_sync(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<SyncSummary>>> {
    let source = state.sendgrid()?;
    tracing::info!(user_id = admin.user_id, "Single sends sync started");

    let summary = sync_single_sends(source, &state.pool, &state.config.sync.settings).await?;
    Ok(Json(DataResponse::new(summary)))
}

/// POST /api/v1/admin/sync/ga/{company_id}?start=&end=
///
/// Pulls a daily report for every active GA account of the company.
pub async fn sync_ga(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(company_id): Path<DbId>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<GaSyncSummary>>> {
    let range = params.resolve()?;
    ensure_company(&state, company_id).await?;
    let client = state.google_analytics()?;

    let accounts = GaAccountRepo::list_active_for_company(&state.pool, company_id).await?;
    let mut summary = GaSyncSummary {
        accounts: accounts.len(),
        ..Default::default()
    };

    for account in &accounts {
        let rows = match client.run_daily_report(&account.property_id, range).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    ga_account_id = account.id,
                    property_id = %account.property_id,
                    error = %e,
                    "GA report failed",
                );
                summary.failed_accounts += 1;
                continue;
            }
        };
        let (upserted, failed) = store_ga_rows(&state.pool, account.id, &rows).await;
        summary.rows_upserted += upserted;
        summary.rows_failed += failed;
    }

    tracing::info!(
        company_id,
        accounts = summary.accounts,
        rows = summary.rows_upserted,
        rows_failed = summary.rows_failed,
        failed_accounts = summary.failed_accounts,
        "GA sync finished",
    );
    Ok(Json(DataResponse::new(summary)))
}

/// POST /api/v1/admin/sync/social/{company_id}?start=&end=
pub async fn sync_social(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(company_id): Path<DbId>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<SocialSyncSummary>>> {
    let range = params.resolve()?;
    ensure_company(&state, company_id).await?;
    let client = state.sprout()?;

    let profiles = SocialProfileRepo::list(&state.pool, Some(company_id)).await?;
    let by_sprout_id: HashMap<i64, DbId> = profiles
        .iter()
        .map(|p| (p.sprout_profile_id, p.id))
        .collect();
    let sprout_ids: Vec<i64> = by_sprout_id.keys().copied().collect();

    let rows = client.profile_daily_metrics(&sprout_ids, range).await?;
    let mut summary = SocialSyncSummary {
        profiles: profiles.len(),
        ..Default::default()
    };

    for row in &rows {
        let Some(&profile_id) = by_sprout_id.get(&row.profile_id) else {
            summary.rows_skipped += 1;
            continue;
        };
        match SocialMetricRepo::upsert(&state.pool, profile_id, &social_upsert(row)).await {
            Ok(()) => summary.rows_upserted += 1,
            Err(e) => {
                tracing::warn!(profile_id, date = %row.date, error = %e, "Social metric upsert failed");
                summary.rows_failed += 1;
            }
        }
    }

    tracing::info!(
        company_id,
        profiles = summary.profiles,
        rows = summary.rows_upserted,
        rows_failed = summary.rows_failed,
        "Social sync finished",
    );
    Ok(Json(DataResponse::new(summary)))
}

/// POST /api/v1/admin/direct-mail/{company_id}
///
/// Upserts vendor-reported drops keyed on `(campaign_name, drop_date)`. The
/// whole batch is validated before anything is written.
pub async fn import_direct_mail(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(company_id): Path<DbId>,
    Json(input): Json<DirectMailImport>,
) -> AppResult<Json<DataResponse<DirectMailImportResult>>> {
    ensure_company(&state, company_id).await?;
    for (index, drop) in input.drops.iter().enumerate() {
        validate_drop(drop).map_err(|msg| {
            AppError::Core(CoreError::Validation(format!("drops[{index}]: {msg}")))
        })?;
    }

    let mut drops = Vec::with_capacity(input.drops.len());
    for drop in &input.drops {
        let mut drop = drop.clone();
        drop.campaign_name = drop.campaign_name.trim().to_string();
        drops.push(DirectMailRepo::upsert(&state.pool, company_id, &drop).await?);
    }

    tracing::info!(company_id, upserted = drops.len(), "Direct mail drops imported");
    Ok(Json(DataResponse::new(DirectMailImportResult {
        upserted: drops.len(),
        drops,
    })))
}

fn validate_drop(drop: &UpsertDirectMailDrop) -> Result<(), String> {
    if drop.campaign_name.trim().is_empty() {
        return Err("campaign_name must not be empty".into());
    }
    let counts = [
        ("pieces_sent", drop.pieces_sent),
        ("delivered", drop.delivered),
        ("returned", drop.returned),
        ("responses", drop.responses),
        ("cost_cents", drop.cost_cents),
    ];
    if let Some((field, _)) = counts.iter().find(|(_, v)| *v < 0) {
        return Err(format!("{field} must not be negative"));
    }
    if drop.delivered > drop.pieces_sent {
        return Err("delivered cannot exceed pieces_sent".into());
    }
    Ok(())
}

/// Upsert one account's report rows, returning `(upserted, failed)`.
///
/// A failed row is logged and counted; the remaining rows are still written.
pub async fn store_ga_rows(
    pool: &DbPool,
    ga_account_id: DbId,
    rows: &[GaDailyRow],
) -> (usize, usize) {
    let mut upserted = 0;
    let mut failed = 0;
    for row in rows {
        match GaMetricRepo::upsert(pool, ga_account_id, &ga_upsert(row)).await {
            Ok(_) => upserted += 1,
            Err(e) => {
                tracing::warn!(
                    ga_account_id,
                    date = %row.date,
                    error = %e,
                    "GA metric upsert failed",
                );
                failed += 1;
            }
        }
    }
    (upserted, failed)
}

fn ga_upsert(row: &GaDailyRow) -> UpsertGaDailyMetric {
    UpsertGaDailyMetric {
        metric_date: row.date,
        sessions: row.sessions,
        total_users: row.total_users,
        new_users: row.new_users,
        page_views: row.page_views,
        bounce_rate: row.bounce_rate,
        avg_session_duration: row.avg_session_duration,
        conversions: row.conversions,
    }
}

fn social_upsert(row: &SocialDailyRow) -> UpsertSocialDailyMetric {
    UpsertSocialDailyMetric {
        metric_date: row.date,
        impressions: row.impressions,
        engagements: row.engagements,
        followers: row.followers,
        posts_published: row.posts_published,
        link_clicks: row.link_clicks,
    }
}

async fn ensure_company(state: &AppState, company_id: DbId) -> AppResult<()> {
    CompanyRepo::find_by_id(&state.pool, company_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Company",
            id: company_id,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn drop(pieces: i64, delivered: i64) -> UpsertDirectMailDrop {
        UpsertDirectMailDrop {
            campaign_name: "Spring postcard".into(),
            drop_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            vendor: None,
            pieces_sent: pieces,
            delivered,
            returned: 0,
            responses: 0,
            cost_cents: 0,
        }
    }

    #[test]
    fn valid_drop_passes() {
        assert!(validate_drop(&drop(1000, 950)).is_ok());
    }

    #[test]
    fn negative_and_inconsistent_counts_are_rejected() {
        assert!(validate_drop(&drop(-1, 0)).is_err());
        assert!(validate_drop(&drop(10, 11)).is_err());
        let mut blank = drop(10, 5);
        blank.campaign_name = "  ".into();
        assert!(validate_drop(&blank).is_err());
    }
}
