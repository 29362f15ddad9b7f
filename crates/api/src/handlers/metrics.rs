//! Per-channel dashboard read models under `/companies/{id}`.
//!
//! Every metrics endpoint resolves `?start=&end=` into a range, loads the
//! rows for that range and for the equal-length range before it, and returns
//! the current rows together with summary cards comparing the two.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{Path, Query, State};
use axum::Json;
use beacon_core::metrics::{pct_delta, round2, safe_rate, DateRange, MetricSummary};
use beacon_core::types::DbId;
use beacon_db::models::direct_mail::DirectMailDrop;
use beacon_db::models::email_campaign::{CampaignEngagement, EmailCampaign};
use beacon_db::models::ga::GaCompanyDay;
use beacon_db::models::social::SocialNetworkDay;
use beacon_db::repositories::{
    DirectMailRepo, EmailCampaignRepo, GaMetricRepo, SocialMetricRepo,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::access::authorize_company;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{DateRangeParams, PaginationParams};
use crate::response::{DataResponse, MetricsResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GaSummary {
    pub sessions: MetricSummary,
    pub total_users: MetricSummary,
    pub new_users: MetricSummary,
    pub page_views: MetricSummary,
    pub conversions: MetricSummary,
    pub bounce_rate: MetricSummary,
    pub avg_session_duration: MetricSummary,
}

#[derive(Debug, Serialize)]
pub struct SocialSummary {
    pub impressions: MetricSummary,
    pub engagements: MetricSummary,
    pub posts_published: MetricSummary,
    pub link_clicks: MetricSummary,
    /// `total` is the audience on the last day of the window, summed over
    /// networks; `average` is the mean daily audience.
    pub followers: MetricSummary,
    pub engagement_rate: MetricSummary,
}

#[derive(Debug, Serialize)]
pub struct EmailSummary {
    pub campaigns: MetricSummary,
    pub recipients: MetricSummary,
    pub delivered: MetricSummary,
    pub opens: MetricSummary,
    pub clicks: MetricSummary,
    pub bounces: MetricSummary,
    pub unsubscribes: MetricSummary,
    pub open_rate: MetricSummary,
    pub click_rate: MetricSummary,
}

#[derive(Debug, Serialize)]
pub struct EmailCampaignRow {
    #[serde(flatten)]
    pub engagement: CampaignEngagement,
    /// Opens over delivered, percent.
    pub open_rate: f64,
    /// Clicks over delivered, percent.
    pub click_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DirectMailSummary {
    pub drops: MetricSummary,
    pub pieces_sent: MetricSummary,
    pub delivered: MetricSummary,
    pub responses: MetricSummary,
    /// In dollars.
    pub cost: MetricSummary,
    pub response_rate: MetricSummary,
    /// In dollars; zero when there were no responses.
    pub cost_per_response: MetricSummary,
}

#[derive(Debug, Serialize)]
pub struct DirectMailRow {
    #[serde(flatten)]
    pub drop: DirectMailDrop,
    /// Responses over delivered pieces (pieces sent when delivery is not
    /// reported), percent.
    pub response_rate: f64,
    /// In dollars; `None` without responses.
    pub cost_per_response: Option<f64>,
}

fn column<T>(rows: &[T], f: impl Fn(&T) -> i64) -> Vec<f64> {
    rows.iter().map(|r| f(r) as f64).collect()
}

fn total<T>(rows: &[T], f: impl Fn(&T) -> i64) -> f64 {
    rows.iter().map(|r| f(r) as f64).sum()
}

/// Card for a ratio computed over the whole window rather than per row.
fn ratio_summary(current: f64, previous: f64) -> MetricSummary {
    MetricSummary {
        total: round2(current),
        average: round2(current),
        previous_total: round2(previous),
        pct_change: pct_delta(current, previous),
    }
}

pub fn summarize_ga(current: &[GaCompanyDay], previous: &[GaCompanyDay]) -> GaSummary {
    let additive = |f: fn(&GaCompanyDay) -> i64| {
        MetricSummary::additive(&column(current, f), &column(previous, f))
    };
    let averaged = |f: fn(&GaCompanyDay) -> f64| {
        let cur: Vec<f64> = current.iter().map(f).collect();
        let prev: Vec<f64> = previous.iter().map(f).collect();
        MetricSummary::averaged(&cur, &prev)
    };
    GaSummary {
        sessions: additive(|d| d.sessions),
        total_users: additive(|d| d.total_users),
        new_users: additive(|d| d.new_users),
        page_views: additive(|d| d.page_views),
        conversions: additive(|d| d.conversions),
        bounce_rate: averaged(|d| d.bounce_rate),
        avg_session_duration: averaged(|d| d.avg_session_duration),
    }
}

/// Daily follower totals across networks, in date order.
fn followers_by_day(rows: &[SocialNetworkDay]) -> Vec<f64> {
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in rows {
        *days.entry(row.metric_date).or_default() += row.followers;
    }
    days.into_values().map(|v| v as f64).collect()
}

pub fn summarize_social(
    current: &[SocialNetworkDay],
    previous: &[SocialNetworkDay],
) -> SocialSummary {
    let additive = |f: fn(&SocialNetworkDay) -> i64| {
        MetricSummary::additive(&column(current, f), &column(previous, f))
    };

    let cur_followers = followers_by_day(current);
    let prev_followers = followers_by_day(previous);
    let last = |v: &[f64]| v.last().copied().unwrap_or(0.0);
    let followers = MetricSummary {
        total: last(&cur_followers),
        average: round2(beacon_core::metrics::mean(&cur_followers)),
        previous_total: last(&prev_followers),
        pct_change: pct_delta(last(&cur_followers), last(&prev_followers)),
    };

    let engagement_rate = ratio_summary(
        safe_rate(total(current, |d| d.engagements), total(current, |d| d.impressions)),
        safe_rate(total(previous, |d| d.engagements), total(previous, |d| d.impressions)),
    );

    SocialSummary {
        impressions: additive(|d| d.impressions),
        engagements: additive(|d| d.engagements),
        posts_published: additive(|d| d.posts_published),
        link_clicks: additive(|d| d.link_clicks),
        followers,
        engagement_rate,
    }
}

pub fn email_row(engagement: CampaignEngagement) -> EmailCampaignRow {
    let delivered = engagement.delivered as f64;
    EmailCampaignRow {
        open_rate: safe_rate(engagement.opens as f64, delivered),
        click_rate: safe_rate(engagement.clicks as f64, delivered),
        engagement,
    }
}

pub fn summarize_email(
    current: &[CampaignEngagement],
    previous: &[CampaignEngagement],
) -> EmailSummary {
    let additive = |f: fn(&CampaignEngagement) -> i64| {
        MetricSummary::additive(&column(current, f), &column(previous, f))
    };
    let rate = |num: fn(&CampaignEngagement) -> i64| {
        ratio_summary(
            safe_rate(total(current, num), total(current, |c| c.delivered)),
            safe_rate(total(previous, num), total(previous, |c| c.delivered)),
        )
    };
    EmailSummary {
        campaigns: MetricSummary::additive(
            &vec![1.0; current.len()],
            &vec![1.0; previous.len()],
        ),
        recipients: additive(|c| c.recipients),
        delivered: additive(|c| c.delivered),
        opens: additive(|c| c.opens),
        clicks: additive(|c| c.clicks),
        bounces: additive(|c| c.bounces),
        unsubscribes: additive(|c| c.unsubscribes),
        open_rate: rate(|c| c.opens),
        click_rate: rate(|c| c.clicks),
    }
}

fn reach(drop: &DirectMailDrop) -> i64 {
    if drop.delivered > 0 {
        drop.delivered
    } else {
        drop.pieces_sent
    }
}

pub fn direct_mail_row(drop: DirectMailDrop) -> DirectMailRow {
    DirectMailRow {
        response_rate: safe_rate(drop.responses as f64, reach(&drop) as f64),
        cost_per_response: (drop.responses > 0)
            .then(|| round2(drop.cost_cents as f64 / 100.0 / drop.responses as f64)),
        drop,
    }
}

fn cost_per_response(drops: &[DirectMailDrop]) -> f64 {
    let responses = total(drops, |d| d.responses);
    if responses <= 0.0 {
        0.0
    } else {
        total(drops, |d| d.cost_cents) / 100.0 / responses
    }
}

pub fn summarize_direct_mail(
    current: &[DirectMailDrop],
    previous: &[DirectMailDrop],
) -> DirectMailSummary {
    let additive = |f: fn(&DirectMailDrop) -> i64| {
        MetricSummary::additive(&column(current, f), &column(previous, f))
    };
    let dollars = |rows: &[DirectMailDrop]| -> Vec<f64> {
        rows.iter().map(|d| d.cost_cents as f64 / 100.0).collect()
    };
    DirectMailSummary {
        drops: MetricSummary::additive(&vec![1.0; current.len()], &vec![1.0; previous.len()]),
        pieces_sent: additive(|d| d.pieces_sent),
        delivered: additive(|d| d.delivered),
        responses: additive(|d| d.responses),
        cost: MetricSummary::additive(&dollars(current), &dollars(previous)),
        response_rate: ratio_summary(
            safe_rate(total(current, |d| d.responses), total(current, reach)),
            safe_rate(total(previous, |d| d.responses), total(previous, reach)),
        ),
        cost_per_response: ratio_summary(cost_per_response(current), cost_per_response(previous)),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Both windows for a request, after checking company access.
async fn windows(
    state: &AppState,
    user: &AuthUser,
    company_id: DbId,
    params: &DateRangeParams,
) -> AppResult<(DateRange, DateRange)> {
    let range = params.resolve()?;
    authorize_company(&state.pool, user, company_id).await?;
    Ok((range, range.previous()?))
}

/// GET /api/v1/companies/{id}/metrics/ga
pub async fn ga_metrics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<DbId>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<MetricsResponse<GaCompanyDay, GaSummary>>>> {
    let (range, previous_range) = windows(&state, &user, company_id, &params).await?;
    let rows = GaMetricRepo::company_days(&state.pool, company_id, range).await?;
    let previous = GaMetricRepo::company_days(&state.pool, company_id, previous_range).await?;

    let summary = summarize_ga(&rows, &previous);
    Ok(Json(DataResponse::new(MetricsResponse {
        range,
        previous_range,
        rows,
        summary,
    })))
}

/// GET /api/v1/companies/{id}/metrics/social
pub async fn social_metrics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<DbId>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<MetricsResponse<SocialNetworkDay, SocialSummary>>>> {
    let (range, previous_range) = windows(&state, &user, company_id, &params).await?;
    let rows = SocialMetricRepo::company_days(&state.pool, company_id, range).await?;
    let previous = SocialMetricRepo::company_days(&state.pool, company_id, previous_range).await?;

    let summary = summarize_social(&rows, &previous);
    Ok(Json(DataResponse::new(MetricsResponse {
        range,
        previous_range,
        rows,
        summary,
    })))
}

/// GET /api/v1/companies/{id}/metrics/email
pub async fn email_metrics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<DbId>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<MetricsResponse<EmailCampaignRow, EmailSummary>>>> {
    let (range, previous_range) = windows(&state, &user, company_id, &params).await?;
    let current = EmailCampaignRepo::engagement_for_company(&state.pool, company_id, range).await?;
    let previous =
        EmailCampaignRepo::engagement_for_company(&state.pool, company_id, previous_range).await?;

    let summary = summarize_email(&current, &previous);
    Ok(Json(DataResponse::new(MetricsResponse {
        range,
        previous_range,
        rows: current.into_iter().map(email_row).collect(),
        summary,
    })))
}

/// GET /api/v1/companies/{id}/metrics/direct-mail
pub async fn direct_mail_metrics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<DbId>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<MetricsResponse<DirectMailRow, DirectMailSummary>>>> {
    let (range, previous_range) = windows(&state, &user, company_id, &params).await?;
    let current = DirectMailRepo::list_for_company(&state.pool, company_id, range).await?;
    let previous = DirectMailRepo::list_for_company(&state.pool, company_id, previous_range).await?;

    let summary = summarize_direct_mail(&current, &previous);
    Ok(Json(DataResponse::new(MetricsResponse {
        range,
        previous_range,
        rows: current.into_iter().map(direct_mail_row).collect(),
        summary,
    })))
}

/// GET /api/v1/companies/{id}/campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<EmailCampaign>>>> {
    authorize_company(&state.pool, &user, company_id).await?;
    let campaigns =
        EmailCampaignRepo::list_for_company(&state.pool, company_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse::new(campaigns)))
}

/// Thirty-day GA and email totals for a company, used to ground the chat
/// assistant. Keys are metric names, values the current-window totals.
pub async fn company_snapshot(
    state: &AppState,
    company_id: DbId,
    range: DateRange,
) -> AppResult<HashMap<&'static str, f64>> {
    let ga = GaMetricRepo::company_days(&state.pool, company_id, range).await?;
    let email = EmailCampaignRepo::engagement_for_company(&state.pool, company_id, range).await?;

    let ga = summarize_ga(&ga, &[]);
    let email = summarize_email(&email, &[]);
    Ok(HashMap::from([
        ("ga_sessions", ga.sessions.total),
        ("ga_users", ga.total_users.total),
        ("ga_page_views", ga.page_views.total),
        ("ga_conversions", ga.conversions.total),
        ("ga_bounce_rate_pct", ga.bounce_rate.average),
        ("email_campaigns", email.campaigns.total),
        ("email_delivered", email.delivered.total),
        ("email_open_rate_pct", email.open_rate.total),
        ("email_click_rate_pct", email.click_rate.total),
    ]))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn ga_day(day: u32, sessions: i64, bounce: f64) -> GaCompanyDay {
        GaCompanyDay {
            metric_date: d(day),
            sessions,
            total_users: sessions / 2,
            new_users: 0,
            page_views: sessions * 3,
            bounce_rate: bounce,
            avg_session_duration: 60.0,
            conversions: 1,
        }
    }

    fn engagement(delivered: i64, opens: i64, clicks: i64) -> CampaignEngagement {
        CampaignEngagement {
            campaign_id: 1,
            name: "March newsletter".into(),
            send_at: None,
            recipients: delivered,
            delivered,
            opens,
            clicks,
            bounces: 0,
            spam_reports: 0,
            unsubscribes: 0,
        }
    }

    fn mail_drop(pieces: i64, delivered: i64, responses: i64, cost_cents: i64) -> DirectMailDrop {
        DirectMailDrop {
            id: 1,
            company_id: 1,
            campaign_name: "Postcard".into(),
            drop_date: d(1),
            vendor: None,
            pieces_sent: pieces,
            delivered,
            returned: 0,
            responses,
            cost_cents,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ga_summary_sums_counts_and_averages_rates() {
        let current = [ga_day(1, 100, 40.0), ga_day(2, 300, 60.0)];
        let previous = [ga_day(1, 200, 50.0)];
        let s = summarize_ga(&current, &previous);
        assert_eq!(s.sessions.total, 400.0);
        assert_eq!(s.sessions.pct_change, Some(100.0));
        assert_eq!(s.bounce_rate.total, 50.0);
        assert_eq!(s.bounce_rate.pct_change, Some(0.0));
    }

    #[test]
    fn empty_previous_window_has_no_change() {
        let s = summarize_ga(&[ga_day(1, 10, 0.0)], &[]);
        assert_eq!(s.sessions.pct_change, None);
        assert_eq!(s.sessions.previous_total, 0.0);
    }

    #[test]
    fn email_rates_are_over_delivered() {
        let row = email_row(engagement(200, 50, 10));
        assert_eq!(row.open_rate, 25.0);
        assert_eq!(row.click_rate, 5.0);

        let s = summarize_email(&[engagement(100, 10, 1), engagement(100, 30, 3)], &[]);
        assert_eq!(s.campaigns.total, 2.0);
        assert_eq!(s.open_rate.total, 20.0);
        assert_eq!(s.click_rate.total, 2.0);
    }

    #[test]
    fn email_rates_with_nothing_delivered_are_zero() {
        let row = email_row(engagement(0, 0, 0));
        assert_eq!(row.open_rate, 0.0);
    }

    #[test]
    fn direct_mail_response_rate_and_cost() {
        let row = direct_mail_row(mail_drop(1000, 800, 20, 50_000));
        assert_eq!(row.response_rate, 2.5);
        assert_eq!(row.cost_per_response, Some(25.0));

        let none = direct_mail_row(mail_drop(500, 0, 0, 10_000));
        assert_eq!(none.response_rate, 0.0);
        assert_eq!(none.cost_per_response, None);
    }

    #[test]
    fn direct_mail_summary_uses_pieces_when_delivery_unreported() {
        let s = summarize_direct_mail(&[mail_drop(400, 0, 4, 20_000)], &[]);
        assert_eq!(s.response_rate.total, 1.0);
        assert_eq!(s.cost.total, 200.0);
        assert_eq!(s.cost_per_response.total, 50.0);
    }

    #[test]
    fn social_followers_take_last_day_across_networks() {
        let row = |day: u32, network: &str, followers: i64| SocialNetworkDay {
            metric_date: d(day),
            network: network.into(),
            impressions: 100,
            engagements: 5,
            followers,
            posts_published: 1,
            link_clicks: 0,
        };
        let current = [
            row(1, "facebook", 100),
            row(1, "instagram", 50),
            row(2, "facebook", 110),
            row(2, "instagram", 60),
        ];
        let s = summarize_social(&current, &[]);
        assert_eq!(s.followers.total, 170.0);
        assert_eq!(s.followers.average, 160.0);
        assert_eq!(s.impressions.total, 400.0);
        assert_eq!(s.engagement_rate.total, 5.0);
    }
}
