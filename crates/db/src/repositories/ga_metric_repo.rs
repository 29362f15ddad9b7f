//! Repository for the `ga_daily_metrics` table.

use beacon_core::metrics::DateRange;
use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::ga::{GaCompanyDay, GaDailyMetric, UpsertGaDailyMetric};

const COLUMNS: &str = "id, ga_account_id, metric_date, sessions, total_users, new_users, \
                        page_views, bounce_rate, avg_session_duration, conversions";

pub struct GaMetricRepo;

impl GaMetricRepo {
    /// Insert or overwrite one account-day.
    pub async fn upsert(
        pool: &PgPool,
        ga_account_id: DbId,
        input: &UpsertGaDailyMetric,
    ) -> Result<GaDailyMetric, sqlx::Error> {
        let query = format!(
            "INSERT INTO ga_daily_metrics
                (ga_account_id, metric_date, sessions, total_users, new_users,
                 page_views, bounce_rate, avg_session_duration, conversions)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (ga_account_id, metric_date) DO UPDATE SET
                sessions = EXCLUDED.sessions,
                total_users = EXCLUDED.total_users,
                new_users = EXCLUDED.new_users,
                page_views = EXCLUDED.page_views,
                bounce_rate = EXCLUDED.bounce_rate,
                avg_session_duration = EXCLUDED.avg_session_duration,
                conversions = EXCLUDED.conversions
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GaDailyMetric>(&query)
            .bind(ga_account_id)
            .bind(input.metric_date)
            .bind(input.sessions)
            .bind(input.total_users)
            .bind(input.new_users)
            .bind(input.page_views)
            .bind(input.bounce_rate)
            .bind(input.avg_session_duration)
            .bind(input.conversions)
            .fetch_one(pool)
            .await
    }

    /// Per-day totals across a company's active GA accounts.
    ///
    /// Additive metrics are summed. Bounce rate and session duration are
    /// session-weighted, falling back to a plain mean on zero-session days.
    pub async fn company_days(
        pool: &PgPool,
        company_id: DbId,
        range: DateRange,
    ) -> Result<Vec<GaCompanyDay>, sqlx::Error> {
        sqlx::query_as::<_, GaCompanyDay>(
            "SELECT m.metric_date,
                    SUM(m.sessions)::BIGINT AS sessions,
                    SUM(m.total_users)::BIGINT AS total_users,
                    SUM(m.new_users)::BIGINT AS new_users,
                    SUM(m.page_views)::BIGINT AS page_views,
                    CASE WHEN SUM(m.sessions) > 0
                         THEN (SUM(m.bounce_rate * m.sessions) / SUM(m.sessions))::DOUBLE PRECISION
                         ELSE AVG(m.bounce_rate)::DOUBLE PRECISION END AS bounce_rate,
                    CASE WHEN SUM(m.sessions) > 0
                         THEN (SUM(m.avg_session_duration * m.sessions) / SUM(m.sessions))::DOUBLE PRECISION
                         ELSE AVG(m.avg_session_duration)::DOUBLE PRECISION END AS avg_session_duration,
                    SUM(m.conversions)::BIGINT AS conversions
             FROM ga_daily_metrics m
             JOIN ga_accounts a ON a.id = m.ga_account_id
             WHERE a.company_id = $1
               AND a.is_active = true
               AND m.metric_date BETWEEN $2 AND $3
             GROUP BY m.metric_date
             ORDER BY m.metric_date ASC",
        )
        .bind(company_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
    }
}
