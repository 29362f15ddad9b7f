//! Repository for the `social_daily_metrics` table.

use beacon_core::metrics::DateRange;
use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::social::{SocialNetworkDay, UpsertSocialDailyMetric};

pub struct SocialMetricRepo;

impl SocialMetricRepo {
    /// Insert or overwrite one profile-day.
    pub async fn upsert(
        pool: &PgPool,
        social_profile_id: DbId,
        input: &UpsertSocialDailyMetric,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO social_daily_metrics
                (social_profile_id, metric_date, impressions, engagements,
                 followers, posts_published, link_clicks)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (social_profile_id, metric_date) DO UPDATE SET
                impressions = EXCLUDED.impressions,
                engagements = EXCLUDED.engagements,
                followers = EXCLUDED.followers,
                posts_published = EXCLUDED.posts_published,
                link_clicks = EXCLUDED.link_clicks",
        )
        .bind(social_profile_id)
        .bind(input.metric_date)
        .bind(input.impressions)
        .bind(input.engagements)
        .bind(input.followers)
        .bind(input.posts_published)
        .bind(input.link_clicks)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Per-day, per-network totals across a company's profiles.
    pub async fn company_days(
        pool: &PgPool,
        company_id: DbId,
        range: DateRange,
    ) -> Result<Vec<SocialNetworkDay>, sqlx::Error> {
        sqlx::query_as::<_, SocialNetworkDay>(
            "SELECT m.metric_date,
                    p.network,
                    SUM(m.impressions)::BIGINT AS impressions,
                    SUM(m.engagements)::BIGINT AS engagements,
                    SUM(m.followers)::BIGINT AS followers,
                    SUM(m.posts_published)::BIGINT AS posts_published,
                    SUM(m.link_clicks)::BIGINT AS link_clicks
             FROM social_daily_metrics m
             JOIN social_profiles p ON p.id = m.social_profile_id
             WHERE p.company_id = $1
               AND m.metric_date BETWEEN $2 AND $3
             GROUP BY m.metric_date, p.network
             ORDER BY m.metric_date ASC, p.network ASC",
        )
        .bind(company_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
    }
}
