//! Repository for the `email_campaigns` table.

use beacon_core::metrics::DateRange;
use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::email_campaign::{CampaignEngagement, EmailCampaign, UpsertEmailCampaign};

const COLUMNS: &str = "id, external_id, name, status, category, company_id, send_at, \
                        vendor_updated_at, created_at, updated_at";

/// Campaigns mirrored from the email vendor, keyed by `external_id`.
pub struct EmailCampaignRepo;

impl EmailCampaignRepo {
    /// Insert or update a campaign keyed by its vendor id.
    ///
    /// `company_id` is resolved from the company whose `email_category`
    /// equals the campaign's category. An existing attribution is kept when
    /// the category no longer matches any company.
    pub async fn upsert_by_external_id(
        pool: &PgPool,
        input: &UpsertEmailCampaign,
    ) -> Result<EmailCampaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_campaigns
                (external_id, name, status, category, company_id, send_at, vendor_updated_at)
             VALUES ($1, $2, $3, $4,
                     (SELECT id FROM companies WHERE email_category = $4),
                     $5, $6)
             ON CONFLICT (external_id) DO UPDATE SET
                name = EXCLUDED.name,
                status = EXCLUDED.status,
                category = EXCLUDED.category,
                company_id = COALESCE(EXCLUDED.company_id, email_campaigns.company_id),
                send_at = EXCLUDED.send_at,
                vendor_updated_at = EXCLUDED.vendor_updated_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(&input.external_id)
            .bind(&input.name)
            .bind(&input.status)
            .bind(&input.category)
            .bind(input.send_at)
            .bind(input.vendor_updated_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EmailCampaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_campaigns WHERE id = $1");
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<EmailCampaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_campaigns WHERE external_id = $1");
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recently sent campaign with exactly this name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EmailCampaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_campaigns
             WHERE name = $1
             ORDER BY send_at DESC NULLS LAST, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Most recently sent campaign tagged with this category.
    pub async fn find_by_category(
        pool: &PgPool,
        category: &str,
    ) -> Result<Option<EmailCampaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_campaigns
             WHERE category = $1
             ORDER BY send_at DESC NULLS LAST, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(category)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_company(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EmailCampaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_campaigns
             WHERE company_id = $1
             ORDER BY send_at DESC NULLS LAST, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM email_campaigns")
            .fetch_one(pool)
            .await
    }

    /// Recipient counter sums per campaign, for campaigns sent in `range`.
    ///
    /// Campaigns without a `send_at` are placed by their creation date.
    pub async fn engagement_for_company(
        pool: &PgPool,
        company_id: DbId,
        range: DateRange,
    ) -> Result<Vec<CampaignEngagement>, sqlx::Error> {
        sqlx::query_as::<_, CampaignEngagement>(
            "SELECT c.id AS campaign_id,
                    c.name,
                    c.send_at,
                    COUNT(r.id)::BIGINT AS recipients,
                    COALESCE(SUM(r.delivered_count), 0)::BIGINT AS delivered,
                    COALESCE(SUM(r.open_count), 0)::BIGINT AS opens,
                    COALESCE(SUM(r.click_count), 0)::BIGINT AS clicks,
                    COALESCE(SUM(r.bounce_count), 0)::BIGINT AS bounces,
                    COALESCE(SUM(r.spam_count), 0)::BIGINT AS spam_reports,
                    COALESCE(SUM(r.unsubscribe_count), 0)::BIGINT AS unsubscribes
             FROM email_campaigns c
             LEFT JOIN email_recipients r ON r.campaign_id = c.id
             WHERE c.company_id = $1
               AND COALESCE(c.send_at, c.created_at)::DATE BETWEEN $2 AND $3
             GROUP BY c.id, c.name, c.send_at
             ORDER BY COALESCE(c.send_at, c.created_at) ASC, c.id ASC",
        )
        .bind(company_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
    }
}
