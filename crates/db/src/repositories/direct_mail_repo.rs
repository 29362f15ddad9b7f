//! Repository for the `direct_mail_drops` table.

use beacon_core::metrics::DateRange;
use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::direct_mail::{DirectMailDrop, UpsertDirectMailDrop};

const COLUMNS: &str = "id, company_id, campaign_name, drop_date, vendor, pieces_sent, \
                        delivered, returned, responses, cost_cents, created_at, updated_at";

pub struct DirectMailRepo;

impl DirectMailRepo {
    /// Insert or overwrite a drop keyed by `(company, campaign_name, drop_date)`.
    pub async fn upsert(
        pool: &PgPool,
        company_id: DbId,
        input: &UpsertDirectMailDrop,
    ) -> Result<DirectMailDrop, sqlx::Error> {
        let query = format!(
            "INSERT INTO direct_mail_drops
                (company_id, campaign_name, drop_date, vendor, pieces_sent,
                 delivered, returned, responses, cost_cents)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (company_id, campaign_name, drop_date) DO UPDATE SET
                vendor = EXCLUDED.vendor,
                pieces_sent = EXCLUDED.pieces_sent,
                delivered = EXCLUDED.delivered,
                returned = EXCLUDED.returned,
                responses = EXCLUDED.responses,
                cost_cents = EXCLUDED.cost_cents
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DirectMailDrop>(&query)
            .bind(company_id)
            .bind(&input.campaign_name)
            .bind(input.drop_date)
            .bind(&input.vendor)
            .bind(input.pieces_sent)
            .bind(input.delivered)
            .bind(input.returned)
            .bind(input.responses)
            .bind(input.cost_cents)
            .fetch_one(pool)
            .await
    }

    /// Drops for a company whose `drop_date` falls in `range`, oldest first.
    pub async fn list_for_company(
        pool: &PgPool,
        company_id: DbId,
        range: DateRange,
    ) -> Result<Vec<DirectMailDrop>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM direct_mail_drops
             WHERE company_id = $1 AND drop_date BETWEEN $2 AND $3
             ORDER BY drop_date ASC, campaign_name ASC"
        );
        sqlx::query_as::<_, DirectMailDrop>(&query)
            .bind(company_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await
    }
}
