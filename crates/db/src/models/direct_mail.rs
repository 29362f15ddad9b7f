//! USPS direct-mail drop rows.

use beacon_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `direct_mail_drops`: one mailing on one date.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DirectMailDrop {
    pub id: DbId,
    pub company_id: DbId,
    pub campaign_name: String,
    pub drop_date: NaiveDate,
    pub vendor: Option<String>,
    pub pieces_sent: i64,
    pub delivered: i64,
    pub returned: i64,
    pub responses: i64,
    pub cost_cents: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Vendor-reported figures for a drop, upserted on
/// `(company_id, campaign_name, drop_date)`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertDirectMailDrop {
    pub campaign_name: String,
    pub drop_date: NaiveDate,
    pub vendor: Option<String>,
    pub pieces_sent: i64,
    #[serde(default)]
    pub delivered: i64,
    #[serde(default)]
    pub returned: i64,
    #[serde(default)]
    pub responses: i64,
    #[serde(default)]
    pub cost_cents: i64,
}
