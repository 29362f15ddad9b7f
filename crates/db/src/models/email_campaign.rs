//! Email campaign (SendGrid single send) rows.

use beacon_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `email_campaigns`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailCampaign {
    pub id: DbId,
    /// Vendor-side single-send id; the sync upsert key.
    pub external_id: String,
    pub name: String,
    pub status: Option<String>,
    pub category: Option<String>,
    pub company_id: Option<DbId>,
    pub send_at: Option<Timestamp>,
    pub vendor_updated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Normalized single send ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertEmailCampaign {
    pub external_id: String,
    pub name: String,
    pub status: Option<String>,
    pub category: Option<String>,
    pub send_at: Option<Timestamp>,
    pub vendor_updated_at: Option<Timestamp>,
}

/// Per-campaign engagement totals for the email read model.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignEngagement {
    pub campaign_id: DbId,
    pub name: String,
    pub send_at: Option<Timestamp>,
    pub recipients: i64,
    pub delivered: i64,
    pub opens: i64,
    pub clicks: i64,
    pub bounces: i64,
    pub spam_reports: i64,
    pub unsubscribes: i64,
}
