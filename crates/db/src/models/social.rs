//! Sprout Social profiles and daily metric rows.

use beacon_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `social_profiles`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SocialProfile {
    pub id: DbId,
    pub company_id: DbId,
    pub sprout_profile_id: i64,
    /// Network label as reported by Sprout (`facebook`, `instagram`, ...).
    pub network: String,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateSocialProfile {
    pub company_id: DbId,
    pub sprout_profile_id: i64,
    pub network: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSocialDailyMetric {
    pub metric_date: NaiveDate,
    pub impressions: i64,
    pub engagements: i64,
    pub followers: i64,
    pub posts_published: i64,
    pub link_clicks: i64,
}

/// Daily social metrics for one company, grouped by network.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SocialNetworkDay {
    pub metric_date: NaiveDate,
    pub network: String,
    pub impressions: i64,
    pub engagements: i64,
    pub followers: i64,
    pub posts_published: i64,
    pub link_clicks: i64,
}
