//! Google Analytics property links and daily metric rows.

use beacon_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `ga_accounts`: one GA4 property attached to a company.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GaAccount {
    pub id: DbId,
    pub company_id: DbId,
    pub property_id: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateGaAccount {
    pub company_id: DbId,
    pub property_id: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGaAccount {
    pub display_name: Option<String>,
    pub is_active: Option<bool>,
}

/// One day of GA traffic for one property, as stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GaDailyMetric {
    pub id: DbId,
    pub ga_account_id: DbId,
    pub metric_date: NaiveDate,
    pub sessions: i64,
    pub total_users: i64,
    pub new_users: i64,
    pub page_views: i64,
    pub bounce_rate: f64,
    pub avg_session_duration: f64,
    pub conversions: i64,
}

/// Upsert payload for a single GA day.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertGaDailyMetric {
    pub metric_date: NaiveDate,
    pub sessions: i64,
    pub total_users: i64,
    pub new_users: i64,
    pub page_views: i64,
    pub bounce_rate: f64,
    pub avg_session_duration: f64,
    pub conversions: i64,
}

/// GA traffic for one company and one date, summed across its properties.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GaCompanyDay {
    pub metric_date: NaiveDate,
    pub sessions: i64,
    pub total_users: i64,
    pub new_users: i64,
    pub page_views: i64,
    /// Session-weighted across properties.
    pub bounce_rate: f64,
    /// Session-weighted across properties.
    pub avg_session_duration: f64,
    pub conversions: i64,
}
