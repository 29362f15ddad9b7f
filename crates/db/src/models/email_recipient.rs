//! Per-campaign, per-address engagement counter rows.

use beacon_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `email_recipients`.
///
/// `message_id` is selected only when the column exists; see
/// `EmailRecipientRepo`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailRecipient {
    pub id: DbId,
    pub campaign_id: DbId,
    pub email: String,
    pub delivered_count: i32,
    pub open_count: i32,
    pub click_count: i32,
    pub bounce_count: i32,
    pub spam_count: i32,
    pub unsubscribe_count: i32,
    pub last_event_type: Option<String>,
    pub last_event_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
