//! Log of transactional emails sent through Mailgun.

use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const SEND_STATUS_SENT: &str = "sent";
pub const SEND_STATUS_FAILED: &str = "failed";

/// A row from `mailgun_sends`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MailgunSend {
    pub id: DbId,
    pub company_id: Option<DbId>,
    pub sent_by: DbId,
    pub recipient: String,
    pub subject: String,
    pub vendor_message_id: Option<String>,
    pub status: String,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateMailgunSend {
    pub company_id: Option<DbId>,
    pub sent_by: DbId,
    pub recipient: String,
    pub subject: String,
    pub vendor_message_id: Option<String>,
    pub status: String,
    pub error: Option<String>,
}
