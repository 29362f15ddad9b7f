//! Support ticket and comment models.

use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `tickets`. `status` and `priority` hold the labels from
/// `beacon_core::tickets`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub company_id: DbId,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub priority: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateTicket {
    pub company_id: DbId,
    pub created_by: DbId,
    pub subject: String,
    pub body: String,
    pub priority: String,
}

#[derive(Debug, Default)]
pub struct UpdateTicket {
    pub assigned_to: Option<DbId>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// A row from `ticket_comments`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketComment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketComment {
    pub body: String,
}
