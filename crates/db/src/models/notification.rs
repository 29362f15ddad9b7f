//! In-app notifications raised by ticket activity.

use beacon_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const KIND_TICKET_CREATED: &str = "ticket_created";
pub const KIND_TICKET_ASSIGNED: &str = "ticket_assigned";
pub const KIND_TICKET_STATUS: &str = "ticket_status_changed";
pub const KIND_TICKET_COMMENT: &str = "ticket_comment";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub kind: &'static str,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
}

#[derive(Debug, Default)]
pub struct NotificationFilter {
    pub unread_only: bool,
    pub kind: Option<String>,
}
