//! Chat assistant conversations and their messages.

use beacon_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const MESSAGE_ROLE_USER: &str = "user";
pub const MESSAGE_ROLE_ASSISTANT: &str = "assistant";
pub const MESSAGE_ROLE_SYSTEM: &str = "system";

/// A row from `conversations`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    pub user_id: DbId,
    /// Company whose metrics ground the assistant's answers, if any.
    pub company_id: Option<DbId>,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `conversation_messages`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationMessage {
    pub id: DbId,
    pub conversation_id: DbId,
    pub role: String,
    pub content: String,
    pub created_at: Timestamp,
}
