//! The three seeded roles.

use beacon_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A role with the number of active users holding it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub active_users: i64,
}
