//! Client company model and DTOs.

use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub website: Option<String>,
    /// Staff user responsible for this company.
    pub account_rep_id: Option<DbId>,
    /// SendGrid category tag that attributes single sends to this company.
    pub email_category: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub website: Option<String>,
    pub account_rep_id: Option<DbId>,
    pub email_category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub website: Option<String>,
    pub account_rep_id: Option<DbId>,
    pub email_category: Option<String>,
    pub is_active: Option<bool>,
}
