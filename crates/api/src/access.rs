//! Company-scoped access rules.
//!
//! Admins see every company, account reps the companies they are assigned
//! to, and clients only the company on their own user row.

use beacon_core::error::CoreError;
use beacon_core::roles::{ROLE_ACCOUNT_REP, ROLE_ADMIN, ROLE_CLIENT};
use beacon_core::types::DbId;
use beacon_db::models::company::Company;
use beacon_db::repositories::{CompanyRepo, UserRepo};
use beacon_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Whether a caller may read `company`.
///
/// `own_company` is the caller's `users.company_id`; only consulted for
/// clients.
pub fn can_access_company(
    role: &str,
    user_id: DbId,
    own_company: Option<DbId>,
    company: &Company,
) -> bool {
    match role {
        ROLE_ADMIN => true,
        ROLE_ACCOUNT_REP => company.account_rep_id == Some(user_id),
        ROLE_CLIENT => own_company == Some(company.id),
        _ => false,
    }
}

/// Load `company_id` and check the caller may see it.
///
/// A missing company is 404, a company outside the caller's scope 403.
pub async fn authorize_company(
    pool: &DbPool,
    user: &AuthUser,
    company_id: DbId,
) -> AppResult<Company> {
    let company = CompanyRepo::find_by_id(pool, company_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Company",
            id: company_id,
        })?;

    let own_company = if user.role == ROLE_CLIENT {
        user_company_id(pool, user.user_id).await?
    } else {
        None
    };

    if can_access_company(&user.role, user.user_id, own_company, &company) {
        Ok(company)
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this company".into(),
        )))
    }
}

/// The company a client user belongs to; 403 when none is assigned.
pub async fn require_client_company(pool: &DbPool, user: &AuthUser) -> AppResult<DbId> {
    user_company_id(pool, user.user_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "No company is assigned to this account".into(),
        ))
    })
}

async fn user_company_id(pool: &DbPool, user_id: DbId) -> AppResult<Option<DbId>> {
    let user = UserRepo::find_by_id(pool, user_id)
        .await?
        .ok_or(CoreError::Unauthorized("User no longer exists".into()))?;
    Ok(user.company_id)
}
