//! Company management (`/admin/companies`) and the role-scoped company
//! views (`/rep/companies`, `/client/company`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::error::CoreError;
use beacon_core::roles::is_staff;
use beacon_core::types::DbId;
use beacon_db::models::company::{Company, CreateCompany, UpdateCompany};
use beacon_db::repositories::{CompanyRepo, UserRepo};
use serde::Deserialize;

use crate::access::require_client_company;
use crate::error::{AppError, AppResult};
use crate::handlers::admin::required;
use crate::middleware::rbac::{RequireAdmin, RequireClient, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    pub name: String,
    pub website: Option<String>,
    pub account_rep_id: Option<DbId>,
    pub email_category: Option<String>,
}

/// POST /api/v1/admin/companies
pub async fn create_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CompanyRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Company>>)> {
    if let Some(rep_id) = input.account_rep_id {
        ensure_staff_user(&state, rep_id).await?;
    }
    let create = CreateCompany {
        name: required(&input.name, "name")?,
        website: non_blank(input.website),
        account_rep_id: input.account_rep_id,
        email_category: non_blank(input.email_category),
    };
    let company = CompanyRepo::create(&state.pool, &create).await?;
    tracing::info!(company_id = company.id, name = %company.name, "Company created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(company))))
}

/// GET /api/v1/admin/companies
pub async fn list_companies(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Company>>>> {
    Ok(Json(DataResponse::new(CompanyRepo::list(&state.pool).await?)))
}

/// GET /api/v1/admin/companies/{id}
pub async fn get_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Company>>> {
    let company = CompanyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Company", id })?;
    Ok(Json(DataResponse::new(company)))
}

/// PUT /api/v1/admin/companies/{id}
pub async fn update_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCompany>,
) -> AppResult<Json<DataResponse<Company>>> {
    if let Some(rep_id) = input.account_rep_id {
        ensure_staff_user(&state, rep_id).await?;
    }
    let company = CompanyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound { entity: "Company", id })?;
    Ok(Json(DataResponse::new(company)))
}

/// DELETE /api/v1/admin/companies/{id}
///
/// Soft delete; metrics and campaigns stay attached.
pub async fn deactivate_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CompanyRepo::deactivate(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "Company", id }.into())
    }
}

/// GET /api/v1/rep/companies
///
/// Admins get every company, account reps the ones assigned to them.
pub async fn rep_companies(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<Company>>>> {
    let companies = if user.is_admin() {
        CompanyRepo::list(&state.pool).await?
    } else {
        CompanyRepo::list_for_rep(&state.pool, user.user_id).await?
    };
    Ok(Json(DataResponse::new(companies)))
}

/// GET /api/v1/client/company
pub async fn client_company(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
) -> AppResult<Json<DataResponse<Company>>> {
    let company_id = require_client_company(&state.pool, &user).await?;
    let company = CompanyRepo::find_by_id(&state.pool, company_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Company",
            id: company_id,
        })?;
    Ok(Json(DataResponse::new(company)))
}

/// An account rep must be an existing staff user.
pub(crate) async fn ensure_staff_user(state: &AppState, user_id: DbId) -> AppResult<()> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "User {user_id} does not exist"
            )))
        })?;
    if !is_staff(&user.role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {user_id} is not a staff member"
        ))));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
