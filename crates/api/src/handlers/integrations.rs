//! Admin links between companies and their analytics sources:
//! `/admin/ga-accounts` and `/admin/social-profiles`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::error::CoreError;
use beacon_core::types::DbId;
use beacon_db::models::ga::{CreateGaAccount, GaAccount, UpdateGaAccount};
use beacon_db::models::social::{CreateSocialProfile, SocialProfile};
use beacon_db::repositories::{CompanyRepo, GaAccountRepo, SocialProfileRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::admin::required;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// `?company_id=` filter for the list endpoints.
#[derive(Debug, Deserialize)]
pub struct CompanyFilter {
    pub company_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// GA accounts
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/ga-accounts
pub async fn list_ga_accounts(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filter): Query<CompanyFilter>,
) -> AppResult<Json<DataResponse<Vec<GaAccount>>>> {
    let accounts = GaAccountRepo::list(&state.pool, filter.company_id).await?;
    Ok(Json(DataResponse::new(accounts)))
}

/// POST /api/v1/admin/ga-accounts
pub async fn create_ga_account(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateGaAccount>,
) -> AppResult<(StatusCode, Json<DataResponse<GaAccount>>)> {
    ensure_company(&state, input.company_id).await?;
    let create = CreateGaAccount {
        company_id: input.company_id,
        property_id: required(&input.property_id, "property_id")?,
        display_name: required(&input.display_name, "display_name")?,
    };
    let account = GaAccountRepo::create(&state.pool, &create).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(account))))
}

/// PUT /api/v1/admin/ga-accounts/{id}
pub async fn update_ga_account(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGaAccount>,
) -> AppResult<Json<DataResponse<GaAccount>>> {
    let account = GaAccountRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "GaAccount",
            id,
        })?;
    Ok(Json(DataResponse::new(account)))
}

/// DELETE /api/v1/admin/ga-accounts/{id}
///
/// Hard delete; the account's daily rows cascade.
pub async fn delete_ga_account(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if GaAccountRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "GaAccount",
            id,
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Social profiles
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/social-profiles
pub async fn list_social_profiles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filter): Query<CompanyFilter>,
) -> AppResult<Json<DataResponse<Vec<SocialProfile>>>> {
    let profiles = SocialProfileRepo::list(&state.pool, filter.company_id).await?;
    Ok(Json(DataResponse::new(profiles)))
}

/// POST /api/v1/admin/social-profiles
pub async fn create_social_profile(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateSocialProfile>,
) -> AppResult<(StatusCode, Json<DataResponse<SocialProfile>>)> {
    ensure_company(&state, input.company_id).await?;
    let create = CreateSocialProfile {
        company_id: input.company_id,
        sprout_profile_id: input.sprout_profile_id,
        network: required(&input.network, "network")?.to_ascii_lowercase(),
        name: required(&input.name, "name")?,
    };
    let profile = SocialProfileRepo::create(&state.pool, &create).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(profile))))
}

/// DELETE /api/v1/admin/social-profiles/{id}
pub async fn delete_social_profile(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SocialProfileRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "SocialProfile",
            id,
        }
        .into())
    }
}

async fn ensure_company(state: &AppState, company_id: DbId) -> AppResult<()> {
    match CompanyRepo::find_by_id(&state.pool, company_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Core(CoreError::Validation(format!(
            "Company {company_id} does not exist"
        )))),
    }
}
