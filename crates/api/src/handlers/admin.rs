//! Handlers for `/admin/users` and `/admin/roles`.
//!
//! Every handler requires the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::error::CoreError;
use beacon_core::roles::ROLE_CLIENT;
use beacon_core::types::DbId;
use beacon_db::models::role::Role;
use beacon_db::models::user::{CreateUser, UpdateUser, UserFilter, UserResponse};
use beacon_db::repositories::{CompanyRepo, RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{check_password_policy, hash_password};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Role name, e.g. `account_rep`.
    pub role: String,
    /// Required when `role` is `client`.
    pub company_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company_id: Option<DbId>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub company_id: Option<DbId>,
    /// Include deactivated users. Defaults to `false`.
    pub include_inactive: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let username = required(&input.username, "username")?;
    let email = required(&input.email, "email")?;
    check_password_policy(&input.password)?;

    let role = role_by_name(&state, &input.role).await?;
    if role.name == ROLE_CLIENT && input.company_id.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "Client users must belong to a company".into(),
        )));
    }
    if let Some(company_id) = input.company_id {
        ensure_company_exists(&state, company_id).await?;
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email,
            password_hash,
            role_id: role.id,
            company_id: input.company_id,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, role = %role.name, created_by = admin.user_id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(UserResponse::from(&user))),
    ))
}

/// GET /api/v1/admin/users?role=&company_id=&include_inactive=
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListQuery>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let filter = UserFilter {
        role: params.role.map(|r| r.trim().to_string()),
        company_id: params.company_id,
        include_inactive: params.include_inactive.unwrap_or(false),
    };
    let users = UserRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse::new(
        users.iter().map(UserResponse::from).collect(),
    )))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role_id = match input.role.as_deref() {
        Some(name) => Some(role_by_name(&state, name).await?.id),
        None => None,
    };
    if let Some(company_id) = input.company_id {
        ensure_company_exists(&state, company_id).await?;
    }

    let update = UpdateUser {
        username: input.username.map(|s| s.trim().to_string()),
        email: input.email.map(|s| s.trim().to_string()),
        role_id,
        company_id: input.company_id,
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft delete: the row stays, `is_active` goes false, sessions are revoked.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("You cannot deactivate yourself".into()));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: "User", id }.into());
    }
    SessionRepo::revoke_for_user(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Also lifts a login lockout and signs the user out everywhere.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    check_password_policy(&input.new_password)?;
    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::set_password(&state.pool, id, &hashed).await? {
        return Err(CoreError::NotFound { entity: "User", id }.into());
    }
    SessionRepo::revoke_for_user(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    Ok(Json(DataResponse::new(RoleRepo::list(&state.pool).await?)))
}

async fn role_by_name(state: &AppState, name: &str) -> AppResult<Role> {
    RoleRepo::find_by_name(&state.pool, name.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role '{name}'"))))
}

async fn ensure_company_exists(state: &AppState, company_id: DbId) -> AppResult<()> {
    CompanyRepo::find_by_id(&state.pool, company_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Company {company_id} does not exist"
            )))
        })?;
    Ok(())
}

/// Trimmed, non-empty value of a required text field.
pub(crate) fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must not be empty"
        ))));
    }
    Ok(trimmed.to_string())
}
