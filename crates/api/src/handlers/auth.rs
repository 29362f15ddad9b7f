//! Handlers for `/auth` (login, refresh, logout) and `/me`.

use axum::extract::State;
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use beacon_core::error::CoreError;
use beacon_db::models::company::Company;
use beacon_db::models::session::NewRefreshSession;
use beacon_db::models::user::{User, UserResponse};
use beacon_db::repositories::{CompanyRepo, SessionRepo, UserRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{encode_access_token, hash_refresh_token, RefreshToken};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, SESSION_COOKIE};
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failures that lock an account.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a locked account stays locked.
pub const LOCK_DURATION_MINS: i64 = 15;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    /// The client's own company; `None` for staff.
    pub company: Option<Company>,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

/// POST /api/v1/auth/login
///
/// Also sets the session cookie so browser clients need not handle the
/// bearer token themselves.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    let now = Utc::now();
    if user.is_locked(now) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        let lock_until = now + chrono::Duration::minutes(LOCK_DURATION_MINS);
        if let Some(until) =
            UserRepo::record_failed_login(&state.pool, user.id, MAX_FAILED_ATTEMPTS, lock_until)
                .await?
        {
            tracing::warn!(user_id = user.id, %until, "Account locked after failed logins");
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_login(&state.pool, user.id).await?;
    let response = issue_session(&state, &user, user_agent(&headers)).await?;
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        response.access_token, response.expires_in
    );
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(response)))
}

/// POST /api/v1/auth/refresh
///
/// Refresh tokens are single use: the presented one is consumed and a new
/// pair is issued. Presenting a used token is 401.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let hash = hash_refresh_token(input.refresh_token.trim());
    let session = SessionRepo::consume(&state.pool, &hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account is not active".into())))?;

    Ok(Json(issue_session(&state, &user, user_agent(&headers)).await?))
}

/// POST /api/v1/auth/logout
///
/// Revokes every session of the caller and clears the cookie. 204.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let revoked = SessionRepo::revoke_for_user(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, revoked, "User logged out");
    let clear = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, clear)])))
}

/// GET /api/v1/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    let company = match user.company_id {
        Some(id) => CompanyRepo::find_by_id(&state.pool, id).await?,
        None => None,
    };

    Ok(Json(DataResponse::new(MeResponse {
        user: UserResponse::from(&user),
        company,
    })))
}

/// Mint an access token and a refresh token, persisting the refresh hash.
async fn issue_session(
    state: &AppState,
    user: &User,
    user_agent: Option<&str>,
) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = encode_access_token(user.id, &user.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = RefreshToken::generate();
    SessionRepo::create(
        &state.pool,
        &NewRefreshSession {
            user_id: user.id,
            token_hash: &refresh.hash,
            user_agent,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: jwt.access_ttl_secs(),
        user: UserResponse::from(user),
    })
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
}
