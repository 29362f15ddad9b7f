//! The caller's own in-app notifications under `/notifications`, plus
//! [`notify`] for handlers that raise them.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::error::CoreError;
use beacon_core::types::DbId;
use beacon_db::models::notification::{CreateNotification, Notification, NotificationFilter};
use beacon_db::repositories::NotificationRepo;
use beacon_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
    pub by_kind: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// GET /api/v1/notifications?unread_only=&kind=&limit=&offset=
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let filter = NotificationFilter {
        unread_only: params.unread_only,
        kind: params.kind,
    };
    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        user.user_id,
        &filter,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(notifications)))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let by_kind: BTreeMap<String, i64> = NotificationRepo::unread_by_kind(&state.pool, user.user_id)
        .await?
        .into_iter()
        .collect();
    let count = by_kind.values().sum();
    Ok(Json(DataResponse::new(UnreadCount { count, by_kind })))
}

/// POST /api/v1/notifications/{id}/read
///
/// 404 when the notification is someone else's or already read.
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::mark_read(&state.pool, user.user_id, id).await? {
        return Err(CoreError::NotFound {
            entity: "Notification",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = NotificationRepo::mark_all_read(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::new(MarkedRead { marked_read })))
}

/// DELETE /api/v1/notifications/{id}
pub async fn dismiss(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::delete(&state.pool, user.user_id, id).await? {
        return Err(CoreError::NotFound {
            entity: "Notification",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Store a notification for `notification.user_id`.
///
/// Best effort: a failure is logged and the triggering request still
/// succeeds.
pub async fn notify(pool: &DbPool, notification: CreateNotification) {
    if let Err(e) = NotificationRepo::create(pool, &notification).await {
        tracing::warn!(
            user_id = notification.user_id,
            kind = notification.kind,
            error = %e,
            "Failed to store notification",
        );
    }
}
