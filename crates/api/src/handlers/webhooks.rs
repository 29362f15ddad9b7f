//! Inbound vendor webhooks. These routes carry no user session.

use axum::extract::{Query, State};
use axum::Json;
use beacon_campaigns::ReconcileSummary;
use beacon_core::error::CoreError;
use beacon_vendors::sendgrid::parse_event_batch;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WebhookAuth {
    pub token: Option<String>,
}

/// POST /api/v1/webhooks/sendgrid?token=
///
/// Applies a SendGrid event batch to the recipient table. When
/// `SENDGRID_WEBHOOK_TOKEN` is set the `token` query parameter must match it.
/// Individual events that cannot be matched or stored are counted as
/// skipped; only a body that is not an event array is rejected.
pub async fn sendgrid_events(
    State(state): State<AppState>,
    Query(auth): Query<WebhookAuth>,
    Json(body): Json<Value>,
) -> AppResult<Json<DataResponse<ReconcileSummary>>> {
    if let Some(expected) = state.config.sendgrid_webhook_token.as_deref() {
        if auth.token.as_deref() != Some(expected) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid webhook token".into(),
            )));
        }
    }

    let events = parse_event_batch(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let summary = state.reconciler.reconcile(&state.pool, &events).await;
    tracing::info!(
        received = summary.received,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "SendGrid webhook batch reconciled",
    );
    Ok(Json(DataResponse::new(summary)))
}
