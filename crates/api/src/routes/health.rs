//! Liveness probe at `/health`, outside the versioned API.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` while the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Vendor integrations with credentials configured.
    pub integrations: Vec<&'static str>,
}

/// Always 200 so the process is not restarted for a database outage; the
/// body says whether the database answered.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match beacon_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };
    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        integrations: state.config.integrations.enabled(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
