//! Route definitions for `/webhooks`. No session is required; callers
//! authenticate with the shared token, when one is configured.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// ```text
/// POST /sendgrid?token=    -> sendgrid_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/sendgrid", post(webhooks::sendgrid_events))
}
