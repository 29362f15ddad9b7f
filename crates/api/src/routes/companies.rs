//! Route definitions for the company dashboards under `/companies`.

use axum::routing::get;
use axum::Router;

use crate::handlers::metrics;
use crate::state::AppState;

/// Routes mounted at `/companies`. Access is scoped per company.
///
/// ```text
/// GET /{id}/metrics/ga            -> ga_metrics
/// GET /{id}/metrics/social        -> social_metrics
/// GET /{id}/metrics/email         -> email_metrics
/// GET /{id}/metrics/direct-mail   -> direct_mail_metrics
/// GET /{id}/campaigns             -> list_campaigns
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/metrics/ga", get(metrics::ga_metrics))
        .route("/{id}/metrics/social", get(metrics::social_metrics))
        .route("/{id}/metrics/email", get(metrics::email_metrics))
        .route("/{id}/metrics/direct-mail", get(metrics::direct_mail_metrics))
        .route("/{id}/campaigns", get(metrics::list_campaigns))
}
