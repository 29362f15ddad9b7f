//! Route definitions for `/client`.

use axum::routing::get;
use axum::Router;

use crate::handlers::companies;
use crate::state::AppState;

/// ```text
/// GET /company   -> client_company
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/company", get(companies::client_company))
}
