//! Route definitions for the staff views under `/rep`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{companies, mailgun, tickets};
use crate::state::AppState;

/// Routes mounted at `/rep`. Admins and account reps only.
///
/// ```text
/// GET    /companies        -> rep_companies
/// GET    /tickets          -> rep_list_tickets
/// PATCH  /tickets/{id}     -> rep_update_ticket
/// POST   /mailgun/send     -> send_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(companies::rep_companies))
        .route("/tickets", get(tickets::rep_list_tickets))
        .route("/tickets/{id}", patch(tickets::rep_update_ticket))
        .route("/mailgun/send", post(mailgun::send_email))
}
