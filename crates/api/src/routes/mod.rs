pub mod admin;
pub mod auth;
pub mod chat;
pub mod client;
pub mod companies;
pub mod health;
pub mod notification;
pub mod rep;
pub mod tickets;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /me                                              current user + company
///
/// /admin/users, /admin/roles                       user management (admin)
/// /admin/companies                                 company management (admin)
/// /admin/ga-accounts, /admin/social-profiles       analytics sources (admin)
/// /admin/sync/...                                  vendor pulls (admin)
/// /admin/direct-mail/{company_id}                  drop import (admin)
///
/// /rep/companies, /rep/tickets, /rep/mailgun/send  staff views
/// /client/company                                  client's own company
///
/// /companies/{id}/metrics/{channel}                dashboards (scoped)
/// /companies/{id}/campaigns                        email campaigns (scoped)
///
/// /tickets                                         support tickets (scoped)
/// /chat/conversations                              analytics assistant
/// /notifications                                   in-app notifications
///
/// /webhooks/sendgrid                               event webhook (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(auth::me_router())
        .nest("/admin", admin::router())
        .nest("/rep", rep::router())
        .nest("/client", client::router())
        .nest("/companies", companies::router())
        .nest("/tickets", tickets::router())
        .nest("/chat", chat::router())
        .nest("/notifications", notification::router())
        .nest("/webhooks", webhooks::router())
}
