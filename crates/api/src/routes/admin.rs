//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, companies, integrations, sync};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                        -> list_users
/// POST   /users                        -> create_user
/// GET    /users/{id}                   -> get_user
/// PUT    /users/{id}                   -> update_user
/// DELETE /users/{id}                   -> deactivate_user
/// POST   /users/{id}/reset-password    -> reset_password
/// GET    /roles                        -> list_roles
///
/// GET    /companies                    -> list_companies
/// POST   /companies                    -> create_company
/// GET    /companies/{id}               -> get_company
/// PUT    /companies/{id}               -> update_company
/// DELETE /companies/{id}               -> deactivate_company
///
/// GET    /ga-accounts                  -> list_ga_accounts
/// POST   /ga-accounts                  -> create_ga_account
/// PUT    /ga-accounts/{id}             -> update_ga_account
/// DELETE /ga-accounts/{id}             -> delete_ga_account
/// GET    /social-profiles              -> list_social_profiles
/// POST   /social-profiles              -> create_social_profile
/// DELETE /social-profiles/{id}         -> delete_social_profile
///
/// POST   /sync/single-sends            -> run_single_sends_sync
/// POST   /sync/ga/{company_id}         -> sync_ga
/// POST   /sync/social/{company_id}     -> sync_social
/// POST   /direct-mail/{company_id}     -> import_direct_mail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Users and roles
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route("/roles", get(admin::list_roles))
        // Companies
        .route(
            "/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/companies/{id}",
            get(companies::get_company)
                .put(companies::update_company)
                .delete(companies::deactivate_company),
        )
        // Analytics sources
        .route(
            "/ga-accounts",
            get(integrations::list_ga_accounts).post(integrations::create_ga_account),
        )
        .route(
            "/ga-accounts/{id}",
            put(integrations::update_ga_account).delete(integrations::delete_ga_account),
        )
        .route(
            "/social-profiles",
            get(integrations::list_social_profiles).post(integrations::create_social_profile),
        )
        .route(
            "/social-profiles/{id}",
            axum::routing::delete(integrations::delete_social_profile),
        )
        // Data pulls
        .route("/sync/single-sends", post(sync::run_single_sends_sync))
        .route("/sync/ga/{company_id}", post(sync::sync_ga))
        .route("/sync/social/{company_id}", post(sync::sync_social))
        .route("/direct-mail/{company_id}", post(sync::import_direct_mail))
}
