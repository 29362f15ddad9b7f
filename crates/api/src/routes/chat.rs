//! Route definitions for the `/chat` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`.
///
/// ```text
/// GET    /conversations                  -> list_conversations
/// POST   /conversations                  -> create_conversation
/// GET    /conversations/{id}             -> get_conversation
/// DELETE /conversations/{id}             -> delete_conversation
/// POST   /conversations/{id}/messages    -> post_message
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(chat::list_conversations).post(chat::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(chat::get_conversation).delete(chat::delete_conversation),
        )
        .route("/conversations/{id}/messages", post(chat::post_message))
}
