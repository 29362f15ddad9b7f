//! The analytics chat assistant under `/chat/conversations`.
//!
//! A conversation belongs to the user who created it; anyone else gets 404
//! for it. Posting a message stores it, asks the LLM for a reply grounded in
//! the attached company's recent numbers, and stores the reply.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::error::CoreError;
use beacon_core::metrics::DateRange;
use beacon_core::roles::ROLE_CLIENT;
use beacon_core::types::DbId;
use beacon_db::models::company::Company;
use beacon_db::models::conversation::{
    Conversation, ConversationMessage, MESSAGE_ROLE_ASSISTANT, MESSAGE_ROLE_SYSTEM,
    MESSAGE_ROLE_USER,
};
use beacon_db::repositories::ConversationRepo;
use beacon_vendors::llm::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::access::{authorize_company, require_client_company};
use crate::error::AppResult;
use crate::handlers::admin::required;
use crate::handlers::metrics::company_snapshot;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Messages of history sent with each completion request.
pub const CHAT_HISTORY_LIMIT: i64 = 20;

const DEFAULT_TITLE: &str = "New conversation";

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
    /// Company whose metrics ground the assistant. Clients default to their
    /// own company.
    pub company_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<ConversationMessage>,
}

#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub user_message: ConversationMessage,
    pub reply: ConversationMessage,
}

/// GET /api/v1/chat/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Conversation>>>> {
    let conversations =
        ConversationRepo::list_for_user(&state.pool, user.user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse::new(conversations)))
}

/// POST /api/v1/chat/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateConversationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Conversation>>)> {
    let company_id = match input.company_id {
        Some(id) => Some(authorize_company(&state.pool, &user, id).await?.id),
        None if user.role == ROLE_CLIENT => {
            Some(require_client_company(&state.pool, &user).await?)
        }
        None => None,
    };
    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);

    let conversation =
        ConversationRepo::create(&state.pool, user.user_id, company_id, title).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(conversation))))
}

/// GET /api/v1/chat/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ConversationDetail>>> {
    let conversation = load_owned(&state, &user, id).await?;
    let messages = ConversationRepo::list_messages(&state.pool, id).await?;
    Ok(Json(DataResponse::new(ConversationDetail {
        conversation,
        messages,
    })))
}

/// DELETE /api/v1/chat/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned(&state, &user, id).await?;
    ConversationRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chat/conversations/{id}/messages
///
/// 503 when no LLM is configured. Nothing is stored unless the company
/// context loads. When the LLM call fails the user's message stays stored
/// and the request fails with 502.
pub async fn post_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<PostMessageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ExchangeResponse>>)> {
    let conversation = load_owned(&state, &user, id).await?;
    let llm = state.llm()?;
    let content = required(&input.content, "content")?;

    let system_prompt = match conversation.company_id {
        Some(company_id) => {
            let company = authorize_company(&state.pool, &user, company_id).await?;
            let range = DateRange::resolve(None, None, chrono::Utc::now().date_naive())?;
            let snapshot = company_snapshot(&state, company_id, range).await?;
            build_system_prompt(Some((&company, range, &snapshot)))
        }
        None => build_system_prompt(None),
    };

    let user_message =
        ConversationRepo::add_message(&state.pool, id, MESSAGE_ROLE_USER, &content).await?;

    let history = ConversationRepo::recent_messages(&state.pool, id, CHAT_HISTORY_LIMIT).await?;
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::new(MESSAGE_ROLE_SYSTEM, system_prompt));
    messages.extend(
        history
            .iter()
            .filter(|m| m.role != MESSAGE_ROLE_SYSTEM)
            .map(|m| ChatMessage::new(m.role.as_str(), m.content.as_str())),
    );

    let reply_text = llm.complete(&messages).await?;
    let reply =
        ConversationRepo::add_message(&state.pool, id, MESSAGE_ROLE_ASSISTANT, &reply_text).await?;
    tracing::debug!(conversation_id = id, history = history.len(), "Chat reply stored");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ExchangeResponse {
            user_message,
            reply,
        })),
    ))
}

async fn load_owned(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Conversation> {
    ConversationRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.user_id == user.user_id)
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Conversation",
                id,
            }
            .into()
        })
}

/// System prompt for the assistant, with the company's metric totals when
/// the conversation is about one.
pub fn build_system_prompt(
    context: Option<(&Company, DateRange, &HashMap<&'static str, f64>)>,
) -> String {
    let mut prompt = String::from(
        "You are Beacon, a marketing analytics assistant for an agency and its clients. \
         Answer concisely and only from the figures you are given. \
         Say so when the data needed to answer is not available.",
    );
    if let Some((company, range, snapshot)) = context {
        prompt.push_str(&format!(
            "\n\nCompany: {}\nPeriod: {} to {}\n",
            company.name, range.start, range.end
        ));
        let mut keys: Vec<_> = snapshot.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            prompt.push_str(&format!("- {key}: {}\n", snapshot[key]));
        }
    }
    prompt
}
