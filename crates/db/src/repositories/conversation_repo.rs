//! Repository for chat `conversations` and `conversation_messages`.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::conversation::{Conversation, ConversationMessage};

const COLUMNS: &str = "id, user_id, company_id, title, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, conversation_id, role, content, created_at";

pub struct ConversationRepo;

impl ConversationRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        company_id: Option<DbId>,
        title: &str,
    ) -> Result<Conversation, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversations (user_id, company_id, title)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(user_id)
            .bind(company_id)
            .bind(title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's conversations, most recently active first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations
             WHERE user_id = $1
             ORDER BY updated_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a message and touch the conversation's `updated_at`.
    pub async fn add_message(
        pool: &PgPool,
        conversation_id: DbId,
        role: &str,
        content: &str,
    ) -> Result<ConversationMessage, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO conversation_messages (conversation_id, role, content)
             VALUES ($1, $2, $3)
             RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, ConversationMessage>(&query)
            .bind(conversation_id)
            .bind(role)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;
        sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(message)
    }

    /// Every message of a conversation in chronological order.
    pub async fn list_messages(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Vec<ConversationMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM conversation_messages
             WHERE conversation_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ConversationMessage>(&query)
            .bind(conversation_id)
            .fetch_all(pool)
            .await
    }

    /// The last `limit` messages, returned oldest first.
    pub async fn recent_messages(
        pool: &PgPool,
        conversation_id: DbId,
        limit: i64,
    ) -> Result<Vec<ConversationMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM (
                SELECT {MESSAGE_COLUMNS} FROM conversation_messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
             ) recent
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ConversationMessage>(&query)
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
