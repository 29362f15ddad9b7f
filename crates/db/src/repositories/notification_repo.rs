//! Repository for `notifications`. Every read and write is scoped to the
//! owning user.

use beacon_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification, NotificationFilter};

const COLUMNS: &str = "id, user_id, kind, title, body, link, is_read, read_at, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(pool: &PgPool, input: &CreateNotification) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (user_id, kind, title, body, link)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(input.kind)
        .bind(&input.title)
        .bind(&input.body)
        .bind(&input.link)
        .fetch_one(pool)
        .await
    }

    /// Newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &NotificationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1
               AND (NOT $2 OR NOT is_read)
               AND ($3::TEXT IS NULL OR kind = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(filter.unread_only)
            .bind(&filter.kind)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// `false` when the notification is not the user's or is already read.
    pub async fn mark_read(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = NOW()
             WHERE id = $1 AND user_id = $2 AND NOT is_read",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = NOW()
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Unread counts grouped by kind, alphabetical.
    pub async fn unread_by_kind(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT kind, COUNT(*)::BIGINT FROM notifications
             WHERE user_id = $1 AND NOT is_read
             GROUP BY kind
             ORDER BY kind",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete read notifications that were read before `cutoff`.
    pub async fn purge_read_before(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE is_read AND read_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
