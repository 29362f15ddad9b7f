//! Repository for the `email_recipients` table.
//!
//! The `message_id` column was added by a later migration. Statements that
//! touch it take a `with_message_id` switch so callers can keep working
//! against a database where that migration is missing; the read
//! `COLUMNS` list never includes it.

use beacon_core::email_events::EmailEventKind;
use beacon_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::email_recipient::EmailRecipient;

const COLUMNS: &str = "id, campaign_id, email, delivered_count, open_count, click_count, \
                        bounce_count, spam_count, unsubscribe_count, last_event_type, \
                        last_event_at, created_at, updated_at";

pub struct EmailRecipientRepo;

impl EmailRecipientRepo {
    /// Find a recipient by normalized vendor message id.
    ///
    /// Fails with SQLSTATE `42703` when the `message_id` column is absent.
    pub async fn find_by_message_id(
        pool: &PgPool,
        message_id: &str,
    ) -> Result<Option<EmailRecipient>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_recipients
             WHERE message_id = $1
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, EmailRecipient>(&query)
            .bind(message_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_campaign_email(
        pool: &PgPool,
        campaign_id: DbId,
        email: &str,
    ) -> Result<Option<EmailRecipient>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_recipients WHERE campaign_id = $1 AND email = $2"
        );
        sqlx::query_as::<_, EmailRecipient>(&query)
            .bind(campaign_id)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Create a recipient with the counter for `kind` at 1.
    ///
    /// Fails with SQLSTATE `23505` if `(campaign_id, email)` already exists.
    pub async fn create(
        pool: &PgPool,
        campaign_id: DbId,
        email: &str,
        kind: EmailEventKind,
        at: Timestamp,
        message_id: Option<&str>,
        with_message_id: bool,
    ) -> Result<DbId, sqlx::Error> {
        let column = kind.counter_column();
        if with_message_id {
            let query = format!(
                "INSERT INTO email_recipients
                    (campaign_id, email, {column}, last_event_type, last_event_at, message_id)
                 VALUES ($1, $2, 1, $3, $4, $5)
                 RETURNING id"
            );
            sqlx::query_scalar(&query)
                .bind(campaign_id)
                .bind(email)
                .bind(kind.as_str())
                .bind(at)
                .bind(message_id)
                .fetch_one(pool)
                .await
        } else {
            let query = format!(
                "INSERT INTO email_recipients
                    (campaign_id, email, {column}, last_event_type, last_event_at)
                 VALUES ($1, $2, 1, $3, $4)
                 RETURNING id"
            );
            sqlx::query_scalar(&query)
                .bind(campaign_id)
                .bind(email)
                .bind(kind.as_str())
                .bind(at)
                .fetch_one(pool)
                .await
        }
    }

    /// Bump the counter for `kind` and stamp the last event.
    ///
    /// With `with_message_id`, a null `message_id` is backfilled.
    pub async fn increment(
        pool: &PgPool,
        id: DbId,
        kind: EmailEventKind,
        at: Timestamp,
        message_id: Option<&str>,
        with_message_id: bool,
    ) -> Result<bool, sqlx::Error> {
        let column = kind.counter_column();
        let result = if with_message_id {
            let query = format!(
                "UPDATE email_recipients SET
                    {column} = {column} + 1,
                    last_event_type = $2,
                    last_event_at = $3,
                    message_id = COALESCE(message_id, $4)
                 WHERE id = $1"
            );
            sqlx::query(&query)
                .bind(id)
                .bind(kind.as_str())
                .bind(at)
                .bind(message_id)
                .execute(pool)
                .await?
        } else {
            let query = format!(
                "UPDATE email_recipients SET
                    {column} = {column} + 1,
                    last_event_type = $2,
                    last_event_at = $3
                 WHERE id = $1"
            );
            sqlx::query(&query)
                .bind(id)
                .bind(kind.as_str())
                .bind(at)
                .execute(pool)
                .await?
        };
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<EmailRecipient>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_recipients WHERE campaign_id = $1 ORDER BY email ASC"
        );
        sqlx::query_as::<_, EmailRecipient>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }
}
