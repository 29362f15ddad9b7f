//! Repository for the `mailgun_sends` audit table.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::mailgun_send::{CreateMailgunSend, MailgunSend};

const COLUMNS: &str = "id, company_id, sent_by, recipient, subject, vendor_message_id, \
                        status, error, created_at";

pub struct MailgunSendRepo;

impl MailgunSendRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateMailgunSend,
    ) -> Result<MailgunSend, sqlx::Error> {
        let query = format!(
            "INSERT INTO mailgun_sends
                (company_id, sent_by, recipient, subject, vendor_message_id, status, error)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MailgunSend>(&query)
            .bind(input.company_id)
            .bind(input.sent_by)
            .bind(&input.recipient)
            .bind(&input.subject)
            .bind(&input.vendor_message_id)
            .bind(&input.status)
            .bind(&input.error)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_company(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MailgunSend>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mailgun_sends
             WHERE company_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MailgunSend>(&query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
