//! Repository for the `tickets` and `ticket_comments` tables.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{CreateTicket, Ticket, TicketComment, UpdateTicket};

const COLUMNS: &str = "id, company_id, created_by, assigned_to, subject, body, status, \
                        priority, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, ticket_id, author_id, body, created_at";

/// Optional filters for [`TicketRepo::list`]. `None` means "any".
#[derive(Debug, Default, Clone)]
pub struct TicketFilter {
    pub company_id: Option<DbId>,
    /// Restrict to companies whose account rep is this user.
    pub rep_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    pub status: Option<String>,
}

pub struct TicketRepo;

impl TicketRepo {
    pub async fn create(pool: &PgPool, input: &CreateTicket) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (company_id, created_by, subject, body, priority)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(input.company_id)
            .bind(input.created_by)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(&input.priority)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE ($1::BIGINT IS NULL OR company_id = $1)
               AND ($2::BIGINT IS NULL OR company_id IN
                    (SELECT id FROM companies WHERE account_rep_id = $2))
               AND ($3::BIGINT IS NULL OR assigned_to = $3)
               AND ($4::TEXT IS NULL OR status = $4)
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(filter.company_id)
            .bind(filter.rep_id)
            .bind(filter.assigned_to)
            .bind(&filter.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply the non-`None` fields of `input`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                assigned_to = COALESCE($2, assigned_to),
                status = COALESCE($3, status),
                priority = COALESCE($4, priority)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(input.assigned_to)
            .bind(&input.status)
            .bind(&input.priority)
            .fetch_optional(pool)
            .await
    }

    pub async fn add_comment(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<TicketComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_comments (ticket_id, author_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(ticket_id)
            .bind(author_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    pub async fn list_comments(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<TicketComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM ticket_comments
             WHERE ticket_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
