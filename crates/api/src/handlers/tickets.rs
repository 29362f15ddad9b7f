//! Support tickets: `/tickets` for every role and the staff triage views
//! under `/rep/tickets`.
//!
//! Clients only ever see their own company's tickets. Account reps see the
//! tickets of companies assigned to them, admins see everything.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::error::CoreError;
use beacon_core::roles::ROLE_CLIENT;
use beacon_core::tickets::{validate_transition, TicketPriority, TicketStatus};
use beacon_core::types::DbId;
use beacon_db::models::company::Company;
use beacon_db::models::notification::{
    CreateNotification, KIND_TICKET_ASSIGNED, KIND_TICKET_COMMENT, KIND_TICKET_CREATED,
    KIND_TICKET_STATUS,
};
use beacon_db::models::ticket::{
    CreateTicket, CreateTicketComment, Ticket, TicketComment, UpdateTicket,
};
use beacon_db::repositories::ticket_repo::TicketFilter;
use beacon_db::repositories::TicketRepo;
use serde::{Deserialize, Serialize};

use crate::access::{authorize_company, require_client_company};
use crate::error::{AppError, AppResult};
use crate::handlers::admin::required;
use crate::handlers::companies::ensure_staff_user;
use crate::handlers::notification::notify;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub company_id: Option<DbId>,
    pub status: Option<String>,
    /// Staff views only.
    pub assigned_to: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TicketQuery {
    fn page(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    /// Ignored for clients, who always file against their own company.
    pub company_id: Option<DbId>,
    pub subject: String,
    pub body: String,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub status: Option<String>,
    pub assigned_to: Option<DbId>,
    pub priority: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub comments: Vec<TicketComment>,
}

// ---------------------------------------------------------------------------
// Shared views
// ---------------------------------------------------------------------------

/// GET /api/v1/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TicketQuery>,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    let mut filter = TicketFilter {
        company_id: params.company_id,
        status: status_filter(params.status.as_deref())?,
        ..Default::default()
    };
    if user.role == ROLE_CLIENT {
        filter.company_id = Some(require_client_company(&state.pool, &user).await?);
    } else {
        filter.assigned_to = params.assigned_to;
        if !user.is_admin() {
            filter.rep_id = Some(user.user_id);
        }
    }

    let tickets = TicketRepo::list(
        &state.pool,
        &filter,
        params.page().limit(),
        params.page().offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(tickets)))
}

/// POST /api/v1/tickets
///
/// Notifies the company's account rep, if one is assigned.
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Ticket>>)> {
    let company_id = if user.role == ROLE_CLIENT {
        require_client_company(&state.pool, &user).await?
    } else {
        input.company_id.ok_or_else(|| {
            AppError::Core(CoreError::Validation("company_id is required".into()))
        })?
    };
    let company = authorize_company(&state.pool, &user, company_id).await?;

    let priority = match input.priority.as_deref() {
        Some(p) => TicketPriority::parse(p)?,
        None => TicketPriority::Normal,
    };
    let ticket = TicketRepo::create(
        &state.pool,
        &CreateTicket {
            company_id,
            created_by: user.user_id,
            subject: required(&input.subject, "subject")?,
            body: required(&input.body, "body")?,
            priority: priority.as_str().to_string(),
        },
    )
    .await?;
    tracing::info!(ticket_id = ticket.id, company_id, created_by = user.user_id, "Ticket created");

    if let Some(rep_id) = company.account_rep_id.filter(|&id| id != user.user_id) {
        notify(
            &state.pool,
            CreateNotification {
                user_id: rep_id,
                kind: KIND_TICKET_CREATED,
                title: format!("New ticket from {}", company.name),
                body: ticket.subject.clone(),
                link: Some(ticket_link(ticket.id)),
            },
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse::new(ticket))))
}

/// GET /api/v1/tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketDetail>>> {
    let (ticket, _) = load_ticket(&state, &user, id).await?;
    let comments = TicketRepo::list_comments(&state.pool, id).await?;
    Ok(Json(DataResponse::new(TicketDetail { ticket, comments })))
}

/// GET /api/v1/tickets/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TicketComment>>>> {
    load_ticket(&state, &user, id).await?;
    let comments = TicketRepo::list_comments(&state.pool, id).await?;
    Ok(Json(DataResponse::new(comments)))
}

/// POST /api/v1/tickets/{id}/comments
///
/// A comment from the ticket's creator goes to the assignee (or the
/// company's rep while unassigned); anyone else's comment goes to the
/// creator.
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTicketComment>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketComment>>)> {
    let (ticket, company) = load_ticket(&state, &user, id).await?;
    let body = required(&input.body, "body")?;
    let comment = TicketRepo::add_comment(&state.pool, id, user.user_id, &body).await?;

    let recipient = if user.user_id == ticket.created_by {
        ticket.assigned_to.or(company.account_rep_id)
    } else {
        Some(ticket.created_by)
    };
    if let Some(recipient) = recipient.filter(|&r| r != user.user_id) {
        notify(
            &state.pool,
            CreateNotification {
                user_id: recipient,
                kind: KIND_TICKET_COMMENT,
                title: format!("New comment on \"{}\"", ticket.subject),
                body,
                link: Some(ticket_link(id)),
            },
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse::new(comment))))
}

// ---------------------------------------------------------------------------
// Staff triage
// ---------------------------------------------------------------------------

/// GET /api/v1/rep/tickets
pub async fn rep_list_tickets(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(params): Query<TicketQuery>,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    let filter = TicketFilter {
        company_id: params.company_id,
        rep_id: (!user.is_admin()).then_some(user.user_id),
        assigned_to: params.assigned_to,
        status: status_filter(params.status.as_deref())?,
    };
    let tickets = TicketRepo::list(
        &state.pool,
        &filter,
        params.page().limit(),
        params.page().offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(tickets)))
}

/// PATCH /api/v1/rep/tickets/{id}
///
/// Status changes must follow the ticket lifecycle; an invalid move is 400.
/// A new assignee is notified, and so is the creator on a status change.
pub async fn rep_update_ticket(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<TriageRequest>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let (ticket, _) = load_ticket(&state, &user, id).await?;

    let mut update = UpdateTicket::default();
    if let Some(status) = input.status.as_deref() {
        let from = TicketStatus::parse(&ticket.status)?;
        let to = TicketStatus::parse(status)?;
        validate_transition(from, to)?;
        update.status = Some(to.as_str().to_string());
    }
    if let Some(priority) = input.priority.as_deref() {
        update.priority = Some(TicketPriority::parse(priority)?.as_str().to_string());
    }
    if let Some(assignee) = input.assigned_to {
        ensure_staff_user(&state, assignee).await?;
        update.assigned_to = Some(assignee);
    }

    let updated = TicketRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound { entity: "Ticket", id })?;
    tracing::info!(
        ticket_id = id,
        status = %updated.status,
        assigned_to = ?updated.assigned_to,
        updated_by = user.user_id,
        "Ticket updated",
    );

    if let Some(assignee) = update
        .assigned_to
        .filter(|&a| Some(a) != ticket.assigned_to && a != user.user_id)
    {
        notify(
            &state.pool,
            CreateNotification {
                user_id: assignee,
                kind: KIND_TICKET_ASSIGNED,
                title: "Ticket assigned to you".into(),
                body: updated.subject.clone(),
                link: Some(ticket_link(id)),
            },
        )
        .await;
    }
    if updated.status != ticket.status && ticket.created_by != user.user_id {
        notify(
            &state.pool,
            CreateNotification {
                user_id: ticket.created_by,
                kind: KIND_TICKET_STATUS,
                title: format!("Ticket is now {}", updated.status),
                body: updated.subject.clone(),
                link: Some(ticket_link(id)),
            },
        )
        .await;
    }

    Ok(Json(DataResponse::new(updated)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a ticket and check the caller may see its company.
async fn load_ticket(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<(Ticket, Company)> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Ticket", id })?;
    let company = authorize_company(&state.pool, user, ticket.company_id).await?;
    Ok((ticket, company))
}

fn status_filter(status: Option<&str>) -> Result<Option<String>, CoreError> {
    status
        .map(|s| TicketStatus::parse(s).map(|s| s.as_str().to_string()))
        .transpose()
}

fn ticket_link(id: DbId) -> String {
    format!("/tickets/{id}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_filter_normalizes_known_values() {
        assert_eq!(status_filter(None).unwrap(), None);
        assert_eq!(
            status_filter(Some("in_progress")).unwrap().as_deref(),
            Some("in_progress")
        );
    }

    #[test]
    fn status_filter_rejects_unknown_values() {
        assert_matches!(status_filter(Some("pending")), Err(CoreError::Validation(_)));
    }
}
