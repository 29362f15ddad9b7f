//! Staff transactional email through Mailgun (`/rep/mailgun/send`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use beacon_core::email_events::normalize_email;
use beacon_core::error::CoreError;
use beacon_core::types::DbId;
use beacon_db::models::mailgun_send::{
    CreateMailgunSend, MailgunSend, SEND_STATUS_FAILED, SEND_STATUS_SENT,
};
use beacon_db::repositories::MailgunSendRepo;
use beacon_vendors::mailgun::OutgoingMessage;
use serde::Deserialize;

use crate::access::authorize_company;
use crate::error::{AppError, AppResult};
use crate::handlers::admin::required;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    /// Company the message is sent on behalf of; the caller needs access.
    pub company_id: Option<DbId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/v1/rep/mailgun/send
///
/// Every attempt is recorded in `mailgun_sends`. A vendor failure is stored
/// with status `failed` and surfaces as 502.
pub async fn send_email(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<SendEmailRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<MailgunSend>>)> {
    let to = normalize_email(&input.to).ok_or_else(|| {
        AppError::Core(CoreError::Validation("to must be an email address".into()))
    })?;
    let subject = required(&input.subject, "subject")?;
    let text = required(&input.text, "text")?;
    if let Some(company_id) = input.company_id {
        authorize_company(&state.pool, &user, company_id).await?;
    }
    let client = state.mailgun()?;

    let message = OutgoingMessage {
        to: to.clone(),
        subject: subject.clone(),
        text,
        html: input.html,
        tags: input.tags,
    };
    let outcome = client.send_message(&message).await;

    let mut record = CreateMailgunSend {
        company_id: input.company_id,
        sent_by: user.user_id,
        recipient: to,
        subject,
        vendor_message_id: None,
        status: SEND_STATUS_SENT.to_string(),
        error: None,
    };
    match outcome {
        Ok(message_id) => {
            record.vendor_message_id = Some(message_id);
            let send = MailgunSendRepo::create(&state.pool, &record).await?;
            tracing::info!(send_id = send.id, sent_by = user.user_id, "Mailgun message sent");
            Ok((StatusCode::CREATED, Json(DataResponse::new(send))))
        }
        Err(e) => {
            record.status = SEND_STATUS_FAILED.to_string();
            record.error = Some(e.to_string());
            MailgunSendRepo::create(&state.pool, &record).await?;
            Err(e.into())
        }
    }
}
