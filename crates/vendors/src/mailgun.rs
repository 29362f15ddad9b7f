//! Mailgun transactional sends.

use serde::Deserialize;

use crate::error::{parse_response, VendorError};
use crate::{env_nonempty, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "https://api.mailgun.net";

#[derive(Debug, Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    pub domain: String,
    pub base_url: String,
    /// `From:` header used for every message.
    pub from: String,
}

impl MailgunConfig {
    /// Load from `MAILGUN_API_KEY` and `MAILGUN_DOMAIN` (both required),
    /// plus optional `MAILGUN_FROM` and `MAILGUN_BASE_URL`.
    pub fn from_env() -> Option<Self> {
        let api_key = env_nonempty("MAILGUN_API_KEY")?;
        let domain = env_nonempty("MAILGUN_DOMAIN")?;
        let from = env_nonempty("MAILGUN_FROM").unwrap_or_else(|| format!("Beacon <no-reply@{domain}>"));
        let base_url = env_nonempty("MAILGUN_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Some(Self {
            api_key,
            domain,
            base_url: trim_base_url(base_url),
            from,
        })
    }
}

/// A message to hand to Mailgun.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

pub struct MailgunClient {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunClient {
    pub fn new(config: MailgunConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: MailgunConfig) -> Self {
        Self { client, config }
    }

    /// Queue a message, returning the vendor message id.
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<String, VendorError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("from", self.config.from.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.text.as_str()),
        ];
        if let Some(html) = &message.html {
            form.push(("html", html.as_str()));
        }
        for tag in &message.tags {
            form.push(("o:tag", tag.as_str()));
        }

        let response = self
            .client
            .post(format!(
                "{}/v3/{}/messages",
                self.config.base_url, self.config.domain
            ))
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await?;

        let body: SendResponse = parse_response(response).await?;
        body.id
            .as_deref()
            .map(clean_message_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| VendorError::Decode("send response has no message id".into()))
    }
}

/// Mailgun wraps message ids in angle brackets.
fn clean_message_id(raw: &str) -> String {
    raw.trim().trim_start_matches('<').trim_end_matches('>').to_string()
}
