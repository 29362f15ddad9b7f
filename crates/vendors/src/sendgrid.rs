//! SendGrid marketing API: single-send listing and event webhook payloads.
//!
//! The single-sends listing has changed shape across API versions. The body
//! may be a bare array or an object wrapping `result`/`results`, and the
//! next page may be advertised as a `_metadata.next` URL, a
//! `next_page_token`, or a `cursor`/`next_cursor`. [`parse_single_send_page`]
//! folds all of these into one [`SingleSendPage`].

use beacon_core::types::Timestamp;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{parse_response, VendorError};
use crate::lenient;
use crate::{env_nonempty, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

/// Page size requested from the listing endpoint unless overridden.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Query parameter the listing uses for its continuation token.
const PAGE_TOKEN_PARAM: &str = "page_token";

// ---------------------------------------------------------------------------
// Config / client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    pub base_url: String,
}

impl SendGridConfig {
    /// Load from `SENDGRID_API_KEY` (required) and `SENDGRID_BASE_URL`.
    pub fn from_env() -> Option<Self> {
        let api_key = env_nonempty("SENDGRID_API_KEY")?;
        let base_url = env_nonempty("SENDGRID_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Some(Self {
            api_key,
            base_url: trim_base_url(base_url),
        })
    }
}

/// HTTP client for the SendGrid v3 API.
pub struct SendGridClient {
    client: reqwest::Client,
    config: SendGridConfig,
    page_size: u32,
}

impl SendGridClient {
    pub fn new(config: SendGridConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: SendGridConfig) -> Self {
        Self {
            client,
            config,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch one page of single sends.
    ///
    /// `cursor` is whatever the previous page returned as `next`: either a
    /// continuation token or a full URL to follow as-is.
    pub async fn list_single_sends(
        &self,
        cursor: Option<&str>,
    ) -> Result<SingleSendPage, VendorError> {
        let request = match cursor {
            Some(next) if is_absolute_url(next) => self.client.get(next),
            Some(token) => self
                .client
                .get(self.listing_url())
                .query(&[("page_size", self.page_size.to_string())])
                .query(&[(PAGE_TOKEN_PARAM, token)]),
            None => self
                .client
                .get(self.listing_url())
                .query(&[("page_size", self.page_size.to_string())]),
        };

        let response = request.bearer_auth(&self.config.api_key).send().await?;
        let body: Value = parse_response(response).await?;
        let page = parse_single_send_page(body)?;
        tracing::debug!(
            items = page.items.len(),
            has_next = page.next.is_some(),
            "Fetched single sends page",
        );
        Ok(page)
    }

    fn listing_url(&self) -> String {
        format!("{}/v3/marketing/singlesends", self.config.base_url)
    }
}

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Single-send listing
// ---------------------------------------------------------------------------

/// One single send as listed by the vendor. Every field is optional; the
/// synchronizer decides which records are usable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SingleSendItem {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub send_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

/// A normalized listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SingleSendPage {
    pub items: Vec<SingleSendItem>,
    /// Continuation token or URL; `None` on the last page.
    pub next: Option<String>,
}

/// Normalize a raw listing body into a [`SingleSendPage`].
pub fn parse_single_send_page(body: Value) -> Result<SingleSendPage, VendorError> {
    let (raw_items, next) = match body {
        Value::Array(items) => (items, None),
        Value::Object(mut map) => {
            let next = next_cursor(&map);
            let items = match map.remove("result").or_else(|| map.remove("results")) {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(VendorError::Decode(format!(
                        "single sends result is not an array: {other}"
                    )))
                }
            };
            (items, next)
        }
        other => {
            return Err(VendorError::Decode(format!(
                "unexpected single sends body: {other}"
            )))
        }
    };

    let items = raw_items
        .into_iter()
        .map(|raw| serde_json::from_value(raw).unwrap_or_default())
        .collect();

    Ok(SingleSendPage { items, next })
}

fn next_cursor(map: &serde_json::Map<String, Value>) -> Option<String> {
    let metadata_next = map
        .get("_metadata")
        .and_then(|m| m.get("next"))
        .and_then(non_blank);
    if let Some(next) = metadata_next {
        return Some(page_token_from_url(&next).unwrap_or(next));
    }
    ["next_page_token", "next_cursor", "cursor"]
        .iter()
        .find_map(|key| map.get(*key).and_then(non_blank))
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extract the `page_token` query parameter from a next-page URL.
fn page_token_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == PAGE_TOKEN_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Parse an RFC 3339 vendor timestamp, ignoring anything malformed.
pub fn parse_vendor_timestamp(raw: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Event webhook
// ---------------------------------------------------------------------------

/// One delivery/engagement event posted to the event webhook.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VendorEvent {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub event: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    /// Unix seconds.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sg_message_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub singlesend_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub singlesend_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub marketing_campaign_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub marketing_campaign_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub category: Vec<String>,
}

impl VendorEvent {
    /// When the event happened, if the vendor said so.
    pub fn occurred_at(&self) -> Option<Timestamp> {
        self.timestamp
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }

    /// Candidate campaign external ids, in lookup order.
    pub fn campaign_ids(&self) -> impl Iterator<Item = &str> {
        [&self.singlesend_id, &self.marketing_campaign_id]
            .into_iter()
            .filter_map(|v| v.as_deref())
    }

    /// Candidate campaign names, in lookup order.
    pub fn campaign_names(&self) -> impl Iterator<Item = &str> {
        [&self.singlesend_name, &self.marketing_campaign_name]
            .into_iter()
            .filter_map(|v| v.as_deref())
    }
}

/// Decode a webhook body into events.
///
/// The body is normally an array; a single object is accepted as a batch of
/// one. Entries that are not objects decode to an empty event, which the
/// reconciler then skips, so one malformed entry never rejects the batch.
pub fn parse_event_batch(body: Value) -> Result<Vec<VendorEvent>, VendorError> {
    let raw = match body {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(VendorError::Decode(format!(
                "webhook body is not an event array: {other}"
            )))
        }
    };
    Ok(raw
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .collect())
}
