//! Email delivery/engagement event kinds and vendor tag mapping.
//!
//! Vendors report far more event types than the dashboard tracks. Only the
//! six kinds below have a per-recipient counter; everything else
//! (`processed`, `deferred`, ...) is ignored by the reconciler.

use serde::{Deserialize, Serialize};

/// An engagement event the recipient table keeps a counter for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailEventKind {
    Delivered,
    Open,
    Click,
    Bounce,
    Spam,
    Unsubscribe,
}

impl EmailEventKind {
    /// Map a vendor event tag to a tracked kind, case-insensitively.
    ///
    /// `dropped` and `blocked` are folded into [`Bounce`](Self::Bounce) and
    /// `group_unsubscribe` into [`Unsubscribe`](Self::Unsubscribe).
    pub fn from_vendor_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "delivered" => Some(Self::Delivered),
            "open" | "opened" => Some(Self::Open),
            "click" | "clicked" => Some(Self::Click),
            "bounce" | "bounced" | "dropped" | "blocked" => Some(Self::Bounce),
            "spamreport" | "spam_report" | "spam" => Some(Self::Spam),
            "unsubscribe" | "unsubscribed" | "group_unsubscribe" => Some(Self::Unsubscribe),
            _ => None,
        }
    }

    /// Name of the `email_recipients` counter column this kind increments.
    pub fn counter_column(self) -> &'static str {
        match self {
            Self::Delivered => "delivered_count",
            Self::Open => "open_count",
            Self::Click => "click_count",
            Self::Bounce => "bounce_count",
            Self::Spam => "spam_count",
            Self::Unsubscribe => "unsubscribe_count",
        }
    }

    /// Stable lowercase label stored in `last_event_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Open => "open",
            Self::Click => "click",
            Self::Bounce => "bounce",
            Self::Spam => "spam",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

/// Normalize a vendor message id for lookup.
///
/// SendGrid appends a `.filterdrecv-...` routing suffix to the
/// `X-Message-Id` it hands out at send time; only the part before the first
/// dot is stable. Blank ids normalize to `None`.
pub fn normalize_message_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c| c == '<' || c == '>');
    let head = trimmed.split('.').next().unwrap_or("").trim();
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

/// Normalize an email address for recipient matching (trimmed, lowercased).
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}
