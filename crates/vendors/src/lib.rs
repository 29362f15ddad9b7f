//! HTTP clients for the third-party services the dashboard aggregates.
//!
//! Every client wraps a [`reqwest::Client`], is built from a config struct
//! whose `from_env` returns `None` when the integration is not configured,
//! and reports failures as [`VendorError`].

pub mod error;
pub mod google_analytics;
pub mod llm;
pub mod mailgun;
pub mod sendgrid;
pub mod sprout_social;

mod lenient;

pub use error::VendorError;

/// Read an environment variable, treating blank values as unset.
pub(crate) fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip one trailing slash so paths can be appended with `format!`.
pub(crate) fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
