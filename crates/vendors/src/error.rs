//! Error type shared by the vendor clients.

use serde::de::DeserializeOwned;

/// Errors from a vendor HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The vendor returned a non-2xx status code.
    #[error("Vendor API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected vendor response: {0}")]
    Decode(String),
}

/// Return the response unchanged on a 2xx status, or an
/// [`VendorError::Api`] carrying the status and body text.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, VendorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(VendorError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Check the status, then deserialize the body as `T`.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, VendorError> {
    let response = ensure_success(response).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| VendorError::Decode(e.to_string()))
}
