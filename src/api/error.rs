//! API error taxonomy
//!
//! Remote failures are values, not panics: every client method returns
//! `Result<_, ApiError>` and callers branch on the kind.

use serde::Deserialize;
use thiserror::Error;

/// Per-field detail in a backend validation failure payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDetail {
    pub field: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Failure of a remote call
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend rejected a syntactically valid submission with
    /// structured per-field details (`{ message, details: [...] }`).
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldDetail>,
    },

    /// Any other non-success HTTP response
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connection refused, DNS, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for a 401, which invalidates the stored session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Api { status: 401, .. })
    }

    /// Render this error into the flat message list a form displays.
    ///
    /// Validation details are rendered one message per detail; other
    /// failures collapse to a single line, preferring the server-supplied
    /// message and falling back to `fallback`.
    pub fn summary_messages(&self, fallback: &str) -> Vec<String> {
        match self {
            ApiError::Validation { details, .. } if !details.is_empty() => {
                flatten_details(details)
            }
            ApiError::Validation { message, .. } | ApiError::Api { message, .. } => {
                vec![non_empty_or(message, fallback)]
            }
            ApiError::Network(detail) | ApiError::Decode(detail) => {
                vec![non_empty_or(detail, fallback)]
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Render validation details into human-readable messages: the detail's own
/// message when present, otherwise a `field: message` line.
pub fn flatten_details(details: &[FieldDetail]) -> Vec<String> {
    details
        .iter()
        .map(|detail| match detail.message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            other => format!("{}: {}", detail.field, other.unwrap_or_default()),
        })
        .collect()
}

fn non_empty_or(message: &str, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}
