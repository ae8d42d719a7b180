use serde_json::Value;
use thiserror::Error;

/// Errors returned by the astronomy-events client.
#[derive(Debug, Error)]
pub enum AstroError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream did not answer within the configured bound.
    #[error("upstream did not respond within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-2xx response without a recognizable error envelope.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The upstream returned a top-level `error` object.
    #[error("upstream API error: {message}")]
    Upstream {
        message: String,
        code: Option<String>,
        hint: Option<String>,
    },

    /// The response body was not JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Coarse grouping used by front ends to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    Upstream,
    InvalidQuery,
}

impl AstroError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Upstream { .. } => FailureKind::Upstream,
            Self::InvalidQuery(_) => FailureKind::InvalidQuery,
            Self::Http(_) | Self::Status { .. } | Self::Deserialize { .. } | Self::InvalidBaseUrl(_) => {
                FailureKind::Network
            }
        }
    }
}

const DEFAULT_UPSTREAM_MESSAGE: &str = "upstream error";

/// Recognizes the upstream failure envelope:
/// `{"error": {"message"|"error"|"raw": "...", "code": ..., "hint": "..."}}`.
///
/// Returns `None` when `body` has no top-level `error` object.
#[must_use]
pub fn upstream_error(body: &Value) -> Option<AstroError> {
    let error = body.get("error")?.as_object()?;

    let message = ["message", "error", "raw"]
        .iter()
        .filter_map(|key| error.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_UPSTREAM_MESSAGE)
        .to_string();

    let code = error.get("code").and_then(|c| match c {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });

    let hint = error
        .get("hint")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(AstroError::Upstream {
        message,
        code,
        hint,
    })
}
