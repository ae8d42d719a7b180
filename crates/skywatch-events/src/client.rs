//! HTTP client for the upstream astronomy-events API.
//!
//! Wraps `reqwest` with a bounded wait, optional Basic auth, and detection of
//! the upstream `error` envelope. Successful bodies are handed to
//! [`extract_with_fallback`] by [`AstroClient::fetch_events`]; error
//! envelopes never reach the extractor.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use skywatch_core::AppConfig;

use crate::error::{upstream_error, AstroError};
use crate::fallback::extract_with_fallback;
use crate::types::{EventsOutcome, EventsQuery};

const DEFAULT_BASE_URL: &str = "https://api.astronomyapi.com";
const DEFAULT_USER_AGENT: &str = "skywatch/0.1 (astronomy-events)";
const EVENTS_PATH: [&str; 4] = ["api", "v2", "bodies", "events"];
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for the astronomy-events REST API.
///
/// Use [`AstroClient::new`] for production or [`AstroClient::with_base_url`]
/// to point at a mock server in tests.
pub struct AstroClient {
    client: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
    timeout_secs: u64,
}

impl AstroClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`AstroError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        credentials: Option<(String, String)>,
    ) -> Result<Self, AstroError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, DEFAULT_USER_AGENT, credentials)
    }

    /// Creates a client from application config.
    ///
    /// Credentials are only used when both the app id and the secret are set.
    ///
    /// # Errors
    ///
    /// Same as [`AstroClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AstroError> {
        let credentials = config
            .astro_app_id
            .clone()
            .zip(config.astro_app_secret.clone());
        Self::with_base_url(
            &config.astro_api_base_url,
            config.astro_request_timeout_secs,
            &config.astro_user_agent,
            credentials,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AstroError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AstroError::InvalidBaseUrl`] if `base_url`
    /// is not an absolute http(s) URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        credentials: Option<(String, String)>,
    ) -> Result<Self, AstroError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs.max(1))))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| AstroError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(AstroError::InvalidBaseUrl(format!(
                "'{base_url}' is not an http(s) base URL"
            )));
        }

        Ok(Self {
            client,
            base_url,
            credentials,
            timeout_secs,
        })
    }

    /// Whether requests carry Basic auth.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Fetches the raw events document for `query`.
    ///
    /// # Errors
    ///
    /// - [`AstroError::Timeout`] if the upstream exceeds the configured wait.
    /// - [`AstroError::Http`] on any other network failure.
    /// - [`AstroError::Upstream`] if the body carries a top-level `error`
    ///   object, whatever the HTTP status.
    /// - [`AstroError::Status`] on a non-2xx status without an error envelope.
    /// - [`AstroError::Deserialize`] if a 2xx body is not JSON.
    pub async fn fetch_raw(&self, query: &EventsQuery) -> Result<Value, AstroError> {
        let url = self.build_url(query);
        tracing::debug!(%url, body = %query.body, "requesting astronomy events");

        let mut request = self.client.get(url.clone());
        if let Some((app_id, secret)) = &self.credentials {
            request = request.basic_auth(app_id, Some(secret));
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                tracing::warn!(%url, status = status.as_u16(), "upstream returned non-JSON error");
                return Err(AstroError::Status {
                    status: status.as_u16(),
                });
            }
            Err(source) => {
                return Err(AstroError::Deserialize {
                    context: url.to_string(),
                    source,
                })
            }
        };

        if let Some(err) = upstream_error(&body) {
            tracing::warn!(%url, status = status.as_u16(), error = %err, "upstream reported an error");
            return Err(err);
        }
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "upstream returned non-success status");
            return Err(AstroError::Status {
                status: status.as_u16(),
            });
        }

        Ok(body)
    }

    /// Fetches `query` and runs extraction with fallbacks over the result.
    ///
    /// # Errors
    ///
    /// Same as [`AstroClient::fetch_raw`]. An empty result is
    /// [`EventsOutcome::Empty`], not an error.
    pub async fn fetch_events(&self, query: &EventsQuery) -> Result<EventsOutcome, AstroError> {
        let body = self.fetch_raw(query).await?;
        let outcome = extract_with_fallback(&body);
        tracing::debug!(count = outcome.events().len(), "astronomy events extracted");
        Ok(outcome)
    }

    /// Builds `{base}/api/v2/bodies/events/{body}?latitude=..&longitude=..`.
    fn build_url(&self, query: &EventsQuery) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(EVENTS_PATH)
                .push(&query.body);
        }
        url.query_pairs_mut()
            .append_pair("latitude", &query.latitude.to_string())
            .append_pair("longitude", &query.longitude.to_string())
            .append_pair("elevation", &query.elevation.to_string())
            .append_pair("from_date", &query.from_date.format("%Y-%m-%d").to_string())
            .append_pair("to_date", &query.to_date().format("%Y-%m-%d").to_string())
            .append_pair("time", "00:00:00");
        url
    }

    fn transport_error(&self, err: reqwest::Error) -> AstroError {
        if err.is_timeout() {
            tracing::warn!(timeout_secs = self.timeout_secs, "upstream request timed out");
            AstroError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            tracing::warn!(error = %err, "upstream request failed");
            AstroError::Http(err)
        }
    }
}
