mod events;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use skywatch_core::AppConfig;
use skywatch_events::{AstroClient, AstroError, FailureKind};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Hard ceiling on events returned in one response.
pub(super) const MAX_DISPLAY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<AstroClient>,
    pub defaults: Arc<EventDefaults>,
}

/// Request defaults taken from configuration.
#[derive(Debug, Clone)]
pub struct EventDefaults {
    pub latitude: f64,
    pub longitude: f64,
    pub days: u32,
    pub body: String,
    pub display_limit: usize,
}

impl EventDefaults {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            latitude: config.astro_default_lat,
            longitude: config.astro_default_lon,
            days: config.astro_default_days,
            body: config.astro_default_body.clone(),
            display_limit: config.display_limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    upstream_configured: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                hint: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.error.hint = hint;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "error_payload" => StatusCode::UNPROCESSABLE_ENTITY,
            "upstream_error" | "upstream_unavailable" => StatusCode::BAD_GATEWAY,
            "upstream_timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Clamps a requested page size to `1..=MAX_DISPLAY_LIMIT`.
pub(super) fn normalize_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_DISPLAY_LIMIT)
}

/// Maps a client failure onto the distinct user-visible failure states.
pub(super) fn map_astro_error(request_id: String, error: AstroError) -> ApiError {
    match error.kind() {
        FailureKind::InvalidQuery => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        FailureKind::Timeout => {
            tracing::warn!(error = %error, "upstream timed out");
            ApiError::new(
                request_id,
                "upstream_timeout",
                "astronomy service did not respond in time",
            )
        }
        FailureKind::Upstream => {
            tracing::warn!(error = %error, "upstream reported an error");
            let (message, hint) = match error {
                AstroError::Upstream { message, hint, .. } => (message, hint),
                other => (other.to_string(), None),
            };
            ApiError::new(request_id, "upstream_error", message).with_hint(hint)
        }
        FailureKind::Network => {
            tracing::error!(error = %error, "upstream request failed");
            ApiError::new(
                request_id,
                "upstream_unavailable",
                "astronomy service is unavailable",
            )
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/astro/events", get(events::list_events))
        .route("/api/v1/astro/extract", post(events::extract_document))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            upstream_configured: state.client.has_credentials(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "no such route")
}
