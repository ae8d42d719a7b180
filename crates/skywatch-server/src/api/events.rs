use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skywatch_events::{
    extract_with_fallback, upstream_error, AstroError, EventsOutcome, EventsQuery,
    NormalizedEvent, EMPTY_MESSAGE,
};

use crate::middleware::RequestId;

use super::{map_astro_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct EventsPayload {
    pub events: Vec<NormalizedEvent>,
    pub total: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl EventsPayload {
    fn from_outcome(outcome: EventsOutcome, limit: usize) -> Self {
        let empty_message = outcome.is_empty().then_some(EMPTY_MESSAGE);
        let mut events = outcome.into_events();
        let total = events.len();
        events.truncate(limit);
        Self {
            truncated: total > events.len(),
            events,
            total,
            empty_message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct EventsParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub elevation: Option<f64>,
    pub days: Option<u32>,
    pub body: Option<String>,
    pub from: Option<NaiveDate>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExtractParams {
    pub limit: Option<usize>,
}

pub(super) async fn list_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<EventsParams>, QueryRejection>,
) -> Result<Json<ApiResponse<EventsPayload>>, ApiError> {
    let Query(params) = params.map_err(|e| invalid_input(&req_id, e.body_text()))?;
    let defaults = &state.defaults;
    let query = EventsQuery::new(
        params.body.as_deref().unwrap_or(&defaults.body),
        params.lat.unwrap_or(defaults.latitude),
        params.lon.unwrap_or(defaults.longitude),
        params.from.unwrap_or_else(|| Utc::now().date_naive()),
        params.days.unwrap_or(defaults.days),
    )
    .map_err(|e| map_astro_error(req_id.0.clone(), e))?
    .with_elevation(params.elevation.unwrap_or(0.0));

    let outcome = state
        .client
        .fetch_events(&query)
        .await
        .map_err(|e| map_astro_error(req_id.0.clone(), e))?;

    let limit = normalize_limit(params.limit, defaults.display_limit);
    Ok(Json(ApiResponse {
        data: EventsPayload::from_outcome(outcome, limit),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Normalizes a document the caller fetched itself.
pub(super) async fn extract_document(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<ExtractParams>, QueryRejection>,
    document: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<EventsPayload>>, ApiError> {
    let Query(params) = params.map_err(|e| invalid_input(&req_id, e.body_text()))?;
    let Json(document) = document.map_err(|e| invalid_input(&req_id, e.body_text()))?;
    if let Some(err) = upstream_error(&document) {
        let (message, hint) = match err {
            AstroError::Upstream { message, hint, .. } => (message, hint),
            other => (other.to_string(), None),
        };
        return Err(ApiError::new(req_id.0, "error_payload", message).with_hint(hint));
    }

    let limit = normalize_limit(params.limit, state.defaults.display_limit);
    Ok(Json(ApiResponse {
        data: EventsPayload::from_outcome(extract_with_fallback(&document), limit),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Malformed query strings and bodies become `validation_error` envelopes
/// instead of axum's plain-text rejections.
fn invalid_input(req_id: &RequestId, message: String) -> ApiError {
    ApiError::new(req_id.0.clone(), "validation_error", message)
}
