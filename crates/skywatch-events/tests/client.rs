//! Integration tests for `AstroClient` using wiremock HTTP mocks.

use std::time::Duration;

use chrono::NaiveDate;
use skywatch_events::{AstroClient, AstroError, EventsOutcome, EventsQuery, FailureKind};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AstroClient {
    AstroClient::with_base_url(base_url, 30, "skywatch-test", None)
        .expect("client construction should not fail")
}

fn moon_query() -> EventsQuery {
    EventsQuery::new(
        "moon",
        55.7558,
        37.6173,
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        7,
    )
    .expect("valid query")
}

#[tokio::test]
async fn nested_rows_without_named_events_yield_empty() {
    let server = MockServer::start().await;

    // AstronomyAPI nests rows under data.rows[].events[]; the `data` value is
    // an object here, so the walker descends through it normally.
    let body = serde_json::json!({
        "data": {
            "dates": {"from": "2025-01-01T00:00:00.000Z", "to": "2025-01-08T00:00:00.000Z"},
            "observer": {"location": {"longitude": 37.6173, "latitude": 55.7558, "elevation": 0}},
            "rows": [
                {
                    "body": {"id": "moon", "name": "Moon"},
                    "events": [
                        {
                            "type": "partial_lunar_eclipse",
                            "eventHighlights": {
                                "peak": {"date": "2025-01-03T12:00:00.000Z", "altitude": 12.5}
                            },
                            "extraInfo": {"obscuration": 0.3}
                        }
                    ]
                }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/v2/bodies/events/moon"))
        .and(query_param("latitude", "55.7558"))
        .and(query_param("longitude", "37.6173"))
        .and(query_param("from_date", "2025-01-01"))
        .and(query_param("to_date", "2025-01-08"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let outcome = client
        .fetch_events(&moon_query())
        .await
        .expect("should fetch events");

    // The row object pairs `body` with an `events` array, so it is routed
    // into that array; the event itself has a type but no name, leaving
    // the walk empty. The fallbacks find no top-level array either.
    assert_eq!(outcome, EventsOutcome::Empty);
}

#[tokio::test]
async fn fetch_events_returns_found_for_flat_events_envelope() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "events": [
            {"body": "Moon", "kind": "occultation", "peak": "2025-01-01T00:00:00Z", "mag": -12.1},
            {"object": "Regulus", "category": "occultation", "time": "2025-01-02T03:04:05Z"}
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/v2/bodies/events/moon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let events = client
        .fetch_events(&moon_query())
        .await
        .expect("should fetch events")
        .into_events();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "Moon");
    assert_eq!(events[0].when, "2025-01-01T00:00:00Z");
    assert_eq!(events[0].extra, "-12.1");
    assert_eq!(events[1].name, "Regulus");
    assert_eq!(events[1].event_type, "occultation");
}

#[tokio::test]
async fn sends_basic_auth_when_credentials_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AstroClient::with_base_url(
        &server.uri(),
        30,
        "skywatch-test",
        Some(("app-id".to_owned(), "secret".to_owned())),
    )
    .expect("client");

    let outcome = client.fetch_events(&moon_query()).await.expect("ok");
    assert!(outcome.is_empty());
}

#[tokio::test]
async fn error_envelope_on_success_status_is_upstream_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {"message": "Invalid credentials", "code": 401, "hint": "check ASTRO_APP_SECRET"},
        "data": [{"name": "Mars", "type": "opposition"}]
    });

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_events(&moon_query())
        .await
        .expect_err("error envelope must bypass extraction");

    assert_eq!(err.kind(), FailureKind::Upstream);
    match err {
        AstroError::Upstream {
            message,
            code,
            hint,
        } => {
            assert_eq!(message, "Invalid credentials");
            assert_eq!(code.as_deref(), Some("401"));
            assert_eq!(hint.as_deref(), Some("check ASTRO_APP_SECRET"));
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn error_envelope_on_client_error_status_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"error": {"error": "Forbidden"}})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_raw(&moon_query()).await.unwrap_err();
    assert!(
        matches!(err, AstroError::Upstream { ref message, .. } if message == "Forbidden"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn server_error_without_envelope_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_raw(&moon_query()).await.unwrap_err();
    assert!(matches!(err, AstroError::Status { status: 503 }), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Network);
}

#[tokio::test]
async fn non_json_success_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_raw(&moon_query()).await.unwrap_err();
    assert!(matches!(err, AstroError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn slow_upstream_is_reported_as_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = AstroClient::with_base_url(&server.uri(), 1, "skywatch-test", None)
        .expect("client");
    let err = client.fetch_events(&moon_query()).await.unwrap_err();

    assert!(
        matches!(err, AstroError::Timeout { timeout_secs: 1 }),
        "got {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::Timeout);
}

#[tokio::test]
async fn unreachable_upstream_is_network_failure() {
    let client = test_client("http://127.0.0.1:1");
    let err = client.fetch_raw(&moon_query()).await.unwrap_err();
    assert!(matches!(err, AstroError::Http(_)), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Network);
}
