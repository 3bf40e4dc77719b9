//! End-to-end tests of the HTTP API against the in-memory store

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use emotrack_adaptor_web::{build_router, serve, AppState};
use emotrack_core::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

const DASHBOARD_ORIGIN: &str = "http://localhost:3000";

/// Store whose every operation fails as if the database were locked
struct LockedStore;

#[async_trait]
impl EmotionStore for LockedStore {
    async fn get(&self, _: &str, _: &str) -> Result<Option<PersonEmotionState>> {
        Err(EmotrackError::store("database is locked"))
    }

    async fn put(&self, _: &PersonEmotionState) -> Result<()> {
        Err(EmotrackError::store("database is locked"))
    }

    async fn list_by_device(&self, _: &str) -> Result<Vec<PersonEmotionState>> {
        Err(EmotrackError::store("database is locked"))
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        Err(EmotrackError::store("database is locked"))
    }

    async fn is_ready(&self) -> Result<bool> {
        Ok(false)
    }
}

fn app_with_store(store: Arc<dyn EmotionStore>) -> Router {
    let directory = StaticDeviceDirectory::new().with_device("jetson_1", "Entrance Camera");
    let state = AppState::new(store, Arc::new(directory), "jetson_1");
    build_router(state, &[DASHBOARD_ORIGIN.to_string()])
}

fn app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    (app_with_store(Arc::new(store.clone())), store)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_batch(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/emotions/batch")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (router, _) = app();
    let (status, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_batch_then_summary() {
    let (router, _) = app();

    let (status, body) = send(
        &router,
        post_batch(json!({
            "device_id": "jetson_1",
            "timestamp": "2025-11-14T12:34:56Z",
            "people": [
                {"person_id": "1", "cumulative": {"happy": 120.5, "sad": 10.0, "angry": 0.0}},
                {"person_id": "2", "cumulative": {"sad": 30.0}}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "updated_count": 2}));

    let (status, summary) = send(&router, get("/api/dashboard/summary?device_id=jetson_1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["device_id"], "jetson_1");
    assert_eq!(summary["device_name"], "Entrance Camera");
    assert_eq!(
        summary["emotion_totals"],
        json!({"angry": 0.0, "happy": 120.5, "sad": 40.0})
    );

    let people = summary["current_people"].as_array().unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0]["person_id"], "1");
    assert_eq!(people[0]["current_emotion"], "happy");
    assert_eq!(people[0]["time_happy"], 120.5);
    assert_eq!(people[0]["time_sad"], 10.0);
    assert_eq!(people[0]["last_seen"], "2025-11-14T12:34:56Z");
    assert_eq!(people[1]["current_emotion"], "sad");
}

#[tokio::test]
async fn test_summary_defaults_to_configured_device() {
    let (router, _) = app();

    send(
        &router,
        post_batch(json!({
            "device_id": "jetson_1",
            "timestamp": "2025-11-14T12:34:56Z",
            "people": [{"person_id": "1", "cumulative": {"happy": 1.0}}]
        })),
    )
    .await;

    let (status, summary) = send(&router, get("/api/dashboard/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["device_id"], "jetson_1");
    assert_eq!(summary["current_people"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_summary_of_unknown_device_is_empty() {
    let (router, _) = app();

    let (status, summary) = send(&router, get("/api/dashboard/summary?device_id=garage")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["device_name"], "Unknown");
    assert_eq!(summary["emotion_totals"], json!({}));
    assert_eq!(summary["current_people"], json!([]));
}

#[tokio::test]
async fn test_invalid_batch_is_rejected_whole() {
    let (router, store) = app();

    let (status, body) = send(
        &router,
        post_batch(json!({
            "device_id": "jetson_1",
            "timestamp": "2025-11-14T12:34:56Z",
            "people": [
                {"person_id": "1", "cumulative": {"happy": 5.0}},
                {"person_id": "2", "cumulative": {"sad": -1.0}},
                {"person_id": "", "cumulative": {"sad": 1.0}}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["retryable"], false);
    let rejections = body["rejections"].as_array().unwrap();
    assert_eq!(rejections.len(), 2);
    assert_eq!(rejections[0]["index"], 1);
    assert_eq!(rejections[0]["person_id"], "2");
    assert_eq!(rejections[1]["index"], 2);

    assert!(store.is_empty().await, "no report may be applied");
}

#[tokio::test]
async fn test_empty_device_id_is_bad_request() {
    let (router, _) = app();

    let (status, body) = send(
        &router,
        post_batch(json!({
            "device_id": "",
            "timestamp": "2025-11-14T12:34:56Z",
            "people": [{"person_id": "1", "cumulative": {"happy": 1.0}}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("device_id"));
}

#[tokio::test]
async fn test_unparseable_timestamp_falls_back_to_server_time() {
    let (router, store) = app();
    let before = chrono::Utc::now();

    let (status, _) = send(
        &router,
        post_batch(json!({
            "device_id": "jetson_1",
            "timestamp": "not a time",
            "people": [{"person_id": "1", "cumulative": {"happy": 1.0}}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored = store.get("jetson_1", "1").await.unwrap().unwrap();
    assert!(stored.last_seen >= before);
}

#[tokio::test]
async fn test_store_failure_is_retryable() {
    let router = app_with_store(Arc::new(LockedStore));

    let (status, body) = send(
        &router,
        post_batch(json!({
            "device_id": "jetson_1",
            "timestamp": "2025-11-14T12:34:56Z",
            "people": [{"person_id": "1", "cumulative": {"happy": 1.0}}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_summary_store_failure_is_retryable() {
    let router = app_with_store(Arc::new(LockedStore));

    let (status, body) = send(&router, get("/api/dashboard/summary?device_id=jetson_1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_health_reports_unready_store() {
    let router = app_with_store(Arc::new(LockedStore));

    let (status, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"status": "degraded"}));
}

#[tokio::test]
async fn test_cors_preflight_for_dashboard_origin() {
    let (router, _) = app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/dashboard/summary")
        .header(header::ORIGIN, DASHBOARD_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        DASHBOARD_ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_ignores_other_origins() {
    let (router, _) = app();

    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_serve_reports_address_in_use() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap().to_string();
    let (router, _) = app();

    let err = serve(&addr, router).await.unwrap_err();
    assert!(matches!(err, EmotrackError::Io(_)));
    assert!(!err.is_retryable());
}
