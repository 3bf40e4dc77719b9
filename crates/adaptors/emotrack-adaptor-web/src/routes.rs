//! Route handlers and router assembly

use crate::error::ApiError;
use crate::schemas::*;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use emotrack_core::{
    DashboardSummary, DeviceDirectory, EmotionStore, IngestBatch, IngestEngine, SummaryEngine,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Shared state for the HTTP API
#[derive(Clone)]
pub struct AppState {
    ingest: IngestEngine,
    summaries: SummaryEngine,
    store: Arc<dyn EmotionStore>,
    default_device_id: String,
}

impl AppState {
    /// Wire both engines to one store
    pub fn new(
        store: Arc<dyn EmotionStore>,
        directory: Arc<dyn DeviceDirectory>,
        default_device_id: impl Into<String>,
    ) -> Self {
        Self {
            ingest: IngestEngine::new(store.clone()),
            summaries: SummaryEngine::new(store.clone(), directory),
            store,
            default_device_id: default_device_id.into(),
        }
    }

    /// Device summarized when the query names none
    pub fn default_device_id(&self) -> &str {
        &self.default_device_id
    }
}

/// Build the API router with CORS and request tracing
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/api/emotions/batch", post(ingest_batch_handler))
        .route("/api/dashboard/summary", get(summary_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(state)
}

/// CORS restricted to `origins`, with credentials.
///
/// Methods and headers are mirrored from the preflight request, since a
/// wildcard cannot be combined with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Health check; 503 when the store does not answer
async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthCheckResponse>) {
    let ready = match state.store.is_ready().await {
        Ok(ready) => ready,
        Err(e) => {
            warn!("Store readiness check failed: {}", e);
            false
        }
    };

    if ready {
        (
            StatusCode::OK,
            Json(HealthCheckResponse {
                status: "ok".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthCheckResponse {
                status: "degraded".to_string(),
            }),
        )
    }
}

/// Apply a device batch
async fn ingest_batch_handler(
    State(state): State<AppState>,
    Json(payload): Json<EmotionsBatchIn>,
) -> Result<Json<EmotionsBatchResponse>, ApiError> {
    let timestamp = match parse_timestamp(&payload.timestamp) {
        Some(ts) => ts,
        None => {
            warn!(
                "Unparseable timestamp {:?} from device {}, using server time",
                payload.timestamp, payload.device_id
            );
            Utc::now()
        }
    };

    debug!(
        "Batch from {} with {} report(s)",
        payload.device_id,
        payload.people.len()
    );

    let batch = IngestBatch::new(payload.device_id, timestamp, payload.people);
    let result = state.ingest.ingest_batch(&batch).await?;

    Ok(Json(EmotionsBatchResponse {
        status: "ok".to_string(),
        updated_count: result.updated_count,
    }))
}

/// Dashboard summary for one device
async fn summary_handler(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let device_id = query
        .device_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| state.default_device_id.clone());

    let summary = state.summaries.get_summary(&device_id).await?;
    Ok(Json(summary))
}
