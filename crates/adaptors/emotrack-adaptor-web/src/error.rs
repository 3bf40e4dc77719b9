//! Mapping of core errors onto HTTP responses

use crate::schemas::{ErrorResponse, RejectionOut};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use emotrack_core::EmotrackError;

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError(pub EmotrackError);

impl From<EmotrackError> for ApiError {
    fn from(err: EmotrackError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EmotrackError::InvalidBatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EmotrackError::Validation(_) => StatusCode::BAD_REQUEST,
            EmotrackError::Store(_) | EmotrackError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let rejections = match &self.0 {
            EmotrackError::InvalidBatch { rejections, .. } => rejections
                .iter()
                .map(|r| RejectionOut {
                    index: r.index,
                    person_id: r.person_id.clone(),
                    reason: r.reason.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        };

        let body = ErrorResponse {
            error: self.0.to_string(),
            retryable: self.0.is_retryable(),
            rejections,
        };

        (status, Json(body)).into_response()
    }
}
