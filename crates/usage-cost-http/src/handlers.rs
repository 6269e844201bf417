//! HTTP request handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, info_span};
use usage_cost_core::error::UsageCostError;
use usage_cost_core::types::{CostRequest, ResultEnvelope};
use usage_cost_pricing::batch;
use uuid::Uuid;

use crate::server::AppState;

/// Error returned from a handler.
///
/// Client errors become `400 Bad Request` with the error message as a plain-text
/// body; everything else is a `500`.
#[derive(Debug)]
pub struct ApiError(pub UsageCostError);

impl From<UsageCostError> for ApiError {
    fn from(error: UsageCostError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Failed to process request: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.0.to_string()).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST / (and /api) - price a usage batch.
pub async fn calculate_usage_costs(body: Bytes) -> Result<Json<ResultEnvelope>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("calculate_usage_costs", %request_id);

    span.in_scope(|| -> Result<Json<ResultEnvelope>, ApiError> {
        info!("Processing usage cost request ({} bytes)", body.len());
        let request = CostRequest::from_slice(&body).inspect_err(|e| {
            info!("Rejected usage cost request: {}", e);
        })?;
        Ok(Json(batch::calculate_usage_costs(request)))
    })
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_is_bad_request() {
        let response = ApiError(UsageCostError::MissingFields(vec![
            "environment".to_string(),
        ]))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_error_is_internal() {
        let response =
            ApiError(UsageCostError::Server("listener closed".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
