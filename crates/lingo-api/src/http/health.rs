//! Health and diagnostics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use lingo_telemetry::{MetricsSnapshot, build_sha};
use serde::Serialize;
use tracing::error;

use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) build: String,
    pub(crate) locales_dir: String,
    pub(crate) locales_dir_present: bool,
    pub(crate) metrics: MetricsSnapshot,
}

/// Liveness plus a view of the locales directory; a missing directory reports
/// `degraded` because every catalog route will come back empty or not found.
pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let locales_dir = state.catalog.locales_dir();
    let present = tokio::fs::metadata(locales_dir)
        .await
        .is_ok_and(|metadata| metadata.is_dir());
    Json(HealthResponse {
        status: if present { "ok" } else { "degraded" },
        build: build_sha().to_string(),
        locales_dir: locales_dir.display().to_string(),
        locales_dir_present: present,
        metrics: state.telemetry.snapshot(),
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
