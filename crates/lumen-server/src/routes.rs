//! HTTP routes.
//!
//! - `GET /` health check
//! - `GET /test` browser self-test
//! - `POST /scan` scan one or two URLs

use crate::api::{ScanBody, ScanResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;

/// Build the router with all endpoints.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/test", get(self_test))
        .route("/scan", post(scan))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn self_test(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.scanner.self_test().await.map_err(|e| {
        tracing::error!(error = %e, "browser self-test failed");
        ApiError::from(e)
    })?;
    Ok(Json(json!({ "status": "chromium ok" })))
}

async fn scan(
    State(state): State<AppState>,
    body: Result<Json<ScanBody>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("scan_request", %request_id);

    async move {
        let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let (request, shape) = body.into_request()?;
        tracing::info!(urls = ?request.urls(), "scan requested");

        let results = state.scanner.scan(&request).await.map_err(|e| {
            tracing::error!(error = %e, "scan request failed");
            ApiError::from(e)
        })?;
        Ok(Json(ScanResponse::new(shape, results)))
    }
    .instrument(span)
    .await
}
