//! `POST /handle_alert`: the alert-manager webhook receiver.

use std::sync::Arc;

use alertbridge_core::{AlertBatch, BatchError};
use alertbridge_notify::DispatchStatus;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::error_response;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub status: DispatchStatus,
}

/// The body is read raw so that malformed JSON maps to the documented
/// `400 Invalid JSON` rather than axum's extractor rejection.
pub async fn handle_alert(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    tracing::debug!(bytes = body.len(), "alert webhook received");

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "request body is not valid JSON");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let batch = match AlertBatch::from_value(raw) {
        Ok(batch) => batch,
        Err(BatchError::NotAnObject) => {
            tracing::error!("request body is not a JSON object");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
        Err(e) => {
            tracing::error!(error = %e, "alert batch has an unexpected shape");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let status = state.dispatcher.handle(&batch).await;
    tracing::info!(%status, "alert batch handled");
    (StatusCode::OK, Json(DispatchResponse { status })).into_response()
}
