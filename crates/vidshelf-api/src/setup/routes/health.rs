//! Health check handlers.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness probe - process is running.
pub async fn liveness_check(_state: Arc<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the catalog document can be read.
pub async fn readiness_check(state: Arc<AppState>) -> impl IntoResponse {
    let (catalog, ready) = match tokio::time::timeout(
        READINESS_TIMEOUT,
        state.catalog.list_all(None),
    )
    .await
    {
        Ok(Ok(_)) => ("ready".to_string(), true),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Catalog readiness check failed");
            (format!("not_ready: {}", e), false)
        }
        Err(_) => {
            tracing::error!("Catalog readiness check timed out");
            ("timeout".to_string(), false)
        }
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "catalog": catalog,
            "storage": state.catalog.blob_store().backend_type().to_string(),
        })),
    )
}
