//! HTTP request handlers.

use super::AppState;
use crate::status::collect_status;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

pub async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        success: true,
        message: "NavWatch monitor is running",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Body returned when the status report cannot be built.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: &'static str,
    pub code: &'static str,
}

pub async fn handle_monitor_status(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now().timestamp();

    match collect_status(state.store.as_ref(), now) {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!("Failed to build monitor status: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    message: "failed to load monitor status",
                    code: "MONITOR_ERROR",
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{temp_store, FailingStore};

    use axum::body::to_bytes;
    use axum::response::Response;
    use std::sync::Arc;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_with_no_targets() {
        let (_tmp, store) = temp_store();
        let state = AppState {
            store: Arc::new(store),
        };

        let response = handle_monitor_status(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["overallStatus"], "operational");
        assert_eq!(json["services"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_status_failure_is_distinct_error() {
        let state = AppState {
            store: Arc::new(FailingStore),
        };

        let response = handle_monitor_status(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "MONITOR_ERROR");
        assert!(json.get("services").is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let response = handle_health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);
    }
}
