use axum::{Json, extract::State, response::IntoResponse};

use crate::AppState;
use crate::metrics;

/// Health check endpoint - returns server status
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot();

    // The only upstream dependency is optional; the store is in-process.
    // A lagging broadcast degrades the live preview without breaking it.
    let status = if snapshot.broadcast.frames_lagged == 0 {
        "healthy"
    } else {
        "degraded"
    };

    Json(metrics::HealthStatus {
        status: status.to_string(),
        sessions: state.sessions.len().await as u64,
        connections: snapshot.connections.active,
        uptime_secs: snapshot.uptime_secs,
    })
}

/// Metrics endpoint - returns detailed server metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Liveness probe - returns 200 if the server is running
pub async fn health_live_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_session_count() {
        let state = crate::test_helpers::test_app_state();
        state
            .sessions
            .create(crate::session::CodeTriplet::default())
            .await;
        let app = Router::new()
            .route("/health", get(health_handler))
            .with_state(state);

        let (status, json) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["sessions"], 1);
    }

    #[tokio::test]
    async fn test_health_degraded_on_lag() {
        let state = crate::test_helpers::test_app_state();
        state.metrics.frames_lagged(5);
        let app = Router::new()
            .route("/health", get(health_handler))
            .with_state(state);

        let (_, json) = get_json(app, "/health").await;
        assert_eq!(json["status"], "degraded");
    }

    #[tokio::test]
    async fn test_metrics_snapshot_shape() {
        let state = crate::test_helpers::test_app_state();
        state.metrics.session_created();
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(state);

        let (status, json) = get_json(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sessions"]["created"], 1);
        assert!(json.get("broadcast").is_some());
        assert!(json.get("assistant").is_some());
    }

    #[tokio::test]
    async fn test_liveness_probe() {
        let app = Router::new().route("/health/live", get(health_live_handler));
        let (status, json) = get_json(app, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "alive");
    }
}
