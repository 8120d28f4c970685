use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::render;
use crate::session::{CodeTriplet, TripletPatch};
use crate::ws::ServerMessage;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    /// Present = update that session; absent = create a new one.
    pub session_id: Option<String>,
    pub html_code: Option<String>,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub session_id: String,
    pub preview_url: String,
}

/// Create a preview session, or update an existing one when the request
/// names a session id. Either way the new triplet is fanned out to every
/// connected preview page.
pub async fn create_or_update_preview(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, (StatusCode, Json<serde_json::Value>)> {
    let session = match req.session_id {
        Some(id) => {
            let patch = TripletPatch {
                html_code: req.html_code,
                css_code: req.css_code,
                js_code: req.js_code,
            };
            match state.sessions.update(&id, patch).await {
                Some(session) => {
                    state.metrics.session_updated();
                    session
                }
                None => {
                    state.metrics.session_miss();
                    return Err((
                        StatusCode::NOT_FOUND,
                        Json(serde_json::json!({ "error": "Preview session not found" })),
                    ));
                }
            }
        }
        None => {
            let session = state
                .sessions
                .create(CodeTriplet {
                    html_code: req.html_code.unwrap_or_default(),
                    css_code: req.css_code.unwrap_or_default(),
                    js_code: req.js_code.unwrap_or_default(),
                })
                .await;
            state.metrics.session_created();
            info!(session_id = %session.id, "created preview session");
            session
        }
    };

    // Fire-and-forget: Err just means no preview page is open right now.
    let _ = state.broadcast.send(ServerMessage::code_update(&session));
    state.metrics.broadcast_published();

    Ok(Json(PreviewResponse {
        preview_url: format!("/preview/{}.html", session.id),
        session_id: session.id,
    }))
}

/// Serve a session's rendered preview document. The path segment is the
/// session id plus a required `.html` suffix.
pub async fn serve_preview(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    // A bare id is not a preview URL.
    let Some(id) = file.strip_suffix(".html") else {
        return (StatusCode::NOT_FOUND, "Preview session not found").into_response();
    };

    match state.sessions.get(id).await {
        Some(session) => render::render_preview(&session).into_response(),
        None => {
            state.metrics.session_miss();
            (StatusCode::NOT_FOUND, "Preview session not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::Request,
        routing::{get, post},
    };
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/api/preview", post(create_or_update_preview))
            .route("/preview/{file}", get(serve_preview))
            .with_state(crate::test_helpers::test_app_state())
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_preview(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/preview")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_preview_session() {
        let app = test_router();

        let resp = app
            .oneshot(post_preview(
                r#"{"htmlCode":"<h1>hi</h1>","cssCode":"h1 {}","jsCode":""}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        let session_id = json["sessionId"].as_str().unwrap();
        assert_eq!(session_id.len(), 26);
        assert_eq!(
            json["previewUrl"],
            format!("/preview/{}.html", session_id)
        );
    }

    #[tokio::test]
    async fn test_update_existing_session() {
        let app = test_router();

        let resp = app
            .clone()
            .oneshot(post_preview(r#"{"htmlCode":"<p>one</p>"}"#))
            .await
            .unwrap();
        let created = json_body(resp).await;
        let id = created["sessionId"].as_str().unwrap();

        // Partial update: only the HTML buffer changes.
        let resp = app
            .clone()
            .oneshot(post_preview(&format!(
                r#"{{"sessionId":"{id}","htmlCode":"<p>two</p>"}}"#
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = json_body(resp).await;
        assert_eq!(updated["sessionId"], *id);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/preview/{id}.html"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let doc = String::from_utf8(body.to_vec()).unwrap();
        assert!(doc.contains("<p>two</p>"));
        assert!(!doc.contains("<p>one</p>"));
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_404() {
        let app = test_router();

        let resp = app
            .oneshot(post_preview(
                r#"{"sessionId":"doesnotexist","htmlCode":"<p>x</p>"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = json_body(resp).await;
        assert_eq!(json["error"], "Preview session not found");
    }

    #[tokio::test]
    async fn test_serve_preview_document() {
        let app = test_router();

        let resp = app
            .clone()
            .oneshot(post_preview(
                r#"{"htmlCode":"<div>content</div>","cssCode":"div { color: red; }","jsCode":"console.log(1);"}"#,
            ))
            .await
            .unwrap();
        let created = json_body(resp).await;
        let url = created["previewUrl"].as_str().unwrap().to_string();

        let resp = app
            .oneshot(Request::builder().uri(url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let doc = String::from_utf8(body.to_vec()).unwrap();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<div>content</div>"));
        assert!(doc.contains("div { color: red; }"));
        assert!(doc.contains("console.log(1);"));
    }

    #[tokio::test]
    async fn test_serve_preview_unknown_session_is_404() {
        let app = test_router();

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/preview/doesnotexist.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Preview session not found");
    }

    #[tokio::test]
    async fn test_serve_preview_without_html_suffix_is_404() {
        let app = test_router();

        let resp = app
            .clone()
            .oneshot(post_preview(r#"{"htmlCode":"<p>x</p>"}"#))
            .await
            .unwrap();
        let created = json_body(resp).await;
        let id = created["sessionId"].as_str().unwrap();

        // The bare session id is not a preview URL.
        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/preview/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_broadcasts_code_update() {
        let state = crate::test_helpers::test_app_state();
        let mut rx = state.broadcast.subscribe();
        let app = Router::new()
            .route("/api/preview", post(create_or_update_preview))
            .with_state(state);

        app.oneshot(post_preview(r#"{"htmlCode":"<p>live</p>"}"#))
            .await
            .unwrap();

        let ServerMessage::CodeUpdate { html_code, .. } = rx.recv().await.unwrap();
        assert_eq!(html_code, "<p>live</p>");
    }
}
