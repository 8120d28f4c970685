use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::warn;

use snippet_merge::{Language, Suggestion, extract_suggestions};

use crate::AppState;
use crate::assistant::{FALLBACK_REPLY, MergeStrategy};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub suggestions: Vec<Suggestion>,
}

/// Forward a chat message to the assistant and extract any code suggestions
/// from the reply. Assistant failures degrade to the apology reply with an
/// empty suggestion list; this endpoint never 500s over a flaky upstream.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = match state.assistant.chat(&req.message).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("assistant chat failed: {}", e);
            FALLBACK_REPLY.to_string()
        }
    };

    let suggestions = extract_suggestions(&reply);
    Json(ChatResponse { reply, suggestions })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub language: Language,
    #[serde(default)]
    pub existing: String,
    #[serde(default)]
    pub snippet: String,
    /// Opt out of the AI rung of the ladder; heuristics still apply.
    #[serde(default = "default_use_ai")]
    pub use_ai: bool,
}

fn default_use_ai() -> bool {
    true
}

#[derive(Serialize)]
pub struct MergeResponse {
    pub merged: String,
    pub strategy: MergeStrategy,
}

/// Merge a suggested snippet into existing code, reporting which rung of
/// the ai → heuristic → concat ladder produced the result.
pub async fn merge_handler(
    State(state): State<AppState>,
    Json(req): Json<MergeRequest>,
) -> Json<MergeResponse> {
    let (merged, strategy) = state
        .assistant
        .merge(req.language, &req.existing, &req.snippet, req.use_ai)
        .await;
    Json(MergeResponse { merged, strategy })
}
