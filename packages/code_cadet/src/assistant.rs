//! AI Proxy
//!
//! Forwards user text to the external chat endpoint and relays the reply,
//! plus the AI-assisted merge path with its degradation ladder:
//! AI merge → heuristic merge → blind concatenation. Failures here are
//! always recovered locally — a broken assistant degrades the experience,
//! it never takes the server down.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use snippet_merge::Language;

use crate::config::AssistantConfig;
use crate::metrics::ServerMetrics;

/// Alternate keys under which the external endpoint has been observed to
/// put its reply text. First populated one wins.
const REPLY_KEYS: &[&str] = &["output", "response", "reply", "text", "message"];

/// Shown to the user when the assistant call fails or replies with nothing
/// usable.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't come up with an answer just now. Please try asking again!";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("no assistant endpoint configured")]
    NotConfigured,
    #[error("assistant request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("assistant reply had no usable text")]
    EmptyReply,
}

/// Which rung of the degradation ladder produced a merge result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Ai,
    Heuristic,
    Concat,
}

/// Client for the external chat endpoint (`POST {"chatInput": ...}`).
pub struct Assistant {
    client: reqwest::Client,
    endpoint: Option<String>,
    metrics: Arc<ServerMetrics>,
}

impl Assistant {
    /// Build the client with the configured request timeout. A builder
    /// failure is a startup error; it must not produce a client that
    /// silently ignores the timeout.
    pub fn new(
        config: &AssistantConfig,
        metrics: Arc<ServerMetrics>,
    ) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            metrics,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send one chat message and return the reply text.
    ///
    /// Network and decode failures surface as errors for the caller to map
    /// to a friendly message; a well-formed response with no usable text
    /// under any known key falls back to the apology string right here
    /// (that is a reply, just not a useful one).
    pub async fn chat(&self, message: &str) -> Result<String, AssistantError> {
        let endpoint = self.endpoint.as_deref().ok_or(AssistantError::NotConfigured)?;
        self.metrics.assistant_request();

        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "chatInput": message }))
            .send()
            .await
            .inspect_err(|_| self.metrics.assistant_failure())?;

        let body: Value = response
            .json()
            .await
            .inspect_err(|_| self.metrics.assistant_failure())?;

        Ok(extract_reply_text(&body).unwrap_or_else(|| {
            warn!("assistant reply had no text under any known key");
            self.metrics.assistant_failure();
            FALLBACK_REPLY.to_string()
        }))
    }

    /// Merge an incoming snippet into existing code, preferring an
    /// AI-performed merge and degrading through the ladder when it fails or
    /// returns something implausible.
    pub async fn merge(
        &self,
        language: Language,
        existing: &str,
        incoming: &str,
        use_ai: bool,
    ) -> (String, MergeStrategy) {
        if use_ai && self.is_configured() {
            match self.ai_merge(language, existing, incoming).await {
                Ok(merged) => return (merged, MergeStrategy::Ai),
                Err(e) => {
                    debug!("ai merge unavailable ({}), using heuristic", e);
                }
            }
        }

        match snippet_merge::try_merge(language, existing, incoming) {
            Some(merged) => (merged, MergeStrategy::Heuristic),
            None => (
                snippet_merge::merge(language, existing, incoming),
                MergeStrategy::Concat,
            ),
        }
    }

    async fn ai_merge(
        &self,
        language: Language,
        existing: &str,
        incoming: &str,
    ) -> Result<String, AssistantError> {
        let prompt = merge_prompt(language, existing, incoming);
        let reply = self.chat(&prompt).await?;
        if reply == FALLBACK_REPLY {
            return Err(AssistantError::EmptyReply);
        }

        let merged = strip_code_fence(&reply);
        if !plausible_merge(merged, existing, incoming) {
            self.metrics.assistant_failure();
            return Err(AssistantError::EmptyReply);
        }
        Ok(merged.to_string())
    }
}

fn merge_prompt(language: Language, existing: &str, incoming: &str) -> String {
    let lang = match language {
        Language::Html => "HTML",
        Language::Css => "CSS",
        Language::Js => "JavaScript",
    };
    format!(
        "Merge the following new {lang} snippet into the existing {lang} code. \
         Keep everything from the existing code that the snippet does not replace. \
         Reply with ONLY the merged {lang} code, no explanations.\n\n\
         Existing code:\n{existing}\n\nNew snippet:\n{incoming}"
    )
}

/// First populated string under any known reply key.
fn extract_reply_text(body: &Value) -> Option<String> {
    REPLY_KEYS
        .iter()
        .filter_map(|key| body.get(key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// A merged result shorter than half the longer input lost too much to be
/// trusted; treat it as a failed merge.
fn plausible_merge(merged: &str, existing: &str, incoming: &str) -> bool {
    let floor = existing.trim().len().max(incoming.trim().len()) / 2;
    merged.trim().len() >= floor
}

/// Models often wrap "code only" replies in a markdown fence anyway.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.split_once('\n').map(|(_, body)| body) else {
        return trimmed;
    };
    body.strip_suffix("```").map(str::trim).unwrap_or(trimmed)
}
