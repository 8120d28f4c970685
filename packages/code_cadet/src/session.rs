use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// One live-preview session: a code triplet bound to a generated id for the
/// lifetime of the process. Never explicitly deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSession {
    pub id: String,
    pub html_code: String,
    pub css_code: String,
    pub js_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The three source buffers a session carries. No size limit, no syntax
/// validation — learners are allowed to write broken code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTriplet {
    #[serde(default)]
    pub html_code: String,
    #[serde(default)]
    pub css_code: String,
    #[serde(default)]
    pub js_code: String,
}

/// Fields to merge into an existing session. `None` leaves a buffer alone.
#[derive(Debug, Clone, Default)]
pub struct TripletPatch {
    pub html_code: Option<String>,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
}

/// In-memory session store. Constructed once at startup and handed to
/// request handlers through `AppState` — no module-level globals.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, PreviewSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session with a freshly generated id.
    ///
    /// Uniqueness rests entirely on the id generator; two 13-character
    /// base-36 fragments make a collision overwhelmingly unlikely but not
    /// impossible, which is acceptable for a toy store.
    pub async fn create(&self, triplet: CodeTriplet) -> PreviewSession {
        let now = Utc::now();
        let session = PreviewSession {
            id: generate_session_id(),
            html_code: triplet.html_code,
            css_code: triplet.css_code,
            js_code: triplet.js_code,
            created_at: now,
            updated_at: now,
        };
        debug!(session_id = %session.id, "created preview session");
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        session
    }

    /// Merge the provided fields into an existing session and bump
    /// `updated_at` (clamped non-decreasing). Returns `None` for an unknown
    /// id; an unknown id never creates a session.
    pub async fn update(&self, id: &str, patch: TripletPatch) -> Option<PreviewSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        if let Some(html) = patch.html_code {
            session.html_code = html;
        }
        if let Some(css) = patch.css_code {
            session.css_code = css;
        }
        if let Some(js) = patch.js_code {
            session.js_code = js;
        }
        session.updated_at = Utc::now().max(session.updated_at);
        Some(session.clone())
    }

    pub async fn get(&self, id: &str) -> Option<PreviewSession> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Two concatenated random base-36 fragments, 13 characters each.
fn generate_session_id() -> String {
    format!("{}{}", base36_fragment(), base36_fragment())
}

fn base36_fragment() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    (0..13)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
