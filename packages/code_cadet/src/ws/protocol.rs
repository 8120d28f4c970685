//! WebSocket Protocol Types
//!
//! Message types pushed from the server to connected preview pages.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::PreviewSession;

/// Messages sent FROM the server TO preview clients. There is no
/// client→server protocol beyond the connection handshake; inbound frames
/// other than Close are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// A session's triplet changed; carries the full new state.
    #[serde(rename = "code-update")]
    CodeUpdate {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "htmlCode")]
        html_code: String,
        #[serde(rename = "cssCode")]
        css_code: String,
        #[serde(rename = "jsCode")]
        js_code: String,
    },
}

impl ServerMessage {
    pub fn code_update(session: &PreviewSession) -> Self {
        ServerMessage::CodeUpdate {
            session_id: session.id.clone(),
            html_code: session.html_code.clone(),
            css_code: session.css_code.clone(),
            js_code: session.js_code.clone(),
        }
    }
}

/// Fan-out channel for code updates. Fire-and-forget: no acknowledgment, no
/// replay for late joiners (a freshly rendered page already has the current
/// triplet). A slow client drops intermediate updates; last write wins.
pub type CodeBroadcast = broadcast::Sender<ServerMessage>;

/// Create the code-update broadcast channel.
pub fn create_code_broadcast(capacity: usize) -> CodeBroadcast {
    let (tx, _) = broadcast::channel(capacity);
    tx
}
