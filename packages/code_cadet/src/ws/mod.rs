//! Live-reload WebSocket channel
//!
//! One connection per open preview page. The server pushes `code-update`
//! frames for every session update; clients filter on their own session id.

mod handler;
mod protocol;

pub use handler::handle_preview_socket;
pub use protocol::{CodeBroadcast, ServerMessage, create_code_broadcast};
