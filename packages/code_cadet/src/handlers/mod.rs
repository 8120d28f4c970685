pub mod assistant;
pub mod health;
pub mod preview;
pub mod websocket;

// Re-export all handlers for easy route registration
pub use assistant::{chat_handler, merge_handler};
pub use health::{health_handler, health_live_handler, metrics_handler};
pub use preview::{create_or_update_preview, serve_preview};
pub use websocket::preview_ws_handler;
