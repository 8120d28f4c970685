use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use crate::AppState;
use crate::ws;

/// Upgrade to the live-reload socket. Every connected page receives every
/// code-update frame and filters on its own session id client-side.
pub async fn preview_ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let broadcast_tx = state.broadcast.clone();
    let metrics = state.metrics.clone();

    ws.on_upgrade(move |socket| ws::handle_preview_socket(socket, broadcast_tx, metrics))
}
