//! WebSocket Handler
//!
//! Per-connection loop for preview pages: forward every code-update frame,
//! tolerate lag, stop on disconnect.

use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::metrics::ServerMetrics;
use crate::ws::CodeBroadcast;

/// Handle one preview client connection.
///
/// Subscribes to the code-update broadcast and forwards every event as a
/// JSON text frame. Delivery is fire-and-forget: a lagged receiver skips
/// the missed updates (the next frame carries the full current triplet, so
/// last-write-wins is fine). Client frames are ignored apart from Close.
pub async fn handle_preview_socket(
    socket: WebSocket,
    broadcast_tx: CodeBroadcast,
    metrics: Arc<ServerMetrics>,
) {
    metrics.connection_opened();
    debug!("preview client connected");

    let mut rx = broadcast_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(msg) => {
                        let json = match serde_json::to_string(&msg) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("failed to serialize code update: {}", e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                        metrics.frame_sent();
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        metrics.frames_lagged(n);
                        warn!("preview client lagged by {} updates", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {} // no client→server protocol; ignore
                }
            }
        }
    }

    metrics.connection_closed();
    debug!("preview client disconnected");
}
