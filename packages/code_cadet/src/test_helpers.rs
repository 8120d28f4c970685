use std::sync::Arc;

use crate::AppState;
use crate::assistant::Assistant;
use crate::config::{AssistantConfig, AssistantFileConfig, ServerConfig, ServerFileConfig};
use crate::metrics::ServerMetrics;
use crate::session::SessionStore;
use crate::ws;

/// Build a fully-wired `AppState` with an empty session store and no
/// assistant endpoint configured. Suitable for handler tests driven through
/// `tower::ServiceExt::oneshot`. State is entirely in-memory, so there is
/// no scratch directory to hold on to.
pub fn test_app_state() -> AppState {
    let server_config = ServerConfig::from_file(&ServerFileConfig::default());
    let assistant_config = AssistantConfig::from_file(&AssistantFileConfig::default());
    let metrics = Arc::new(ServerMetrics::new());

    AppState {
        sessions: Arc::new(SessionStore::new()),
        broadcast: ws::create_code_broadcast(server_config.broadcast_capacity),
        assistant: Arc::new(
            Assistant::new(&assistant_config, metrics.clone()).expect("assistant client"),
        ),
        metrics,
    }
}
