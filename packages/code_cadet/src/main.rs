use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::cors::CorsLayer;
use tower_http::trace::MakeSpan;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::prelude::*;
use uuid::Uuid;

mod assistant;
mod config;
mod handlers;
mod metrics;
mod render;
mod session;
#[cfg(test)]
mod test_helpers;
mod ws;

use crate::assistant::Assistant;
use crate::config::{AssistantConfig, CadetConfig, FileConfig, ServerConfig};
use crate::metrics::ServerMetrics;
use crate::session::SessionStore;

/// Custom span maker that adds a unique request ID to each incoming request
#[derive(Clone)]
struct RequestIdMakeSpan;

impl<B> MakeSpan<B> for RequestIdMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> tracing::Span {
        let request_id = Uuid::new_v4().to_string();
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

#[derive(Parser)]
#[command(name = "cadet")]
#[command(about = "Live-preview server for a browser coding sandbox")]
struct Cli {
    /// Port for the web server
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(short = 'b', long)]
    host: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Custom data directory (defaults to ~/.codecadet)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub sessions: Arc<SessionStore>,
    /// Code-update fan-out to connected preview pages
    pub broadcast: ws::CodeBroadcast,
    pub assistant: Arc<Assistant>,
    /// Server metrics for observability
    pub metrics: Arc<ServerMetrics>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_directive = if cli.debug {
        "cadet=debug,tower_http=debug,info"
    } else {
        "cadet=info,tower_http=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    info!("Starting Code Cadet - live preview server");

    let config = CadetConfig::new(cli.data_dir.clone())?;

    let file_config: FileConfig = config::load_config(&config.data_dir)
        .extract()
        .context("Failed to load configuration")?;

    // CLI args override config.toml / env vars
    let host = cli
        .host
        .or_else(|| file_config.server.host.clone())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = cli.port.or(file_config.server.port).unwrap_or(5000);

    let server_config = ServerConfig::from_file(&file_config.server);
    let assistant_config = AssistantConfig::from_file(&file_config.assistant);
    if assistant_config.endpoint.is_some() {
        info!(
            "Assistant endpoint configured (timeout: {}s)",
            assistant_config.timeout.as_secs()
        );
    } else {
        info!("Assistant disabled (set CADET_ASSISTANT__ENDPOINT to enable)");
    }

    // Initialize metrics
    let metrics = Arc::new(ServerMetrics::new());

    let app_state = AppState {
        sessions: Arc::new(SessionStore::new()),
        broadcast: ws::create_code_broadcast(server_config.broadcast_capacity),
        assistant: Arc::new(Assistant::new(&assistant_config, metrics.clone())?),
        metrics,
    };

    // Build routes
    let app = Router::new()
        // Preview routes
        .route("/api/preview", post(handlers::create_or_update_preview))
        .route("/preview/{file}", get(handlers::serve_preview))
        .route("/ws", get(handlers::preview_ws_handler))
        // Assistant routes
        .route("/api/assistant/chat", post(handlers::chat_handler))
        .route("/api/assistant/merge", post(handlers::merge_handler))
        // Health endpoints
        .route("/health", get(handlers::health_handler))
        .route("/health/live", get(handlers::health_live_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Code Cadet listening on http://{}", actual_addr);
    info!("API endpoints:");
    info!("  POST   /api/preview         - Create or update a preview session");
    info!("  GET    /preview/:id.html    - Rendered preview document");
    info!("  GET    /ws                  - Live-reload WebSocket");
    info!("  POST   /api/assistant/chat  - Chat with the assistant");
    info!("  POST   /api/assistant/merge - Merge a snippet into existing code");

    // Create shutdown signal handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received shutdown signal, shutting down...");
    };

    // Run server with graceful shutdown; sessions are in-memory only, so
    // there is nothing to flush on the way out.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}
