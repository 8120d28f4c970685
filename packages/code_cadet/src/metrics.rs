//! Server metrics for observability
//!
//! Provides runtime metrics for monitoring server health and performance.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Server-wide metrics
#[derive(Debug, Default)]
pub struct ServerMetrics {
    // Connection metrics
    /// Currently connected preview WebSocket clients
    pub active_connections: AtomicU64,
    /// Total connections since server start
    pub total_connections: AtomicU64,

    // Session metrics
    /// Sessions created since server start
    pub sessions_created: AtomicU64,
    /// Session updates applied
    pub session_updates: AtomicU64,
    /// Requests that hit an unknown session id
    pub session_misses: AtomicU64,

    // Broadcast metrics
    /// Code-update events published to the broadcast channel
    pub broadcasts_published: AtomicU64,
    /// Code-update frames actually delivered to clients
    pub frames_sent: AtomicU64,
    /// Frames dropped because a client receiver lagged
    pub frames_lagged: AtomicU64,

    // Assistant metrics
    /// Calls forwarded to the external assistant endpoint
    pub assistant_requests: AtomicU64,
    /// Assistant calls that failed or returned an unusable reply
    pub assistant_failures: AtomicU64,

    /// Server start time (for uptime calculation)
    start_time: Option<Instant>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    // Connection tracking
    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    // Session tracking
    pub fn session_created(&self) {
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_updated(&self) {
        self.session_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_miss(&self) {
        self.session_misses.fetch_add(1, Ordering::Relaxed);
    }

    // Broadcast tracking
    pub fn broadcast_published(&self) {
        self.broadcasts_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_lagged(&self, n: u64) {
        self.frames_lagged.fetch_add(n, Ordering::Relaxed);
    }

    // Assistant tracking
    pub fn assistant_request(&self) {
        self.assistant_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn assistant_failure(&self) {
        self.assistant_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections: ConnectionMetrics {
                active: self.active_connections.load(Ordering::Relaxed),
                total: self.total_connections.load(Ordering::Relaxed),
            },
            sessions: SessionMetrics {
                created: self.sessions_created.load(Ordering::Relaxed),
                updates: self.session_updates.load(Ordering::Relaxed),
                misses: self.session_misses.load(Ordering::Relaxed),
            },
            broadcast: BroadcastMetrics {
                published: self.broadcasts_published.load(Ordering::Relaxed),
                frames_sent: self.frames_sent.load(Ordering::Relaxed),
                frames_lagged: self.frames_lagged.load(Ordering::Relaxed),
            },
            assistant: AssistantMetrics {
                requests: self.assistant_requests.load(Ordering::Relaxed),
                failures: self.assistant_failures.load(Ordering::Relaxed),
            },
            uptime_secs: self.uptime_secs(),
        }
    }
}

/// Point-in-time view of all metrics (for /metrics and /health)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub connections: ConnectionMetrics,
    pub sessions: SessionMetrics,
    pub broadcast: BroadcastMetrics,
    pub assistant: AssistantMetrics,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    pub active: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub created: u64,
    pub updates: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastMetrics {
    pub published: u64,
    pub frames_sent: u64,
    pub frames_lagged: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMetrics {
    pub requests: u64,
    pub failures: u64,
}

/// Health summary returned from /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub sessions: u64,
    pub connections: u64,
    pub uptime_secs: u64,
}
