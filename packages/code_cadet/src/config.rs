use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// =============================================================================
// Unified config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
// Two equivalent ways to configure:
//
//   config.toml:     [assistant]
//                    endpoint = "https://example.com/webhook/chat"
//
//   env var:         CADET_ASSISTANT__ENDPOINT=...   (double underscore = nesting)
//
//   (single underscore stays within field names: CADET_ASSISTANT__TIMEOUT_SECS)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub assistant: AssistantFileConfig,
}

/// Server tuning knobs (lives under `[server]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// External assistant tunables (lives under `[assistant]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantFileConfig {
    /// HTTP endpoint accepting `{"chatInput": "..."}`. None disables the proxy.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_assistant_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssistantFileConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_assistant_timeout_secs(),
        }
    }
}

fn default_broadcast_capacity() -> usize {
    256
}

fn default_assistant_timeout_secs() -> u64 {
    30
}

/// Build a figment that layers: defaults → config.toml → CADET_* env vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `CADET_SERVER__PORT=8080`  →  `server.port = 8080`
///   `CADET_ASSISTANT__ENDPOINT=...`  →  `assistant.endpoint = ...`
pub fn load_config(data_dir: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(data_dir.join("config.toml")))
        .merge(Env::prefixed("CADET_").split("__"))
}

// =============================================================================
// Runtime config structs (derived from FileConfig, used throughout the server)
// =============================================================================

/// Server configuration for runtime behavior.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Broadcast channel capacity for code-update fan-out
    pub broadcast_capacity: usize,
}

impl ServerConfig {
    pub fn from_file(fc: &ServerFileConfig) -> Self {
        Self {
            broadcast_capacity: fc.broadcast_capacity,
        }
    }
}

/// Assistant proxy configuration (runtime view).
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl AssistantConfig {
    pub fn from_file(fc: &AssistantFileConfig) -> Self {
        Self {
            endpoint: fc.endpoint.clone(),
            timeout: Duration::from_secs(fc.timeout_secs),
        }
    }
}

// =============================================================================
// Directory layout config (not tunable via figment — derived from --data-dir)
// =============================================================================

#[derive(Clone, Debug)]
pub struct CadetConfig {
    pub data_dir: PathBuf,
}

impl CadetConfig {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = custom_dir.unwrap_or_else(|| {
            dirs::home_dir()
                .expect("Could not find home directory")
                .join(".codecadet")
        });

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        info!("Data directory: {}", data_dir.display());

        Ok(Self { data_dir })
    }

    pub fn config_toml_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }
}
