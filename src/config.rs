//! Server Configuration
//!
//! Fixed defaults matching the deployed ports (WebSocket 8001, static
//! HTTP 8000), overridable through environment variables. There are no
//! CLI flags.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WebSocket bind address.
    pub ws_addr: SocketAddr,
    /// Static HTTP bind address.
    pub http_addr: SocketAddr,
    /// Directory the static HTTP server serves from.
    pub static_dir: PathBuf,
    /// Log file path.
    pub log_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_addr: "0.0.0.0:8001".parse().unwrap(),
            http_addr: "0.0.0.0:8000".parse().unwrap(),
            static_dir: PathBuf::from("."),
            log_file: PathBuf::from("server.log"),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            ws_addr: addr_var("ROOM_RELAY_WS_ADDR", defaults.ws_addr),
            http_addr: addr_var("ROOM_RELAY_HTTP_ADDR", defaults.http_addr),
            static_dir: std::env::var("ROOM_RELAY_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            log_file: std::env::var("ROOM_RELAY_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        }
    }
}

fn addr_var(name: &str, default: SocketAddr) -> SocketAddr {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {} value {:?}, using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
