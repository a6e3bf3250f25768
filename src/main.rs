//! Room Relay Server binary.
//!
//! Starts the static HTTP listener and the WebSocket relay on their
//! configured ports and runs until interrupted. Logs go to stdout and to
//! the configured log file.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use room_relay::{RelayServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Log to stdout and to the log file.
    let log_dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "server.log".into());
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (file_writer, _file_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    info!("Room Relay Server v{}", VERSION);

    // Static asset server runs beside the relay; its failure is logged
    // but does not take the relay down.
    let http_addr = config.http_addr;
    let static_dir = config.static_dir.clone();
    tokio::spawn(async move {
        if let Err(e) = room_relay::http::serve(http_addr, static_dir).await {
            error!("HTTP server failed: {}", e);
        }
    });

    let server = Arc::new(RelayServer::new(config));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down servers...");
            signal_server.shutdown();
        }
    });

    server.run().await.context("WebSocket server failed")?;
    Ok(())
}
