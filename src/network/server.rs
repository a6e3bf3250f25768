//! WebSocket Relay Server
//!
//! Accepts WebSocket connections and runs one protocol handler task per
//! connection. Handlers decode inbound events, apply them to the shared
//! registry, and fan the resulting notifications out to room members.
//! Every handler exit path funnels into a single unregister call, so no
//! connection is ever left registered after its channel ends.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast as signal, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::network::broadcast::{self, FrameSender, OUTBOUND_QUEUE};
use crate::network::protocol::ClientMessage;
use crate::registry::{ConnId, Registry, SharedRegistry};

/// Relay server errors.
#[derive(Debug, thiserror::Error)]
pub enum RelayServerError {
    /// Failed to bind or serve on a listener.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// The room coordination server.
pub struct RelayServer {
    /// Server configuration.
    config: ServerConfig,
    /// Shared connection registry and room table.
    registry: SharedRegistry,
    /// Shutdown signal.
    shutdown_tx: signal::Sender<()>,
}

impl RelayServer {
    /// Create a new relay server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = signal::channel(1);

        Self { config, registry: Registry::shared(), shutdown_tx }
    }

    /// Handle to the shared registry, for diagnostics and tests.
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Run the accept loop until shutdown is signaled.
    pub async fn run(&self) -> Result<(), RelayServerError> {
        let listener = TcpListener::bind(self.config.ws_addr).await?;
        info!("WebSocket server listening on {}", self.config.ws_addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Spawn the protocol handler for one accepted connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let registry = self.registry.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let conn = ConnId::new();
            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (frame_tx, mut frame_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);

            // Writer task: drains this connection's outbound queue into
            // text frames so broadcasts only ever await a local enqueue.
            let writer_task = tokio::spawn(async move {
                while let Some(text) = frame_rx.recv().await {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            loop {
                tokio::select! {
                    frame = ws_receiver.next() => {
                        match frame {
                            Some(Ok(Message::Text(text))) => {
                                match ClientMessage::from_json(&text) {
                                    Ok(msg) => dispatch(&registry, conn, &frame_tx, msg).await,
                                    Err(e) => {
                                        // Malformed frames are dropped; the
                                        // connection stays open.
                                        debug!("Ignoring malformed message from {}: {}", conn, e);
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Connection {} closed", conn);
                                break;
                            }
                            Some(Ok(_)) => {
                                // Ping/pong/binary frames carry no events.
                            }
                            Some(Err(e)) => {
                                debug!("Connection {} ended: {}", conn, e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            // Single teardown path for every exit above. Unregister is
            // idempotent, so an earlier error path cannot double-count.
            let update = registry.write().await.unregister(conn);
            if let Some(update) = update {
                broadcast::send(update).await;
            }

            writer_task.abort();
            debug!("Connection {} cleaned up", conn);
        });
    }

    /// Signal the accept loop to stop. In-flight connections are not drained.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Active registered player count.
    pub async fn player_count(&self) -> usize {
        self.registry.read().await.player_count()
    }

    /// Live room count.
    pub async fn room_count(&self) -> usize {
        self.registry.read().await.room_count()
    }
}

/// Apply one decoded client event to the registry and deliver the
/// resulting notifications. The write guard is dropped before any
/// delivery begins.
async fn dispatch(
    registry: &SharedRegistry,
    conn: ConnId,
    frame_tx: &FrameSender,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::Join { room_id, player_name } => {
            info!("Player {} joined room {}", player_name, room_id);
            let out = registry
                .write()
                .await
                .register(conn, frame_tx.clone(), room_id, player_name);
            for outbound in out {
                broadcast::send(outbound).await;
            }
        }
        ClientMessage::Ready => {
            let out = registry.write().await.mark_ready(conn);
            for outbound in out {
                broadcast::send(outbound).await;
            }
        }
        ClientMessage::GameState { state } => {
            let out = registry.read().await.relay_state(conn, state);
            if let Some(outbound) = out {
                broadcast::send(outbound).await;
            }
        }
    }
}
