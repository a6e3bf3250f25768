//! # Room Relay Server
//!
//! Real-time room coordination over WebSocket: clients join named rooms,
//! signal readiness, and broadcast opaque game-state payloads to the other
//! members of their room.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ROOM RELAY SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  registry/        - Who is connected, and where              │
//! │  ├── mod.rs       - Connection registry + mutating ops       │
//! │  └── room.rs      - Room table (members + ready sets)        │
//! │                                                              │
//! │  network/         - Transport and fan-out                    │
//! │  ├── protocol.rs  - JSON message types                       │
//! │  ├── broadcast.rs - Best-effort concurrent delivery          │
//! │  └── server.rs    - Accept loop + per-connection handler     │
//! │                                                              │
//! │  config.rs        - Ports, paths, env overrides              │
//! │  http.rs          - Static assets with open CORS             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency
//!
//! All registry mutations run behind a single write lock and return their
//! notifications instead of sending them, so deliveries always describe a
//! fully committed state and no lock is held across an await. Broadcast
//! delivery is best-effort: one closed peer never blocks the rest of a
//! room or surfaces an error to the sender.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod http;
pub mod network;
pub mod registry;

// Re-export commonly used types
pub use config::ServerConfig;
pub use network::protocol::{ClientMessage, PlayerSummary, ServerMessage};
pub use network::server::{RelayServer, RelayServerError};
pub use registry::{ConnId, Player, Registry, SharedRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
