//! Network Layer
//!
//! WebSocket transport, wire protocol, and broadcast fan-out. All room
//! bookkeeping lives in [`crate::registry`]; this layer only moves frames.

pub mod broadcast;
pub mod protocol;
pub mod server;

pub use broadcast::{FrameSender, Outbound, Peer};
pub use protocol::{ClientMessage, PlayerSummary, ServerMessage};
pub use server::{RelayServer, RelayServerError};
