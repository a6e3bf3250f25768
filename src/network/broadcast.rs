//! Broadcast Engine
//!
//! Best-effort concurrent fan-out of one message to a set of connections.
//! The message is serialized once; each delivery is an independent enqueue
//! onto the recipient's outbound channel. A closed channel on one recipient
//! never aborts the batch and is never surfaced to the caller.

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::{error, trace};

use crate::network::protocol::ServerMessage;
use crate::registry::ConnId;

/// Capacity of each connection's outbound frame queue.
pub const OUTBOUND_QUEUE: usize = 64;

/// Sending half of a connection's outbound frame queue. The writer task
/// on the other end drains it into WebSocket text frames.
pub type FrameSender = mpsc::Sender<String>;

/// One delivery target.
#[derive(Debug, Clone)]
pub struct Peer {
    /// Connection identity, used for exclusion.
    pub id: ConnId,
    /// Outbound frame queue for this connection.
    pub tx: FrameSender,
}

/// A message paired with the set of connections it should reach.
///
/// Produced by registry mutations while the registry lock is held and
/// delivered after the lock is dropped, so recipients always observe a
/// committed post-mutation snapshot.
#[derive(Debug, Clone)]
pub struct Outbound {
    /// The message to deliver.
    pub message: ServerMessage,
    /// Delivery targets.
    pub targets: Vec<Peer>,
    /// Connection to skip, if any (the sender of a relayed payload).
    pub exclude: Option<ConnId>,
}

impl Outbound {
    /// Message for every target.
    pub fn to_all(message: ServerMessage, targets: Vec<Peer>) -> Self {
        Self { message, targets, exclude: None }
    }

    /// Message for every target except `sender`.
    pub fn excluding(message: ServerMessage, targets: Vec<Peer>, sender: ConnId) -> Self {
        Self { message, targets, exclude: Some(sender) }
    }
}

/// Deliver one outbound message to every non-excluded target, concurrently.
///
/// Fire-and-forget: individual send failures are counted at trace level
/// and otherwise discarded. Completes once every local enqueue has been
/// attempted; remote acknowledgement is never awaited.
pub async fn send(outbound: Outbound) {
    let text = match outbound.message.to_json() {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to serialize outbound message: {}", e);
            return;
        }
    };

    let sends = outbound
        .targets
        .iter()
        .filter(|peer| outbound.exclude != Some(peer.id))
        .map(|peer| peer.tx.send(text.clone()));

    let results = join_all(sends).await;

    let dropped = results.iter().filter(|r| r.is_err()).count();
    if dropped > 0 {
        trace!("{} of {} deliveries dropped (closed channel)", dropped, results.len());
    }
}
