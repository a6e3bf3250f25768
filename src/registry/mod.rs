//! Connection Registry
//!
//! The single source of truth for who is connected and which room they are
//! in. Mutating operations run behind one write lock (see [`SharedRegistry`])
//! and return the notifications they produced instead of sending them, so
//! callers drop the lock before any delivery and every recipient observes a
//! committed post-mutation snapshot.

pub mod room;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::network::broadcast::{FrameSender, Outbound, Peer};
use crate::network::protocol::{PlayerSummary, ServerMessage};
use room::Room;

/// Unique identity for one WebSocket connection, valid for the lifetime
/// of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnId(Uuid);

impl ConnId {
    /// Mint a fresh connection identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The identity and readiness state associated with one connection.
#[derive(Debug)]
pub struct Player {
    /// Display name given at join time.
    pub name: String,
    /// The room this connection belongs to.
    pub room_id: String,
    /// Whether the player has signaled readiness.
    pub ready: bool,
    /// Outbound frame queue for this connection.
    tx: FrameSender,
}

/// Registry of live connections and the room table behind them.
#[derive(Debug, Default)]
pub struct Registry {
    players: BTreeMap<ConnId, Player>,
    rooms: BTreeMap<String, Room>,
}

/// Registry shared across connection handler tasks. All mutations go
/// through the write guard, which serializes them.
pub type SharedRegistry = Arc<RwLock<Registry>>;

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry behind its shared lock.
    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Register a connection in a room, creating the room on first join.
    ///
    /// Names are not validated; empty and duplicate names are permitted.
    /// A join from an already-registered connection moves it: the old
    /// membership is released first, so a connection never belongs to
    /// more than one room.
    pub fn register(
        &mut self,
        conn: ConnId,
        tx: FrameSender,
        room_id: String,
        player_name: String,
    ) -> Vec<Outbound> {
        let mut out = Vec::new();

        if self.players.contains_key(&conn) {
            if let Some(update) = self.unregister(conn) {
                out.push(update);
            }
        }

        self.rooms.entry(room_id.clone()).or_default().insert(conn);
        self.players.insert(
            conn,
            Player { name: player_name, room_id: room_id.clone(), ready: false, tx },
        );

        out.push(self.room_update(&room_id));
        out
    }

    /// Remove a connection from the registry and its room.
    ///
    /// Idempotent: unknown connections are a no-op, so the error and
    /// normal-close paths may both invoke it. Deletes the room when the
    /// last member leaves (returning no notification), otherwise returns
    /// a `room_update` for the remaining members.
    pub fn unregister(&mut self, conn: ConnId) -> Option<Outbound> {
        let player = self.players.remove(&conn)?;
        let room_id = player.room_id;

        let room = self.rooms.get_mut(&room_id)?;
        room.remove(&conn);

        if room.is_empty() {
            self.rooms.remove(&room_id);
            None
        } else {
            Some(self.room_update(&room_id))
        }
    }

    /// Mark a connection ready. Unknown connections are a silent no-op.
    ///
    /// Returns a `room_update`, followed by one `game_start` when this
    /// call completes the ready set. The start fires only on the
    /// transition into all-ready: a duplicate `ready` while the set is
    /// already complete does not re-fire, and a later joiner re-arms the
    /// trigger by breaking the equality.
    pub fn mark_ready(&mut self, conn: ConnId) -> Vec<Outbound> {
        let Some(player) = self.players.get_mut(&conn) else {
            return Vec::new();
        };
        player.ready = true;
        let room_id = player.room_id.clone();

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Vec::new();
        };
        let was_complete = room.all_ready();
        room.mark_ready(conn);
        let starts = !was_complete && room.all_ready();

        let mut out = vec![self.room_update(&room_id)];
        if starts {
            out.push(Outbound::to_all(
                ServerMessage::GameStart { timestamp: epoch_seconds() },
                self.peers(&room_id),
            ));
        }
        out
    }

    /// Relay an opaque state payload to the sender's room, excluding the
    /// sender. Unknown connections are a silent no-op.
    pub fn relay_state(&self, conn: ConnId, state: serde_json::Value) -> Option<Outbound> {
        let player = self.players.get(&conn)?;
        Some(Outbound::excluding(
            ServerMessage::GameState { state, player: player.name.clone() },
            self.peers(&player.room_id),
            conn,
        ))
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of registered connections.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether a room currently exists.
    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Member count of a room, if it exists.
    pub fn room_members(&self, room_id: &str) -> Option<usize> {
        self.rooms.get(room_id).map(Room::member_count)
    }

    /// Build the `room_update` notification for a room's current roster.
    fn room_update(&self, room_id: &str) -> Outbound {
        let players = self
            .rooms
            .get(room_id)
            .into_iter()
            .flat_map(Room::members)
            .filter_map(|conn| self.players.get(conn))
            .map(|p| PlayerSummary { name: p.name.clone(), ready: p.ready })
            .collect();

        Outbound::to_all(ServerMessage::RoomUpdate { players }, self.peers(room_id))
    }

    /// Collect the delivery targets for a room's full member set.
    fn peers(&self, room_id: &str) -> Vec<Peer> {
        self.rooms
            .get(room_id)
            .into_iter()
            .flat_map(Room::members)
            .filter_map(|conn| {
                self.players.get(conn).map(|p| Peer { id: *conn, tx: p.tx.clone() })
            })
            .collect()
    }

    /// Panic if any structural invariant is violated. Test support.
    #[cfg(test)]
    fn assert_invariants(&self) {
        let mut seen = 0usize;
        for (room_id, room) in &self.rooms {
            assert!(!room.is_empty(), "room {:?} left empty in table", room_id);
            assert!(room.ready_count() <= room.member_count());
            for conn in room.members() {
                seen += 1;
                let player = self
                    .players
                    .get(conn)
                    .unwrap_or_else(|| panic!("member of {:?} has no player entry", room_id));
                assert_eq!(&player.room_id, room_id);
                assert_eq!(player.ready, room.is_ready(conn));
            }
        }
        // Every player accounted for by exactly one room membership.
        assert_eq!(seen, self.players.len());
    }
}

/// Current time as fractional seconds since the Unix epoch.
fn epoch_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
