//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every frame is a single JSON object; inbound messages carry an
//! `action` discriminant, outbound messages a `type` discriminant.

use serde::{Deserialize, Serialize};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room under a display name. Creates the room if it
    /// does not exist yet.
    Join {
        /// Client-supplied room identifier. Any string, compared by equality.
        room_id: String,
        /// Display name. Not validated; empty and duplicate names are allowed.
        player_name: String,
    },

    /// Signal readiness for the next phase.
    Ready,

    /// Relay an opaque game-state payload to the rest of the room.
    GameState {
        /// Opaque blob, echoed verbatim to the other members.
        state: serde_json::Value,
    },
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Membership or readiness changed in the recipient's room.
    RoomUpdate {
        /// Current roster. Ordering is implementation-defined; compare
        /// as a set of (name, ready) pairs.
        players: Vec<PlayerSummary>,
    },

    /// Every member of the room is ready. Sent once per all-ready transition.
    GameStart {
        /// Server time as fractional seconds since the Unix epoch.
        timestamp: f64,
    },

    /// A member's game-state payload, relayed to everyone else in the room.
    GameState {
        /// The payload exactly as the sender supplied it.
        state: serde_json::Value,
        /// Display name of the sending player.
        player: String,
    },
}

/// One roster entry in a [`ServerMessage::RoomUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Player display name.
    pub name: String,
    /// Whether the player has signaled readiness.
    pub ready: bool,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_from_raw_json() {
        let msg = ClientMessage::from_json(
            r#"{"action":"join","room_id":"r1","player_name":"Alice"}"#,
        )
        .unwrap();

        match msg {
            ClientMessage::Join { room_id, player_name } => {
                assert_eq!(room_id, "r1");
                assert_eq!(player_name, "Alice");
            }
            other => panic!("wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_ready_from_raw_json() {
        let msg = ClientMessage::from_json(r#"{"action":"ready"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ready));
    }

    #[test]
    fn test_game_state_preserves_payload() {
        let msg = ClientMessage::from_json(
            r#"{"action":"game_state","state":{"towers":[1,2],"wave":3}}"#,
        )
        .unwrap();

        match msg {
            ClientMessage::GameState { state } => {
                assert_eq!(state["wave"], 3);
                assert_eq!(state["towers"][0], 1);
            }
            other => panic!("wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(ClientMessage::from_json(r#"{"action":"fly"}"#).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        // join without player_name
        assert!(ClientMessage::from_json(r#"{"action":"join","room_id":"r1"}"#).is_err());
    }

    #[test]
    fn test_non_json_rejected() {
        assert!(ClientMessage::from_json("not json at all").is_err());
    }

    #[test]
    fn test_room_update_wire_shape() {
        let msg = ServerMessage::RoomUpdate {
            players: vec![
                PlayerSummary { name: "Alice".into(), ready: true },
                PlayerSummary { name: "Bob".into(), ready: false },
            ],
        };

        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"room_update""#));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["players"][0]["name"], "Alice");
        assert_eq!(value["players"][0]["ready"], true);
        assert_eq!(value["players"][1]["ready"], false);
    }

    #[test]
    fn test_game_start_wire_shape() {
        let msg = ServerMessage::GameStart { timestamp: 1724900000.25 };
        let json = msg.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "game_start");
        assert!((value["timestamp"].as_f64().unwrap() - 1724900000.25).abs() < 1e-9);
    }

    #[test]
    fn test_game_state_echoed_verbatim() {
        let payload = serde_json::json!({"nested": {"deep": [null, "x"]}});
        let msg = ServerMessage::GameState {
            state: payload.clone(),
            player: "Bob".into(),
        };

        let json = msg.to_json().unwrap();
        let parsed = ServerMessage::from_json(&json).unwrap();

        match parsed {
            ServerMessage::GameState { state, player } => {
                assert_eq!(state, payload);
                assert_eq!(player, "Bob");
            }
            other => panic!("wrong message type: {:?}", other),
        }
    }
}
