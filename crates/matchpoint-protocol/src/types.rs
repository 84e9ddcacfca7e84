//! Core protocol types for Matchpoint's wire format.
//!
//! This module defines every structure that travels "on the wire" between
//! a game client and the pairing server: identity newtypes, the move
//! request shape, and the two message enums (client→server and
//! server→client).
//!
//! The wire format is JSON, one object per frame, tagged by a lowercase
//! `"type"` field: `{"type":"move","from":"e2","to":"e4"}`. The lowercase
//! tags are the protocol contract — browser and native clients match on
//! them as strings.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for one live connection.
///
/// Newtype over `u64` so a `ConnId` can never be confused with a
/// [`SessionId`] in a signature. Assigned by the transport when the
/// connection is accepted, and never reused for the lifetime of the
/// process; once the connection drops, the id is dead.
///
/// `#[serde(transparent)]` keeps the JSON representation a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A unique identifier for a game session (one paired match).
///
/// Allocated from a counter when two queued connections are paired.
/// Session identity is a structured field everywhere — participant
/// relationships are never reconstructed by parsing an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Side assignment for one participant of a session.
///
/// Serialized lowercase (`"white"` / `"black"`) because that is what the
/// `start` payload carries and what clients display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// MoveRequest
// ---------------------------------------------------------------------------

/// A candidate move as submitted by a client.
///
/// `from` and `to` are square names in the game's own coordinate notation
/// (e.g. `"e2"`, `"e4"`). The optional `promotion` piece letter is folded
/// into the UCI string when present (`e7e8q`). The server never interprets
/// squares itself — legality is entirely the rules engine's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
}

impl MoveRequest {
    /// Builds the UCI-style string for this request: `from + to` plus the
    /// promotion letter when present. This is the form echoed back in
    /// `move` and `invalid` payloads.
    pub fn uci(&self) -> String {
        let mut uci =
            String::with_capacity(self.from.len() + self.to.len() + 1);
        uci.push_str(&self.from);
        uci.push_str(&self.to);
        if let Some(p) = self.promotion {
            uci.push(p);
        }
        uci
    }
}

// ---------------------------------------------------------------------------
// ClientMessage — what clients send
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` produces the
/// internally tagged lowercase form the protocol specifies:
/// `{"type":"join"}`, `{"type":"move","from":"e2","to":"e4"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "I want a game." Enters the matchmaking queue.
    Join,

    /// A move attempt for the session this connection is seated in.
    Move(MoveRequest),

    /// Request a rematch. The session restarts once both sides ask.
    Replay,

    /// Voluntarily leave the current session.
    Quit,
}

// ---------------------------------------------------------------------------
// ServerMessage — what the server sends
// ---------------------------------------------------------------------------

/// Messages the server sends to clients.
///
/// `state` payloads are opaque board encodings produced by the rules
/// engine (FEN for chess-like games); the orchestrator relays them
/// without inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Pairing completed. Sent individually — each participant gets
    /// their own assigned color.
    Start { state: String, color: Color },

    /// A move was accepted. Broadcast to both participants.
    Move { uci: String, state: String },

    /// A move was rejected. Sent to the requester only.
    Invalid { uci: String },

    /// The session reached a terminal position.
    GameOver { result: String },

    /// Both sides agreed to a rematch; play resumes from the fresh state.
    ReplayStart { state: String },

    /// The peer quit or disconnected; the session is gone.
    OpponentLeft,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire protocol fixes exact JSON shapes — lowercase tags and
    //! field names. These tests pin them down, because a serde-attribute
    //! regression here breaks every client silently.

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_conn_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ConnId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_conn_id_display() {
        assert_eq!(ConnId(7).to_string(), "C-7");
    }

    #[test]
    fn test_session_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&SessionId(99)).unwrap();
        assert_eq!(json, "99");
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId(3).to_string(), "S-3");
    }

    // =====================================================================
    // Color
    // =====================================================================

    #[test]
    fn test_color_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Color::White).unwrap(), "\"white\"");
        assert_eq!(serde_json::to_string(&Color::Black).unwrap(), "\"black\"");
    }

    #[test]
    fn test_color_opposite() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.opposite(), Color::White);
    }

    // =====================================================================
    // MoveRequest
    // =====================================================================

    #[test]
    fn test_uci_without_promotion() {
        let mv = MoveRequest {
            from: "e2".into(),
            to: "e4".into(),
            promotion: None,
        };
        assert_eq!(mv.uci(), "e2e4");
    }

    #[test]
    fn test_uci_with_promotion() {
        let mv = MoveRequest {
            from: "e7".into(),
            to: "e8".into(),
            promotion: Some('q'),
        };
        assert_eq!(mv.uci(), "e7e8q");
    }

    // =====================================================================
    // ClientMessage — JSON shapes
    // =====================================================================

    #[test]
    fn test_client_join_json_format() {
        let json = serde_json::to_value(&ClientMessage::Join).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "join" }));
    }

    #[test]
    fn test_client_move_json_format() {
        let msg = ClientMessage::Move(MoveRequest {
            from: "e2".into(),
            to: "e4".into(),
            promotion: None,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["from"], "e2");
        assert_eq!(json["to"], "e4");
        // promotion is skipped entirely when absent
        assert!(json.get("promotion").is_none());
    }

    #[test]
    fn test_client_move_with_promotion_round_trip() {
        let msg = ClientMessage::Move(MoveRequest {
            from: "a7".into(),
            to: "a8".into(),
            promotion: Some('n'),
        });
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ClientMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_client_move_parses_without_promotion_field() {
        // Clients that never promote omit the field; `#[serde(default)]`
        // must fill in None.
        let json = r#"{"type":"move","from":"g1","to":"f3"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Move(mv) => {
                assert_eq!(mv.uci(), "g1f3");
                assert_eq!(mv.promotion, None);
            }
            other => panic!("expected Move, got {other:?}"),
        }
    }

    #[test]
    fn test_client_replay_and_quit_round_trip() {
        for msg in [ClientMessage::Replay, ClientMessage::Quit] {
            let bytes = serde_json::to_vec(&msg).unwrap();
            let decoded: ClientMessage =
                serde_json::from_slice(&bytes).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    // =====================================================================
    // ServerMessage — JSON shapes
    // =====================================================================

    #[test]
    fn test_server_start_json_format() {
        let msg = ServerMessage::Start {
            state: "initial".into(),
            color: Color::White,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "start");
        assert_eq!(json["state"], "initial");
        assert_eq!(json["color"], "white");
    }

    #[test]
    fn test_server_move_json_format() {
        let msg = ServerMessage::Move {
            uci: "e2e4".into(),
            state: "after-e4".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["uci"], "e2e4");
        assert_eq!(json["state"], "after-e4");
    }

    #[test]
    fn test_server_invalid_json_format() {
        let msg = ServerMessage::Invalid { uci: "e2e5".into() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "invalid");
        assert_eq!(json["uci"], "e2e5");
    }

    #[test]
    fn test_server_game_over_json_format() {
        let msg = ServerMessage::GameOver { result: "1-0".into() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "game_over");
        assert_eq!(json["result"], "1-0");
    }

    #[test]
    fn test_server_replay_start_json_format() {
        let msg = ServerMessage::ReplayStart { state: "fresh".into() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "replay_start");
        assert_eq!(json["state"], "fresh");
    }

    #[test]
    fn test_server_opponent_left_json_format() {
        let json =
            serde_json::to_value(&ServerMessage::OpponentLeft).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "opponent_left" }));
    }

    // =====================================================================
    // Error cases — malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientMessage, _> =
            serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_type_tag_returns_error() {
        let unknown = r#"{"type": "castle_queenside"}"#;
        let result: Result<ClientMessage, _> =
            serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_move_missing_fields_returns_error() {
        let wrong = r#"{"type": "move", "from": "e2"}"#;
        let result: Result<ClientMessage, _> = serde_json::from_str(wrong);
        assert!(result.is_err());
    }
}
