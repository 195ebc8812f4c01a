//! Core protocol types for the Mafia wire format.
//!
//! Every type here travels "on the wire": clients send [`ClientEvent`]s,
//! the server answers with [`ServerEvent`]s. Both are JSON objects tagged
//! by a `"type"` field, with camelCase field names, so a browser client
//! can `JSON.parse` them and switch on `msg.type`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The short code players type to find a room, e.g. `"K3X9QZ"`.
///
/// Codes are uppercase base-36. Incoming codes are trimmed and
/// uppercased on decode, so `" k3x9qz"` finds the same room.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps a code, normalizing it to trimmed uppercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Game vocabulary
// ---------------------------------------------------------------------------

/// A secret role dealt to each player when the game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mafia,
    Sheriff,
    Doctor,
    Villager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mafia => "mafia",
            Self::Sheriff => "sheriff",
            Self::Doctor => "doctor",
            Self::Villager => "villager",
        };
        f.write_str(name)
    }
}

/// Which part of the game cycle a room is in.
///
/// ```text
/// Lobby ──(start)──→ Night ⇄ Day
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Lobby,
    Night,
    Day,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lobby => "lobby",
            Self::Night => "night",
            Self::Day => "day",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ClientEvent: client → server
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// `tag = "type"` produces `{ "type": "join", "roomCode": "..", ... }`.
/// Older clients send `name` / `code` instead of `playerName` / `roomCode`;
/// the aliases accept both spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Open a new room with the sender as host.
    Create {
        #[serde(alias = "name")]
        player_name: String,
    },

    /// Take a seat in an existing room.
    Join {
        #[serde(alias = "code")]
        room_code: RoomCode,
        #[serde(alias = "name")]
        player_name: String,
    },

    /// Deal roles and begin the first night. Host only.
    Start {
        #[serde(alias = "code")]
        room_code: RoomCode,
    },

    /// A Mafia member picks tonight's target (by display name).
    NightAction {
        #[serde(alias = "code")]
        room_code: RoomCode,
        #[serde(alias = "name")]
        player_name: String,
        action: String,
    },

    /// A living player votes to eliminate someone (by display name).
    Vote {
        #[serde(alias = "code")]
        room_code: RoomCode,
        #[serde(alias = "name")]
        player_name: String,
        target: String,
    },

    /// Leave the room without closing the connection.
    Leave {
        #[serde(alias = "code")]
        room_code: RoomCode,
    },
}

/// The kind of a [`ClientEvent`], without its payload.
///
/// Used for phase gating and in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Create,
    Join,
    Start,
    NightAction,
    Vote,
    Leave,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Join => "join",
            Self::Start => "start",
            Self::NightAction => "nightAction",
            Self::Vote => "vote",
            Self::Leave => "leave",
        };
        f.write_str(name)
    }
}

impl ClientEvent {
    /// Returns the payload-free kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Create { .. } => EventKind::Create,
            Self::Join { .. } => EventKind::Join,
            Self::Start { .. } => EventKind::Start,
            Self::NightAction { .. } => EventKind::NightAction,
            Self::Vote { .. } => EventKind::Vote,
            Self::Leave { .. } => EventKind::Leave,
        }
    }

    /// Returns the room this event addresses, if any.
    /// `create` is the only event that names no room.
    pub fn room_code(&self) -> Option<&RoomCode> {
        match self {
            Self::Create { .. } => None,
            Self::Join { room_code, .. }
            | Self::Start { room_code }
            | Self::NightAction { room_code, .. }
            | Self::Vote { room_code, .. }
            | Self::Leave { room_code } => Some(room_code),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent: server → client
// ---------------------------------------------------------------------------

/// Everything the server can tell a client.
///
/// Rosters (`players`) are display names in join order. `killed` and
/// `eliminated` are `null` when nobody was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Reply to `create`: the new room and its (one-player) roster.
    Created {
        room_code: RoomCode,
        players: Vec<String>,
    },

    /// Reply to `join`.
    Joined {
        room_code: RoomCode,
        players: Vec<String>,
    },

    /// A request was rejected. Only ever sent to the requester.
    Error { message: String },

    /// The room's roster changed. Broadcast.
    PlayersUpdate { players: Vec<String> },

    /// Your secret role. Sent to each player individually.
    RoleAssigned { role: Role },

    /// The game began. Broadcast.
    GameStarted { phase: Phase },

    /// Night is over. Broadcast.
    NightResult { killed: Option<String> },

    /// Voting is over: who was eliminated and who voted for whom
    /// (voter name → target name). Broadcast.
    VotingResult {
        eliminated: Option<String>,
        votes: BTreeMap<String, String>,
    },
}

impl ServerEvent {
    /// Shorthand for an [`Error`](Self::Error) event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_code_normalizes_on_decode() {
        let code: RoomCode = serde_json::from_str(r#"" k3x9qz ""#).unwrap();
        assert_eq!(code.as_str(), "K3X9QZ");
        assert_eq!(serde_json::to_value(&code).unwrap(), json!("K3X9QZ"));
    }

    #[test]
    fn test_role_and_phase_are_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_value(Role::Mafia).unwrap(), json!("mafia"));
        assert_eq!(serde_json::to_value(Phase::Night).unwrap(), json!("night"));
        assert_eq!(Phase::default(), Phase::Lobby);
    }

    #[test]
    fn test_client_event_tagged_camel_case() {
        let event: ClientEvent = serde_json::from_value(json!({
            "type": "nightAction",
            "roomCode": "ABC123",
            "playerName": "Ann",
            "action": "Bob",
        }))
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::NightAction {
                room_code: RoomCode::new("ABC123"),
                player_name: "Ann".into(),
                action: "Bob".into(),
            }
        );
        assert_eq!(event.kind(), EventKind::NightAction);
        assert_eq!(event.room_code().map(RoomCode::as_str), Some("ABC123"));
    }

    #[test]
    fn test_client_event_accepts_legacy_field_names() {
        let event: ClientEvent = serde_json::from_value(json!({
            "type": "join",
            "code": "abc123",
            "name": "Cleo",
        }))
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::Join {
                room_code: RoomCode::new("ABC123"),
                player_name: "Cleo".into(),
            }
        );
    }

    #[test]
    fn test_client_event_missing_field_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_value(json!({ "type": "vote", "roomCode": "X" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_unknown_type_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_value(json!({ "type": "poison", "target": "Bob" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_names_no_room() {
        let event = ClientEvent::Create {
            player_name: "Ann".into(),
        };
        assert!(event.room_code().is_none());
        assert_eq!(event.kind().to_string(), "create");
    }

    #[test]
    fn test_server_event_json_shapes() {
        let created = ServerEvent::Created {
            room_code: RoomCode::new("ABC123"),
            players: vec!["Ann".into()],
        };
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            json!({ "type": "created", "roomCode": "ABC123", "players": ["Ann"] })
        );

        let started = ServerEvent::GameStarted { phase: Phase::Night };
        assert_eq!(
            serde_json::to_value(&started).unwrap(),
            json!({ "type": "gameStarted", "phase": "night" })
        );

        let update = ServerEvent::PlayersUpdate { players: vec![] };
        assert_eq!(serde_json::to_value(&update).unwrap()["type"], "playersUpdate");
    }

    #[test]
    fn test_results_serialize_null_when_nobody_removed() {
        let night = ServerEvent::NightResult { killed: None };
        assert_eq!(
            serde_json::to_value(&night).unwrap(),
            json!({ "type": "nightResult", "killed": null })
        );

        let mut votes = BTreeMap::new();
        votes.insert("Ann".to_string(), "Bob".to_string());
        let voting = ServerEvent::VotingResult {
            eliminated: Some("Bob".into()),
            votes,
        };
        assert_eq!(
            serde_json::to_value(&voting).unwrap(),
            json!({
                "type": "votingResult",
                "eliminated": "Bob",
                "votes": { "Ann": "Bob" },
            })
        );
    }

    #[test]
    fn test_error_shorthand() {
        assert_eq!(
            serde_json::to_value(ServerEvent::error("room ZZZ not found")).unwrap(),
            json!({ "type": "error", "message": "room ZZZ not found" })
        );
    }
}
