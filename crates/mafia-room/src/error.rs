//! Error types for the room layer.
//!
//! Every variant's message is sent verbatim to the offending client as an
//! `error` event, so the wording is aimed at players, not operators.

use mafia_protocol::{EventKind, Phase, RoomCode};

/// Errors that can occur while handling a room event.
///
/// None of these are fatal: the handler that produced one has not mutated
/// any state, and the error goes back to the sender only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The event isn't legal in the room's current phase, e.g. a `vote`
    /// during the night.
    #[error("{event} is not allowed during {phase}")]
    PhaseViolation { event: EventKind, phase: Phase },

    /// `start` on a room whose game is already running.
    #[error("game in room {0} has already started")]
    AlreadyStarted(RoomCode),

    /// Only the host may start the game.
    #[error("only the host can start the game")]
    NotHost,

    /// The sending connection has no seat in the addressed room.
    #[error("you are not in this room")]
    NotInRoom,

    /// The sending connection already has a seat somewhere.
    #[error("you are already in room {0}")]
    AlreadyInRoom(RoomCode),

    /// The `playerName` on an action doesn't belong to the sender's seat.
    #[error("player name does not match your seat")]
    NameMismatch,

    /// The sender may not act in this phase (wrong role, or dead).
    #[error("you cannot act in this phase")]
    NotEligible,

    /// The action's target isn't a living player in the room.
    #[error("no living player named {0:?}")]
    UnknownTarget(String),

    /// Display names must contain something other than whitespace.
    #[error("player name must not be empty")]
    InvalidName,

    /// A room already lives under this code.
    #[error("room code {0} is already in use")]
    DuplicateRoomCode(RoomCode),

    /// Every freshly generated code collided with a live room.
    #[error("could not allocate a room code after {0} attempts")]
    CodeSpaceExhausted(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_player_facing() {
        let err = RoomError::RoomNotFound(RoomCode::new("abc123"));
        assert_eq!(err.to_string(), "room ABC123 not found");

        let err = RoomError::PhaseViolation {
            event: EventKind::Vote,
            phase: Phase::Night,
        };
        assert_eq!(err.to_string(), "vote is not allowed during night");

        let err = RoomError::UnknownTarget("Zed".into());
        assert_eq!(err.to_string(), r#"no living player named "Zed""#);
    }
}
