//! The phase state machine.
//!
//! ```text
//! Lobby ──(start)──→ Night ──(all kills in)──→ Day ──(all votes in)──→ Night …
//! ```
//!
//! There is no terminal phase: a room cycles until its last player leaves.

use mafia_protocol::{EventKind, Phase};

use crate::RoomError;

/// Decides which phase follows which, and which events each phase allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseController;

impl PhaseController {
    /// The phase that follows `phase`.
    ///
    /// Lobby leads to Night (when the game starts); after that Night and
    /// Day alternate forever.
    pub fn next(phase: Phase) -> Phase {
        match phase {
            Phase::Lobby | Phase::Day => Phase::Night,
            Phase::Night => Phase::Day,
        }
    }

    /// Returns `true` if moving from `from` to `to` is a legal step.
    pub fn can_transition(from: Phase, to: Phase) -> bool {
        Self::next(from) == to
    }

    /// Returns `true` if an event of `kind` may be handled during `phase`.
    pub fn permits(phase: Phase, kind: EventKind) -> bool {
        match kind {
            EventKind::Create | EventKind::Leave => true,
            EventKind::Join | EventKind::Start => phase == Phase::Lobby,
            EventKind::NightAction => phase == Phase::Night,
            EventKind::Vote => phase == Phase::Day,
        }
    }

    /// Like [`permits`](Self::permits), but as a typed rejection.
    pub fn check(phase: Phase, kind: EventKind) -> Result<(), RoomError> {
        if Self::permits(phase, kind) {
            Ok(())
        } else {
            Err(RoomError::PhaseViolation { event: kind, phase })
        }
    }
}
