//! Unified error type for the Mafia server.

use mafia_protocol::ProtocolError;
use mafia_room::RoomError;
use mafia_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` variants let `?` lift sub-crate errors without a
/// `map_err` at each call site.
#[derive(Debug, thiserror::Error)]
pub enum MafiaError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error surfaced outside the coordinator.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Invalid server configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The coordinator task has exited and no longer accepts commands.
    #[error("coordinator is no longer running")]
    CoordinatorStopped,
}
