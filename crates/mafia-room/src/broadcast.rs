//! Outbound delivery seam between the core and the transport.

use mafia_protocol::{RoomCode, ServerEvent};
use mafia_transport::ConnectionId;

/// Who should receive an outbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// One connection (a reply, an error, a secret role).
    Connection(ConnectionId),
    /// Every member of the room, resolved when the event is dispatched.
    Room(RoomCode),
}

/// An event paired with its recipient.
pub type Outbound = (Recipient, ServerEvent);

/// Delivers events to connections.
///
/// Implementations must not block: the core calls this from inside an
/// event handler, and one stalled client must not stall the room.
pub trait Broadcaster {
    /// Queues `event` for `connection`. Unknown or closed connections are
    /// silently skipped.
    fn send(&mut self, connection: ConnectionId, event: ServerEvent);
}

/// Collects deliveries in order. Handy as a test double and for replay.
impl Broadcaster for Vec<(ConnectionId, ServerEvent)> {
    fn send(&mut self, connection: ConnectionId, event: ServerEvent) {
        self.push((connection, event));
    }
}
