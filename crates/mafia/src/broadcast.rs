//! Channel-backed [`Broadcaster`]: one bounded queue per connection.

use std::collections::HashMap;

use mafia_protocol::ServerEvent;
use mafia_room::Broadcaster;
use mafia_transport::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Routes events to each connection's writer task.
///
/// Sends never wait. When a connection's queue is full the client is
/// considered too slow: its sender is dropped, which ends its writer task
/// and closes the socket, and the usual disconnect path cleans up after.
#[derive(Debug, Default)]
pub(crate) struct ChannelBroadcaster {
    senders: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
}

impl ChannelBroadcaster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, connection: ConnectionId, sender: mpsc::Sender<ServerEvent>) {
        self.senders.insert(connection, sender);
    }

    /// Drops the connection's queue. Returns `false` if it was already gone.
    pub(crate) fn unregister(&mut self, connection: ConnectionId) -> bool {
        self.senders.remove(&connection).is_some()
    }

    #[cfg(test)]
    pub(crate) fn is_registered(&self, connection: ConnectionId) -> bool {
        self.senders.contains_key(&connection)
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn send(&mut self, connection: ConnectionId, event: ServerEvent) {
        let Some(sender) = self.senders.get(&connection) else {
            tracing::trace!(conn_id = %connection, "no outbound queue, event dropped");
            return;
        };
        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %connection, "outbound queue full, dropping slow client");
                self.senders.remove(&connection);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(conn_id = %connection, "writer gone, removing outbound queue");
                self.senders.remove(&connection);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    #[test]
    fn test_delivers_in_order() {
        let mut broadcaster = ChannelBroadcaster::new();
        let (tx, mut rx) = mpsc::channel(4);
        broadcaster.register(conn(1), tx);

        broadcaster.send(conn(1), ServerEvent::error("a"));
        broadcaster.send(conn(1), ServerEvent::error("b"));

        assert_eq!(rx.try_recv().unwrap(), ServerEvent::error("a"));
        assert_eq!(rx.try_recv().unwrap(), ServerEvent::error("b"));
    }

    #[test]
    fn test_unknown_connection_is_skipped() {
        let mut broadcaster = ChannelBroadcaster::new();
        broadcaster.send(conn(9), ServerEvent::error("nobody"));
        assert!(!broadcaster.is_registered(conn(9)));
    }

    #[test]
    fn test_full_queue_drops_the_connection() {
        let mut broadcaster = ChannelBroadcaster::new();
        let (tx, mut rx) = mpsc::channel(1);
        broadcaster.register(conn(1), tx);

        broadcaster.send(conn(1), ServerEvent::error("fits"));
        broadcaster.send(conn(1), ServerEvent::error("overflows"));

        assert!(!broadcaster.is_registered(conn(1)));
        assert_eq!(rx.try_recv().unwrap(), ServerEvent::error("fits"));
        // Sender dropped: the writer sees the queue close.
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_slow_client_does_not_affect_others() {
        let mut broadcaster = ChannelBroadcaster::new();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        broadcaster.register(conn(1), slow_tx);
        broadcaster.register(conn(2), fast_tx);

        for i in 0..3 {
            broadcaster.send(conn(1), ServerEvent::error(format!("{i}")));
            broadcaster.send(conn(2), ServerEvent::error(format!("{i}")));
        }

        assert!(!broadcaster.is_registered(conn(1)));
        assert!(broadcaster.is_registered(conn(2)));
        let mut received = 0;
        while fast_rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[test]
    fn test_closed_receiver_is_removed() {
        let mut broadcaster = ChannelBroadcaster::new();
        let (tx, rx) = mpsc::channel(1);
        broadcaster.register(conn(1), tx);
        drop(rx);

        broadcaster.send(conn(1), ServerEvent::error("late"));
        assert!(!broadcaster.unregister(conn(1)));
    }
}
