//! The coordinator task: the only place room state is touched.
//!
//! Connection handlers never lock anything. They push [`Command`]s onto
//! one bounded queue and this task applies them in arrival order, so each
//! event is handled to completion before the next one starts.

use mafia_protocol::{ClientEvent, ServerEvent};
use mafia_room::{CoordinatorConfig, SessionCoordinator};
use mafia_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::broadcast::ChannelBroadcaster;

/// A message from a connection handler to the coordinator.
#[derive(Debug)]
pub(crate) enum Command {
    /// A new connection and the queue its writer drains.
    Connected {
        conn: ConnectionId,
        outbound: mpsc::Sender<ServerEvent>,
    },
    /// A decoded inbound event.
    Event { conn: ConnectionId, event: ClientEvent },
    /// The connection is gone, for whatever reason.
    Disconnected { conn: ConnectionId },
}

/// Spawns the coordinator and returns the queue that feeds it.
///
/// The task runs until every sender is dropped.
pub(crate) fn spawn(config: CoordinatorConfig, buffer: usize) -> mpsc::Sender<Command> {
    let (commands, inbox) = mpsc::channel(buffer);
    let coordinator = SessionCoordinator::new(config, ChannelBroadcaster::new());
    tokio::spawn(run(coordinator, inbox));
    commands
}

pub(crate) async fn run(
    mut coordinator: SessionCoordinator<ChannelBroadcaster>,
    mut inbox: mpsc::Receiver<Command>,
) {
    tracing::debug!("coordinator started");
    while let Some(command) = inbox.recv().await {
        apply(&mut coordinator, command);
    }
    tracing::debug!("command queue closed, coordinator stopping");
}

fn apply(coordinator: &mut SessionCoordinator<ChannelBroadcaster>, command: Command) {
    match command {
        Command::Connected { conn, outbound } => {
            coordinator.broadcaster_mut().register(conn, outbound);
        }
        Command::Event { conn, event } => coordinator.handle(conn, event),
        Command::Disconnected { conn } => {
            coordinator.disconnect(conn);
            let had_queue = coordinator.broadcaster_mut().unregister(conn);
            tracing::debug!(conn_id = %conn, had_queue, rooms = coordinator.store().len(), "connection cleaned up");
        }
    }
}
