//! Per-connection handler: decode inbound frames, write outbound events.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`], plus a writer task that drains the connection's
//! outbound queue. The flow is:
//!   1. Register the outbound queue with the coordinator
//!   2. Loop: receive a frame → decode → enqueue for the coordinator
//!   3. On close, error, idle timeout or a dropped queue: stop, and let
//!      the guard tell the coordinator

use std::sync::Arc;
use std::time::Duration;

use mafia_protocol::{ClientEvent, Codec, ServerEvent};
use mafia_transport::{Connection, ConnectionId, TransportError, WebSocketConnection};
use tokio::sync::mpsc;

use crate::MafiaError;
use crate::coordinator::Command;
use crate::server::ServerState;

/// Drop guard that reports the connection gone when the handler exits.
///
/// Runs on every exit path, including a panic. `Drop` is synchronous, so
/// the send happens on a spawned task.
struct ConnectionGuard {
    conn: ConnectionId,
    commands: mpsc::Sender<Command>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn = self.conn;
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let _ = commands.send(Command::Disconnected { conn }).await;
        });
    }
}

enum Inbound {
    Frame(Vec<u8>),
    Closed,
    Failed(TransportError),
    Idle,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), MafiaError> {
    let conn_id = conn.id();
    let conn = Arc::new(conn);
    tracing::debug!(%conn_id, "handling new connection");

    let (outbound, queue) = mpsc::channel(state.outbound_buffer);
    state
        .commands
        .send(Command::Connected {
            conn: conn_id,
            outbound,
        })
        .await
        .map_err(|_| MafiaError::CoordinatorStopped)?;
    let _guard = ConnectionGuard {
        conn: conn_id,
        commands: state.commands.clone(),
    };

    let mut writer = tokio::spawn(write_events(Arc::clone(&conn), queue, Arc::clone(&state)));

    loop {
        let inbound = tokio::select! {
            inbound = read_frame(&conn, state.idle_timeout) => inbound,
            _ = &mut writer => {
                tracing::debug!(%conn_id, "outbound queue closed");
                break;
            }
        };

        let data = match inbound {
            Inbound::Frame(data) => data,
            Inbound::Closed => {
                tracing::info!(%conn_id, "connection closed");
                break;
            }
            Inbound::Failed(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Inbound::Idle => {
                tracing::info!(%conn_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "malformed event");
                send_error(&conn, &state.codec, &format!("malformed event: {e}")).await?;
                continue;
            }
        };

        state
            .commands
            .send(Command::Event {
                conn: conn_id,
                event,
            })
            .await
            .map_err(|_| MafiaError::CoordinatorStopped)?;
    }

    // _guard drops here → Disconnected is queued.
    Ok(())
}

async fn read_frame(conn: &WebSocketConnection, idle: Option<Duration>) -> Inbound {
    let result = match idle {
        Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
            Ok(result) => result,
            Err(_) => return Inbound::Idle,
        },
        None => conn.recv().await,
    };
    match result {
        Ok(Some(data)) => Inbound::Frame(data),
        Ok(None) => Inbound::Closed,
        Err(e) => Inbound::Failed(e),
    }
}

/// Drains the outbound queue onto the socket until the queue closes or a
/// send fails, then closes the socket.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut queue: mpsc::Receiver<ServerEvent>,
    state: Arc<ServerState<C>>,
) {
    let conn_id = conn.id();
    while let Some(event) = queue.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed");
            return;
        }
    }
    let _ = conn.close().await;
}

/// Replies with an `error` event directly on the socket.
///
/// Used for frames that never reach the coordinator.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    message: &str,
) -> Result<(), MafiaError> {
    let bytes = codec.encode(&ServerEvent::error(message))?;
    conn.send(&bytes).await?;
    Ok(())
}
