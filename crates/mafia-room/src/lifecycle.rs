//! What happens to rooms when a player goes away.

use mafia_protocol::RoomCode;
use mafia_transport::ConnectionId;

use crate::{Player, RoomError, RoomStore};

/// A player removed from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_code: RoomCode,
    pub player: Player,
    /// `true` if this was the last player and the room was deleted.
    pub room_closed: bool,
}

/// Removes departing connections from rooms and deletes rooms that empty.
///
/// Only the store is touched here. Re-broadcasting the roster and
/// resolving a phase the departure may have completed are up to the
/// caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionLifecycle;

impl ConnectionLifecycle {
    /// Handles a closed connection: unseats it from every room it is in.
    ///
    /// Scans the whole store (O(rooms × players)). That's fine for party
    /// game room sizes; an index from connection to room would be the fix
    /// if it ever isn't.
    pub fn disconnect(store: &mut RoomStore, connection: ConnectionId) -> Vec<Departure> {
        store
            .rooms_with(connection)
            .into_iter()
            .filter_map(|code| Self::unseat(store, &code, connection))
            .collect()
    }

    /// Handles an explicit `leave`: unseats the connection from one room.
    ///
    /// # Errors
    /// [`RoomError::RoomNotFound`] if the room doesn't exist,
    /// [`RoomError::NotInRoom`] if the connection has no seat there.
    pub fn leave(
        store: &mut RoomStore,
        code: &RoomCode,
        connection: ConnectionId,
    ) -> Result<Departure, RoomError> {
        if store.get(code)?.member(connection).is_none() {
            return Err(RoomError::NotInRoom);
        }
        Self::unseat(store, code, connection).ok_or(RoomError::NotInRoom)
    }

    fn unseat(store: &mut RoomStore, code: &RoomCode, connection: ConnectionId) -> Option<Departure> {
        let room = store.get_mut(code).ok()?;
        let player = room.remove_connection(connection)?;
        let room_closed = room.is_empty();

        if room_closed {
            store.remove(code);
            tracing::info!(room_code = %code, "room destroyed");
        }
        tracing::info!(
            room_code = %code,
            conn_id = %connection,
            player = %player.id,
            "player left"
        );

        Some(Departure {
            room_code: code.clone(),
            player,
            room_closed,
        })
    }
}
