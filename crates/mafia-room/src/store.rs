//! Room store: owns every live room, keyed by room code.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use mafia_protocol::RoomCode;
use mafia_transport::ConnectionId;
use rand::Rng;

use crate::{Player, Room, RoomError};

/// Characters room codes are drawn from (uppercase base-36).
const CODE_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates a random room code of `length` uppercase base-36 characters.
///
/// Uniqueness is *not* checked here; [`RoomStore::create`] rejects
/// collisions and the caller draws again.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, length: usize) -> RoomCode {
    let code: String = (0..length)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    RoomCode::new(code)
}

/// All live rooms.
///
/// The store does no game logic and no I/O; it only guarantees that a
/// code maps to at most one room.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a room under `code` with `host` seated.
    ///
    /// # Errors
    /// [`RoomError::DuplicateRoomCode`] if a room already lives under
    /// `code`. The existing room is left untouched.
    pub fn create(&mut self, code: RoomCode, host: Player) -> Result<&mut Room, RoomError> {
        match self.rooms.entry(code) {
            Entry::Occupied(entry) => Err(RoomError::DuplicateRoomCode(entry.key().clone())),
            Entry::Vacant(entry) => {
                let room = Room::new(entry.key().clone(), host);
                Ok(entry.insert(room))
            }
        }
    }

    pub fn get(&self, code: &RoomCode) -> Result<&Room, RoomError> {
        self.rooms
            .get(code)
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))
    }

    /// Deletes a room, returning it if it existed.
    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// The room `connection` is seated in, if any.
    pub fn room_of(&self, connection: ConnectionId) -> Option<&RoomCode> {
        self.rooms
            .values()
            .find(|room| room.member(connection).is_some())
            .map(Room::code)
    }

    /// Every room `connection` holds a seat in.
    ///
    /// A connection is only ever seated once, but this scans all rooms
    /// anyway: O(rooms × players).
    pub fn rooms_with(&self, connection: ConnectionId) -> Vec<RoomCode> {
        self.rooms
            .values()
            .filter(|room| room.member(connection).is_some())
            .map(|room| room.code().clone())
            .collect()
    }

    /// Returns the number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Lists all live room codes.
    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParticipantId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seat(n: u64) -> Player {
        Player::new(ParticipantId(n), format!("p{n}"), ConnectionId::new(n))
    }

    fn code(s: &str) -> RoomCode {
        RoomCode::new(s)
    }

    #[test]
    fn test_create_then_get() {
        let mut store = RoomStore::new();
        store.create(code("AAAAAA"), seat(1)).unwrap();

        let room = store.get(&code("AAAAAA")).unwrap();
        assert_eq!(room.roster(), vec!["p1"]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_rejects_live_code_and_keeps_original() {
        let mut store = RoomStore::new();
        store.create(code("AAAAAA"), seat(1)).unwrap();

        let err = store.create(code("AAAAAA"), seat(2)).unwrap_err();
        assert_eq!(err, RoomError::DuplicateRoomCode(code("AAAAAA")));
        assert_eq!(store.get(&code("AAAAAA")).unwrap().roster(), vec!["p1"]);
    }

    #[test]
    fn test_code_reusable_after_remove() {
        let mut store = RoomStore::new();
        store.create(code("AAAAAA"), seat(1)).unwrap();
        assert!(store.remove(&code("AAAAAA")).is_some());
        assert!(store.remove(&code("AAAAAA")).is_none());

        store.create(code("AAAAAA"), seat(2)).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let store = RoomStore::new();
        assert_eq!(
            store.get(&code("ZZZZZZ")).unwrap_err(),
            RoomError::RoomNotFound(code("ZZZZZZ"))
        );
    }

    #[test]
    fn test_room_of_finds_seated_connection() {
        let mut store = RoomStore::new();
        store.create(code("AAAAAA"), seat(1)).unwrap();
        store.create(code("BBBBBB"), seat(2)).unwrap();

        assert_eq!(store.room_of(ConnectionId::new(2)), Some(&code("BBBBBB")));
        assert_eq!(store.room_of(ConnectionId::new(3)), None);
        assert_eq!(store.rooms_with(ConnectionId::new(1)), vec![code("AAAAAA")]);
    }

    #[test]
    fn test_generate_code_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let code = generate_code(&mut rng, 6);
            assert_eq!(code.as_str().len(), 6);
            assert!(
                code.as_str()
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
            );
        }
    }

    #[test]
    fn test_generate_code_is_seeded() {
        let a = generate_code(&mut StdRng::seed_from_u64(5), 6);
        let b = generate_code(&mut StdRng::seed_from_u64(5), 6);
        assert_eq!(a, b);
    }
}
