//! A single game session: its players, phase, roles, and pending actions.

use std::collections::HashMap;
use std::fmt;

use mafia_protocol::{Phase, Role, RoomCode};
use mafia_transport::ConnectionId;

use crate::aggregator::{ActionAggregator, DayVote, NightKill};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Internal identity of a seated player.
///
/// Display names are not unique, so roles and submissions are keyed by
/// this instead. It never leaves the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// One seat in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: ParticipantId,
    /// Display name. May collide with another player's.
    pub name: String,
    /// The connection this seat belongs to. Lookup only: the transport
    /// owns the connection's lifetime.
    pub connection: ConnectionId,
    pub is_host: bool,
    /// Cleared by a night kill or a day elimination.
    pub alive: bool,
}

impl Player {
    /// A fresh, living, non-host seat.
    pub fn new(id: ParticipantId, name: impl Into<String>, connection: ConnectionId) -> Self {
        Self {
            id,
            name: name.into(),
            connection,
            is_host: false,
            alive: true,
        }
    }
}

/// Whether the room is still gathering players or playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomStatus {
    #[default]
    Waiting,
    Playing,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A room and everything the game needs to know about it.
///
/// `players` is in join order and never empty while the room is stored:
/// removing the last player is the store's cue to drop the room.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    players: Vec<Player>,
    status: RoomStatus,
    phase: Phase,
    roles: HashMap<ParticipantId, Role>,
    pub(crate) night: ActionAggregator<NightKill>,
    pub(crate) day: ActionAggregator<DayVote>,
}

impl Room {
    /// Opens a room with `host` as its only (and hosting) player.
    pub fn new(code: RoomCode, mut host: Player) -> Self {
        host.is_host = true;
        Self {
            code,
            players: vec![host],
            status: RoomStatus::Waiting,
            phase: Phase::Lobby,
            roles: HashMap::new(),
            night: ActionAggregator::new(),
            day: ActionAggregator::new(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Display names in join order.
    pub fn roster(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    /// The seat held by `connection`, if any.
    pub fn member(&self, connection: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.connection == connection)
    }

    /// The first living player with this display name, in join order.
    pub fn living_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.alive && p.name == name)
    }

    pub fn player(&self, id: ParticipantId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The role dealt to `id`. `None` before the game starts.
    pub fn role_of(&self, id: ParticipantId) -> Option<Role> {
        self.roles.get(&id).copied()
    }

    /// Roles by participant. Empty before the game starts.
    pub fn roles(&self) -> &HashMap<ParticipantId, Role> {
        &self.roles
    }

    /// Every member's connection, in join order.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.players.iter().map(|p| p.connection)
    }

    /// Night actions recorded so far.
    pub fn pending_night_actions(&self) -> usize {
        self.night.len()
    }

    /// Day votes recorded so far.
    pub fn pending_votes(&self) -> usize {
        self.day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    // -- Mutation (crate-internal: the coordinator validates first) --

    pub(crate) fn push_player(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Deals roles and moves the room into the game.
    pub(crate) fn begin(&mut self, roles: HashMap<ParticipantId, Role>, phase: Phase) {
        self.roles = roles;
        self.status = RoomStatus::Playing;
        self.phase = phase;
        self.night.clear();
        self.day.clear();
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Marks `id` dead and returns their display name.
    pub(crate) fn kill(&mut self, id: ParticipantId) -> Option<String> {
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        player.alive = false;
        Some(player.name.clone())
    }

    /// Removes the seat held by `connection`.
    ///
    /// Also drops that player's role, their pending submissions and any
    /// submissions targeting them, and hands the host flag to the earliest
    /// remaining player if the host left.
    pub(crate) fn remove_connection(&mut self, connection: ConnectionId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.connection == connection)?;
        let player = self.players.remove(index);

        self.roles.remove(&player.id);
        self.night.withdraw(player.id);
        self.day.withdraw(player.id);

        if player.is_host {
            if let Some(next) = self.players.first_mut() {
                next.is_host = true;
            }
        }
        Some(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(id: u64, name: &str) -> Player {
        Player::new(ParticipantId(id), name, ConnectionId::new(id))
    }

    #[test]
    fn test_new_room_is_waiting_lobby_with_host() {
        let room = Room::new(RoomCode::new("ABC123"), seat(1, "Ann"));
        assert_eq!(room.status(), RoomStatus::Waiting);
        assert_eq!(room.phase(), Phase::Lobby);
        assert_eq!(room.roster(), vec!["Ann"]);
        assert!(room.players()[0].is_host);
        assert!(room.role_of(ParticipantId(1)).is_none());
    }

    #[test]
    fn test_living_by_name_skips_the_dead_and_prefers_join_order() {
        let mut room = Room::new(RoomCode::new("ABC123"), seat(1, "Sam"));
        room.push_player(seat(2, "Sam"));

        assert_eq!(room.living_by_name("Sam").unwrap().id, ParticipantId(1));
        room.kill(ParticipantId(1));
        assert_eq!(room.living_by_name("Sam").unwrap().id, ParticipantId(2));
        assert!(room.living_by_name("Nobody").is_none());
    }

    #[test]
    fn test_remove_host_hands_off_to_earliest_remaining() {
        let mut room = Room::new(RoomCode::new("ABC123"), seat(1, "Ann"));
        room.push_player(seat(2, "Bob"));
        room.push_player(seat(3, "Cy"));

        let gone = room.remove_connection(ConnectionId::new(1)).unwrap();
        assert_eq!(gone.name, "Ann");
        assert_eq!(room.roster(), vec!["Bob", "Cy"]);
        assert!(room.players()[0].is_host);
        assert!(!room.players()[1].is_host);
    }

    #[test]
    fn test_remove_unknown_connection_is_none() {
        let mut room = Room::new(RoomCode::new("ABC123"), seat(1, "Ann"));
        assert!(room.remove_connection(ConnectionId::new(99)).is_none());
        assert_eq!(room.players().len(), 1);
    }

    #[test]
    fn test_remove_prunes_role_and_submissions() {
        let mut room = Room::new(RoomCode::new("ABC123"), seat(1, "Ann"));
        room.push_player(seat(2, "Bob"));
        let roles = HashMap::from([
            (ParticipantId(1), Role::Mafia),
            (ParticipantId(2), Role::Villager),
        ]);
        room.begin(roles, Phase::Night);
        room.night.submit(ParticipantId(1), ParticipantId(2));

        room.remove_connection(ConnectionId::new(1));

        assert!(room.role_of(ParticipantId(1)).is_none());
        assert_eq!(room.pending_night_actions(), 0);
    }

    #[test]
    fn test_remove_prunes_votes_against_the_leaver() {
        let mut room = Room::new(RoomCode::new("ABC123"), seat(1, "Ann"));
        room.push_player(seat(2, "Bob"));
        room.push_player(seat(3, "Cy"));
        room.begin(HashMap::new(), Phase::Day);
        room.day.submit(ParticipantId(1), ParticipantId(3));
        room.day.submit(ParticipantId(2), ParticipantId(1));

        room.remove_connection(ConnectionId::new(3));

        assert_eq!(room.pending_votes(), 1);
        assert_eq!(room.day.resolve(), Some(ParticipantId(1)));
    }
}
