//! Session coordinator: the single entry point into the game core.
//!
//! The server feeds it one event at a time. Each handler validates first,
//! then mutates, then returns the events to send. If validation fails the
//! sender gets one `error` event and nothing else changes.

use std::collections::{BTreeMap, HashMap};

use mafia_protocol::{ClientEvent, EventKind, Phase, RoomCode, ServerEvent};
use mafia_transport::ConnectionId;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::aggregator::{ActionAggregator, AggregationPolicy, DayVote, NightKill};
use crate::{
    Broadcaster, ConnectionLifecycle, CoordinatorConfig, Departure, Outbound, ParticipantId,
    PhaseController, Player, Recipient, RoleDeck, Room, RoomError, RoomStatus, RoomStore,
    generate_code,
};

/// Owns all room state and turns inbound events into outbound events.
///
/// `B` is where outbound events go. In the server it's a set of bounded
/// per-connection channels; in tests a plain `Vec` works.
///
/// # Example
///
/// ```rust
/// use mafia_protocol::{ClientEvent, ServerEvent};
/// use mafia_room::{CoordinatorConfig, SessionCoordinator};
/// use mafia_transport::ConnectionId;
///
/// let mut coordinator = SessionCoordinator::new(CoordinatorConfig::default(), Vec::new());
/// coordinator.handle(ConnectionId::new(1), ClientEvent::Create { player_name: "Ann".into() });
///
/// let (to, event) = &coordinator.broadcaster()[0];
/// assert_eq!(*to, ConnectionId::new(1));
/// assert!(matches!(event, ServerEvent::Created { .. }));
/// ```
pub struct SessionCoordinator<B: Broadcaster> {
    store: RoomStore,
    deck: RoleDeck,
    rng: StdRng,
    config: CoordinatorConfig,
    next_participant: u64,
    broadcaster: B,
}

impl<B: Broadcaster> SessionCoordinator<B> {
    /// Creates a coordinator with an empty store.
    pub fn new(config: CoordinatorConfig, broadcaster: B) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            store: RoomStore::new(),
            deck: RoleDeck::new(),
            rng,
            config,
            next_participant: 1,
            broadcaster,
        }
    }

    pub fn store(&self) -> &RoomStore {
        &self.store
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    pub fn broadcaster_mut(&mut self) -> &mut B {
        &mut self.broadcaster
    }

    /// Handles one inbound event from `connection`, end to end.
    pub fn handle(&mut self, connection: ConnectionId, event: ClientEvent) {
        let kind = event.kind();
        let result = match event {
            ClientEvent::Create { player_name } => self.create(connection, player_name),
            ClientEvent::Join {
                room_code,
                player_name,
            } => self.join(connection, &room_code, player_name),
            ClientEvent::Start { room_code } => self.start(connection, &room_code),
            ClientEvent::NightAction {
                room_code,
                player_name,
                action,
            } => self.night_action(connection, &room_code, &player_name, &action),
            ClientEvent::Vote {
                room_code,
                player_name,
                target,
            } => self.vote(connection, &room_code, &player_name, &target),
            ClientEvent::Leave { room_code } => self.leave(connection, &room_code),
        };

        match result {
            Ok(outbound) => self.dispatch(outbound),
            Err(e) => {
                tracing::debug!(conn_id = %connection, event = %kind, error = %e, "event rejected");
                self.broadcaster
                    .send(connection, ServerEvent::error(e.to_string()));
            }
        }
    }

    /// Handles a closed connection: unseats it everywhere and tells the
    /// remaining players.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        let departures = ConnectionLifecycle::disconnect(&mut self.store, connection);
        let outbound = departures
            .into_iter()
            .flat_map(|departure| self.after_departure(departure))
            .collect();
        self.dispatch(outbound);
    }

    // -----------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------

    fn create(
        &mut self,
        connection: ConnectionId,
        player_name: String,
    ) -> Result<Vec<Outbound>, RoomError> {
        let name = validate_name(player_name)?;
        if let Some(code) = self.store.room_of(connection) {
            return Err(RoomError::AlreadyInRoom(code.clone()));
        }

        let host = Player::new(self.allocate_participant(), name, connection);
        let mut attempts = 0;
        let code = loop {
            if attempts == self.config.max_code_attempts {
                return Err(RoomError::CodeSpaceExhausted(attempts));
            }
            attempts += 1;
            let code = generate_code(&mut self.rng, self.config.code_length);
            match self.store.create(code.clone(), host.clone()) {
                Ok(_) => break code,
                Err(RoomError::DuplicateRoomCode(_)) => {
                    tracing::debug!(room_code = %code, "room code collision, drawing again");
                }
                Err(e) => return Err(e),
            }
        };

        let room = self.store.get(&code)?;
        tracing::info!(room_code = %code, conn_id = %connection, "room created");
        Ok(vec![(
            Recipient::Connection(connection),
            ServerEvent::Created {
                room_code: code,
                players: room.roster(),
            },
        )])
    }

    fn join(
        &mut self,
        connection: ConnectionId,
        code: &RoomCode,
        player_name: String,
    ) -> Result<Vec<Outbound>, RoomError> {
        let phase = self.store.get(code)?.phase();
        PhaseController::check(phase, EventKind::Join)?;
        let name = validate_name(player_name)?;
        if let Some(current) = self.store.room_of(connection) {
            return Err(RoomError::AlreadyInRoom(current.clone()));
        }

        let player = Player::new(self.allocate_participant(), name, connection);
        let room = self.store.get_mut(code)?;
        room.push_player(player);
        let players = room.roster();
        tracing::info!(room_code = %code, conn_id = %connection, players = players.len(), "player joined");

        Ok(vec![
            (
                Recipient::Connection(connection),
                ServerEvent::Joined {
                    room_code: code.clone(),
                    players: players.clone(),
                },
            ),
            (Recipient::Room(code.clone()), ServerEvent::PlayersUpdate { players }),
        ])
    }

    fn start(&mut self, connection: ConnectionId, code: &RoomCode) -> Result<Vec<Outbound>, RoomError> {
        let room = self.store.get_mut(code)?;
        let sender = room.member(connection).ok_or(RoomError::NotInRoom)?;
        if !sender.is_host {
            return Err(RoomError::NotHost);
        }
        if room.status() == RoomStatus::Playing {
            return Err(RoomError::AlreadyStarted(code.clone()));
        }
        PhaseController::check(room.phase(), EventKind::Start)?;

        let seats: Vec<ParticipantId> = room.players().iter().map(|p| p.id).collect();
        let dealt = self.deck.assign(&seats, &mut self.rng);
        let phase = PhaseController::next(room.phase());
        room.begin(dealt.iter().copied().collect::<HashMap<_, _>>(), phase);
        tracing::info!(room_code = %code, players = seats.len(), "game started");

        let mut outbound: Vec<Outbound> = dealt
            .into_iter()
            .filter_map(|(id, role)| {
                let player = room.player(id)?;
                Some((
                    Recipient::Connection(player.connection),
                    ServerEvent::RoleAssigned { role },
                ))
            })
            .collect();
        outbound.push((Recipient::Room(code.clone()), ServerEvent::GameStarted { phase }));
        outbound.extend(settle(room));
        Ok(outbound)
    }

    fn night_action(
        &mut self,
        connection: ConnectionId,
        code: &RoomCode,
        player_name: &str,
        target: &str,
    ) -> Result<Vec<Outbound>, RoomError> {
        let room = self.store.get_mut(code)?;
        PhaseController::check(room.phase(), EventKind::NightAction)?;
        let (from, target) = validate_submission::<NightKill>(room, connection, player_name, target)?;

        room.night.submit(from, target);
        tracing::debug!(room_code = %code, player = %from, "night action recorded");

        Ok(settle(room))
    }

    fn vote(
        &mut self,
        connection: ConnectionId,
        code: &RoomCode,
        player_name: &str,
        target: &str,
    ) -> Result<Vec<Outbound>, RoomError> {
        let room = self.store.get_mut(code)?;
        PhaseController::check(room.phase(), EventKind::Vote)?;
        let (from, target) = validate_submission::<DayVote>(room, connection, player_name, target)?;

        room.day.submit(from, target);
        tracing::debug!(room_code = %code, player = %from, "vote recorded");

        Ok(settle(room))
    }

    fn leave(&mut self, connection: ConnectionId, code: &RoomCode) -> Result<Vec<Outbound>, RoomError> {
        let departure = ConnectionLifecycle::leave(&mut self.store, code, connection)?;
        Ok(self.after_departure(departure))
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    /// Roster update for whoever is left, plus the phase result if the
    /// departure was the last thing the phase was waiting on.
    fn after_departure(&mut self, departure: Departure) -> Vec<Outbound> {
        if departure.room_closed {
            return Vec::new();
        }
        let Ok(room) = self.store.get_mut(&departure.room_code) else {
            return Vec::new();
        };

        let mut outbound = vec![(
            Recipient::Room(departure.room_code.clone()),
            ServerEvent::PlayersUpdate {
                players: room.roster(),
            },
        )];
        outbound.extend(settle(room));
        outbound
    }

    /// Delivers outbound events, expanding room recipients to members.
    fn dispatch(&mut self, outbound: Vec<Outbound>) {
        for (recipient, event) in outbound {
            match recipient {
                Recipient::Connection(connection) => self.broadcaster.send(connection, event),
                Recipient::Room(code) => {
                    let Ok(room) = self.store.get(&code) else {
                        continue;
                    };
                    for connection in room.connections() {
                        self.broadcaster.send(connection, event.clone());
                    }
                }
            }
        }
    }

    fn allocate_participant(&mut self) -> ParticipantId {
        let id = ParticipantId(self.next_participant);
        self.next_participant += 1;
        id
    }
}

fn validate_name(name: String) -> Result<String, RoomError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RoomError::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// Checks that `connection` may submit `target_name` under policy `P`.
/// Returns the submitter's and the target's participant IDs.
fn validate_submission<P: AggregationPolicy>(
    room: &Room,
    connection: ConnectionId,
    player_name: &str,
    target_name: &str,
) -> Result<(ParticipantId, ParticipantId), RoomError> {
    let sender = room.member(connection).ok_or(RoomError::NotInRoom)?;
    if sender.name != player_name.trim() {
        return Err(RoomError::NameMismatch);
    }
    if !P::is_eligible(sender, room.role_of(sender.id)) {
        return Err(RoomError::NotEligible);
    }
    let target = room
        .living_by_name(target_name.trim())
        .ok_or_else(|| RoomError::UnknownTarget(target_name.to_string()))?;
    Ok((sender.id, target.id))
}

/// Resolves phases for as long as the current one is complete.
///
/// A phase with nobody eligible to act is complete as soon as it starts:
/// a Night with no living Mafia resolves with no victim and play moves on
/// to Day. Returns the result events in order, addressed to the room.
/// A room with no living players never advances.
fn settle(room: &mut Room) -> Vec<Outbound> {
    let mut outbound = Vec::new();
    while room.players().iter().any(|p| p.alive) {
        let event = match room.phase() {
            Phase::Night if is_ready(&room.night, room) => resolve_night(room),
            Phase::Day if is_ready(&room.day, room) => resolve_day(room),
            _ => break,
        };
        room.set_phase(PhaseController::next(room.phase()));
        tracing::info!(room_code = %room.code(), phase = %room.phase(), "phase resolved");
        outbound.push((Recipient::Room(room.code().clone()), event));
    }
    outbound
}

fn is_ready<P: AggregationPolicy>(aggregator: &ActionAggregator<P>, room: &Room) -> bool {
    aggregator.is_complete(room.players(), room.roles())
}

fn resolve_night(room: &mut Room) -> ServerEvent {
    let victim = room.night.resolve();
    room.night.clear();
    let killed = victim.and_then(|id| room.kill(id));
    ServerEvent::NightResult { killed }
}

fn resolve_day(room: &mut Room) -> ServerEvent {
    let eliminated = room.day.resolve();
    let votes: BTreeMap<String, String> = room
        .day
        .drain()
        .into_iter()
        .filter_map(|s| {
            let voter = room.player(s.from)?.name.clone();
            let target = room.player(s.target)?.name.clone();
            Some((voter, target))
        })
        .collect();
    let eliminated = eliminated.and_then(|id| room.kill(id));
    ServerEvent::VotingResult { eliminated, votes }
}
