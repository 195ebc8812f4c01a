//! Room and session state machine for the Mafia server.
//!
//! This is the game core. It receives already-decoded [`ClientEvent`]s
//! tagged with the sending [`ConnectionId`], mutates room state, and hands
//! the resulting [`ServerEvent`]s to a [`Broadcaster`]. It never touches a
//! socket or a byte.
//!
//! # Key types
//!
//! - [`SessionCoordinator`]: the entry point, one event in, outbound events out
//! - [`RoomStore`]: owns every live [`Room`], keyed by [`RoomCode`]
//! - [`RoleDeck`]: shuffles and deals the six-card role deck
//! - [`PhaseController`]: Lobby → Night ⇄ Day, and which events each allows
//! - [`ActionAggregator`]: one-submission-per-player collection with
//!   completion detection, instantiated as [`NightKill`] and [`DayVote`]
//! - [`ConnectionLifecycle`]: removes a closed connection from its rooms
//!
//! The core is synchronous. Callers feed it one event at a time, so every
//! handler is atomic with respect to room state.
//!
//! [`ClientEvent`]: mafia_protocol::ClientEvent
//! [`ServerEvent`]: mafia_protocol::ServerEvent
//! [`RoomCode`]: mafia_protocol::RoomCode
//! [`ConnectionId`]: mafia_transport::ConnectionId

mod aggregator;
mod broadcast;
mod config;
mod coordinator;
mod deck;
mod error;
mod lifecycle;
mod phase;
mod room;
mod store;

pub use aggregator::{
    ActionAggregator, AggregationPolicy, DayVote, NightKill, Submission, plurality,
};
pub use broadcast::{Broadcaster, Outbound, Recipient};
pub use config::CoordinatorConfig;
pub use coordinator::SessionCoordinator;
pub use deck::{DECK, RoleDeck};
pub use error::RoomError;
pub use lifecycle::{ConnectionLifecycle, Departure};
pub use phase::PhaseController;
pub use room::{ParticipantId, Player, Room, RoomStatus};
pub use store::{RoomStore, generate_code};
