//! # Mafia
//!
//! A WebSocket server that hosts rooms of the Mafia party game.
//!
//! Clients speak JSON over WebSocket: they create or join a room by code,
//! the host starts the game, and the server deals secret roles, collects
//! night actions and day votes, and broadcasts each phase's outcome.
//!
//! The game rules live in [`mafia_room`]; this crate wires them to
//! sockets through a single coordinator task.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mafia::prelude::*;
//!
//! # async fn launch() -> Result<(), MafiaError> {
//! let server = MafiaServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod broadcast;
mod config;
mod coordinator;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::MafiaError;
pub use server::{MafiaServer, MafiaServerBuilder};

pub use mafia_protocol as protocol;
pub use mafia_room as room;
pub use mafia_transport as transport;

pub mod prelude {
    pub use crate::{MafiaError, MafiaServer, MafiaServerBuilder, ServerConfig};
    pub use mafia_protocol::{ClientEvent, Phase, Role, RoomCode, ServerEvent};
    pub use mafia_room::CoordinatorConfig;
}
