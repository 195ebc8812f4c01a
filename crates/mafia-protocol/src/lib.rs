//! Wire protocol for the Mafia server.
//!
//! This crate defines the "language" clients and the server speak:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) and the game vocabulary
//!   they carry ([`Role`], [`Phase`], [`RoomCode`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about connections or rooms.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent) → Room core (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientEvent, EventKind, Phase, Role, RoomCode, ServerEvent};
