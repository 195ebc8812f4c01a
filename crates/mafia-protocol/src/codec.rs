//! Codec trait and implementations for serializing/deserializing events.
//!
//! The server never calls `serde_json` directly; it goes through a
//! [`Codec`], so the wire format can change without touching the
//! connection handler or the game core.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts between Rust values and wire bytes.
///
/// `Send + Sync + 'static` because one codec is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented
    /// in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks JSON (via `serde_json`).
///
/// This is what browser clients expect, and it's behind the `json`
/// feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use mafia_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let event: ClientEvent = codec
///     .decode(br#"{"type":"create","playerName":"Ann"}"#)
///     .unwrap();
/// assert_eq!(event, ClientEvent::Create { player_name: "Ann".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientEvent, Phase, ServerEvent};

    #[test]
    fn test_encode_server_event_is_utf8_json() {
        let bytes = JsonCodec
            .encode(&ServerEvent::GameStarted { phase: Phase::Night })
            .unwrap();
        let text = std::str::from_utf8(&bytes).expect("JSON is UTF-8");
        assert_eq!(text, r#"{"type":"gameStarted","phase":"night"}"#);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_error_message_mentions_cause() {
        let err = JsonCodec
            .decode::<ClientEvent>(br#"{"type":"join","roomCode":"ABC"}"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("decode failed"));
        assert!(err.to_string().contains("playerName"));
    }
}
