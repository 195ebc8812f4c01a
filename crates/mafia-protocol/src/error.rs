//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
///
/// A decode failure is a *malformed event*: the bytes never become a
/// [`ClientEvent`](crate::ClientEvent), so the game core never sees them.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `type`,
    /// or a missing required field.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
