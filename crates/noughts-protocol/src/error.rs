//! Error types for the protocol layer.
//!
//! Each crate in Noughts defines its own error enum. A `ProtocolError`
//! means the problem is in (de)serialization or a malformed identifier,
//! not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, an
    /// unknown message `type`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that is empty or contains non-alphanumeric characters.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),
}
