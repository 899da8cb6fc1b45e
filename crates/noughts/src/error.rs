//! Unified error type for the Noughts server.

use noughts_protocol::ProtocolError;
use noughts_room::RoomError;
use noughts_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum NoughtsError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad room code).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, bad move).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Socket-level failure outside the transport's own calls.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
