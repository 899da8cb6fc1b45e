//! Wire protocol for Noughts.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`Envelope`], [`ClientMessage`], [`ServerMessage`],
//!   [`RoomView`], etc.) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer doesn't know about sockets or room bookkeeping.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Room engine
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ChatMessage, ClientEnvelope, ClientMessage, Envelope, PROTOCOL_VERSION, Player, PlayerId,
    RejectReason, RoomCode, RoomView, Seat, ServerEnvelope, ServerMessage,
};

// Board types appear inside snapshots, so clients of this crate get them
// from here too.
pub use noughts_rules::{Board, GameState, Outcome, Symbol};
