//! # Noughts
//!
//! Real-time multiplayer noughts-and-crosses server.
//!
//! Players create or join rooms identified by short codes, play on an N×N
//! board where K in a row wins, chat, and watch as spectators. The server
//! is authoritative: clients send intents, the room registry validates and
//! applies them, and every connection in the room receives a fresh
//! snapshot after each change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use noughts::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), NoughtsError> {
//!     let server = NoughtsServer::builder()
//!         .bind("127.0.0.1:4000")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod dispatch;
mod error;
mod handler;
mod hub;
pub mod logging;
mod server;

pub use error::NoughtsError;
pub use server::{NoughtsServer, NoughtsServerBuilder, ServerConfig};

/// Everything a server binary or a test client usually needs.
pub mod prelude {
    pub use crate::logging::init_tracing;
    pub use crate::{NoughtsError, NoughtsServer, NoughtsServerBuilder, ServerConfig};
    pub use noughts_protocol::{
        ChatMessage, ClientEnvelope, ClientMessage, Codec, Envelope, JsonCodec, PROTOCOL_VERSION,
        Player, PlayerId, RejectReason, RoomCode, RoomView, Seat, ServerEnvelope, ServerMessage,
    };
    pub use noughts_room::{RoomConfig, RoomError, RoomRegistry, ScriptedCodes};
    pub use noughts_rules::{Board, GameState, Outcome, Rules, Symbol};
}
