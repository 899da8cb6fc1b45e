//! Room session engine for Noughts.
//!
//! A [`RoomRegistry`] owns every live [`Room`]. Each room holds one board,
//! up to two seated players (X and O), any number of spectators, and a
//! bounded chat log. All operations are synchronous; callers that share a
//! registry across tasks put it behind a lock and hold that lock for the
//! whole operation.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates rooms, routes joins, moves, chat and leaves
//! - [`Room`] — one session's board, roster and chat
//! - [`RoomConfig`] — board size range, chat bound, code length
//! - [`RoomError`] — why an operation was refused
//! - [`CodeGenerator`] / [`Clock`] — injectable randomness and time

mod clock;
mod code;
mod config;
mod error;
mod registry;
mod room;

pub use clock::{Clock, FixedClock, SystemClock};
pub use code::{CodeGenerator, RandomCodes, ScriptedCodes};
pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{Departure, Joined, MoveOutcome, Room};
