//! Core protocol types for the Noughts wire format.
//!
//! Every type in this module travels "on the wire": it is serialized,
//! sent over a connection, and deserialized on the other side. Room
//! snapshots ([`RoomView`]) live here as well, because they are the one
//! representation of a room that observers ever see.

use std::fmt;
use std::str::FromStr;

use noughts_rules::{Board, GameState, Symbol};
use noughts_transport::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// The current protocol version, announced in [`ServerMessage::Welcome`].
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies one participant: one per connection.
///
/// A "newtype wrapper" around `u64` so it can't be mixed up with any
/// other number. `#[serde(transparent)]` makes `PlayerId(42)` serialize
/// as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A player's identity is its connection's identity.
impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

/// A short, case-insensitive alphanumeric room code such as `"K7QZ"`.
///
/// Codes are normalized to upper case when constructed (including when
/// deserialized), so `"k7qz"` and `"K7QZ"` name the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates and normalizes a room code.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidRoomCode`] if `code` is empty or contains
    /// anything other than ASCII letters and digits.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ProtocolError> {
        let code = code.as_ref().trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProtocolError::InvalidRoomCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

// ---------------------------------------------------------------------------
// Roster and chat
// ---------------------------------------------------------------------------

/// Where a participant sits: at the board with a symbol, or watching.
///
/// JSON: `{"role": "player", "symbol": "X"}` or `{"role": "spectator"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Seat {
    Player { symbol: Symbol },
    Spectator,
}

/// One participant in a room.
///
/// `symbol` is `None` exactly when `is_spectator` is `true`; use the
/// constructors to keep the two in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub symbol: Option<Symbol>,
    pub is_spectator: bool,
}

impl Player {
    /// A participant seated at the board.
    pub fn seated(id: PlayerId, nickname: impl Into<String>, symbol: Symbol) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            symbol: Some(symbol),
            is_spectator: false,
        }
    }

    /// A participant who only watches and chats.
    pub fn spectator(id: PlayerId, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            symbol: None,
            is_spectator: true,
        }
    }

    pub fn seat(&self) -> Seat {
        match self.symbol {
            Some(symbol) if !self.is_spectator => Seat::Player { symbol },
            _ => Seat::Spectator,
        }
    }
}

/// One chat line. `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub nickname: String,
    pub text: String,
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// RoomView — the broadcast snapshot
// ---------------------------------------------------------------------------

/// The full externally visible state of a room.
///
/// Built fresh by the room engine on every request; `game_state`,
/// `status`, and `winning_line` are derived from `board` at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    pub code: RoomCode,
    /// Participants in join order.
    pub players: Vec<Player>,
    pub board: Board,
    pub board_size: usize,
    pub win_condition: usize,
    pub current_player: Symbol,
    pub game_state: GameState,
    /// Human-readable form of `game_state`, e.g. `"O's turn"`.
    pub status: String,
    /// Cells of the winning run, when there is one.
    pub winning_line: Option<Vec<usize>>,
    pub messages: Vec<ChatMessage>,
    pub round_count: u32,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl RoomView {
    /// Looks up a participant by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The seated participant holding `symbol`, if any.
    pub fn player_with(&self, symbol: Symbol) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| !p.is_spectator && p.symbol == Some(symbol))
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Intents a client can send.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{"type": "MakeMove", "cell": 4}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Create a room and take the first seat in it.
    CreateRoom {
        nickname: String,
        board_size: usize,
        win_condition: usize,
    },

    /// Take a seat in a room; falls back to spectating when both seats
    /// are taken.
    JoinRoom { code: RoomCode, nickname: String },

    /// Enter a room as a spectator.
    JoinAsSpectator { code: RoomCode, nickname: String },

    /// Place this player's symbol in `cell` (row-major index).
    MakeMove { cell: usize },

    /// Post a chat line to the current room.
    SendMessage { text: String },

    /// Clear the board for a new round.
    ResetGame,

    /// Leave the current room.
    LeaveRoom,

    /// Keep-alive. `client_time` is echoed back.
    Heartbeat { client_time: u64 },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Why an intent was refused. Serialized as a snake_case string code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    RoomNotFound,
    RoomFull,
    NotAPlayer,
    NotYourTurn,
    CellOccupied,
    InvalidCell,
    InvalidBoard,
    CodeExhausted,
    AlreadyInRoom,
    NotInRoom,
    BadRequest,
}

/// Messages the server sends.
///
/// Replies (`RoomCreated`, `Joined`, `MoveAccepted`, `GameReset`, `Left`,
/// `Rejected`, `HeartbeatAck`) go only to the connection that sent the
/// intent. `RoomUpdated` is broadcast to every connection in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// First message on every connection.
    Welcome { player_id: PlayerId, version: u32 },

    /// A room was created; the creator is seated in it.
    RoomCreated { code: RoomCode },

    /// The connection entered a room. `seat` says exactly where.
    Joined {
        code: RoomCode,
        seat: Seat,
        room: RoomView,
    },

    /// The move was applied.
    MoveAccepted { board: Board, game_state: GameState },

    /// The board was cleared for a new round.
    GameReset { board: Board },

    /// The connection left its room.
    Left { code: RoomCode },

    /// Fresh snapshot after any state change in the room.
    RoomUpdated { room: RoomView },

    /// The intent was refused; nothing changed.
    Rejected {
        reason: RejectReason,
        message: String,
    },

    /// Reply to [`ClientMessage::Heartbeat`].
    HeartbeatAck { client_time: u64, server_time: u64 },
}

// ---------------------------------------------------------------------------
// Envelope — the top-level wire format
// ---------------------------------------------------------------------------

/// The wrapper around every message on the wire.
///
/// ```text
/// { "seq": 42, "timestamp": 15000, "message": { "type": "...", ... } }
/// ```
///
/// `seq` counts per direction per connection; `timestamp` is milliseconds
/// since the sender's connection started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<M> {
    pub seq: u64,
    pub timestamp: u64,
    pub message: M,
}

/// What clients send.
pub type ClientEnvelope = Envelope<ClientMessage>;

/// What the server sends.
pub type ServerEnvelope = Envelope<ServerMessage>;

// =========================================================================
// Tests
// =========================================================================
