//! Error types for the room engine.

use noughts_protocol::{PlayerId, RejectReason, RoomCode, Symbol};
use noughts_rules::RulesError;

/// Reasons a room operation was refused.
///
/// Every variant is recoverable: the room and the registry are left
/// exactly as they were.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room is registered under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Both seats are taken. The caller may admit the connection as a
    /// spectator instead; see [`RoomError::suggests_spectating`].
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The connection is already in this room's roster.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// The connection isn't seated in the room (absent, or spectating).
    #[error("player {0} is not playing in this room")]
    NotAPlayer(PlayerId),

    /// The player's symbol isn't the one to move.
    #[error("it's {turn}'s turn")]
    NotYourTurn { player: PlayerId, turn: Symbol },

    /// The target cell already holds a symbol.
    #[error("cell {0} is already occupied")]
    CellOccupied(usize),

    /// The cell index doesn't exist on this board.
    #[error("cell {cell} is outside a board of {cells} cells")]
    InvalidCell { cell: usize, cells: usize },

    /// The requested board size is outside the configured range.
    #[error("board size {size} is outside {min}..={max}")]
    BoardSizeOutOfRange { size: usize, min: usize, max: usize },

    /// The board size and win condition don't form valid rules.
    #[error("invalid board: {0}")]
    InvalidBoard(#[from] RulesError),

    /// Every generated code collided with an existing room.
    #[error("could not generate a unique room code after {0} attempts")]
    CodeExhausted(usize),
}

impl RoomError {
    /// `true` when the caller should retry the join as a spectator.
    pub fn suggests_spectating(&self) -> bool {
        matches!(self, Self::RoomFull(_))
    }

    /// The wire code reported back to the client.
    pub fn reject_reason(&self) -> RejectReason {
        match self {
            Self::NotFound(_) => RejectReason::RoomNotFound,
            Self::RoomFull(_) => RejectReason::RoomFull,
            Self::AlreadyInRoom(..) => RejectReason::AlreadyInRoom,
            Self::NotAPlayer(_) => RejectReason::NotAPlayer,
            Self::NotYourTurn { .. } => RejectReason::NotYourTurn,
            Self::CellOccupied(_) => RejectReason::CellOccupied,
            Self::InvalidCell { .. } => RejectReason::InvalidCell,
            Self::BoardSizeOutOfRange { .. } | Self::InvalidBoard(_) => {
                RejectReason::InvalidBoard
            }
            Self::CodeExhausted(_) => RejectReason::CodeExhausted,
        }
    }
}
