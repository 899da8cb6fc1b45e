//! Error types for board rules.

/// Errors raised when building rules or placing a symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A board needs at least one row.
    #[error("board size must be at least 1")]
    EmptyBoard,

    /// A run of zero cells can't win anything.
    #[error("win condition must be at least 1")]
    ZeroWinCondition,

    /// The run required to win doesn't fit on the board.
    #[error("win condition {win_condition} exceeds board size {board_size}")]
    WinConditionTooLarge {
        board_size: usize,
        win_condition: usize,
    },

    /// The cell index doesn't address a cell on this board.
    #[error("cell {index} is outside a board of {cells} cells")]
    OutOfBounds { index: usize, cells: usize },

    /// The cell already holds a symbol.
    #[error("cell {0} is already occupied")]
    Occupied(usize),
}
