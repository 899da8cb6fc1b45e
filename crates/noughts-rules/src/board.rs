//! Symbols, the board, and the per-room rules (size and win length).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GameState, Line, RulesError};

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// One of the two markers a seated player places on the board.
///
/// Serialized as `"X"` / `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// Both symbols, in seating order.
    pub const ALL: [Symbol; 2] = [Symbol::X, Symbol::O];

    /// Returns the opposing symbol.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A flat, row-major board. `None` is an empty cell.
///
/// The board doesn't store its own side length; that lives in [`Rules`].
/// Serialized as a plain array: `["X", null, "O", ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board(Vec<Option<Symbol>>);

impl Board {
    /// Creates an all-empty board with `board_size * board_size` cells.
    pub fn empty(board_size: usize) -> Self {
        Self(vec![None; board_size * board_size])
    }

    /// Returns the cells in row-major order.
    pub fn cells(&self) -> &[Option<Symbol>] {
        &self.0
    }

    /// Number of cells on the board.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a zero-cell board.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the symbol at `index`, or `None` if the cell is empty or
    /// doesn't exist.
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied().flatten()
    }

    /// Writes `symbol` into an empty cell.
    ///
    /// # Errors
    /// [`RulesError::OutOfBounds`] if `index` is past the end,
    /// [`RulesError::Occupied`] if the cell already holds a symbol.
    /// The board is unchanged on error.
    pub fn place(&mut self, index: usize, symbol: Symbol) -> Result<(), RulesError> {
        let cells = self.0.len();
        let cell = self
            .0
            .get_mut(index)
            .ok_or(RulesError::OutOfBounds { index, cells })?;
        if cell.is_some() {
            return Err(RulesError::Occupied(index));
        }
        *cell = Some(symbol);
        Ok(())
    }

    /// Empties every cell, keeping the size.
    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|cell| *cell = None);
    }
}

impl From<Vec<Option<Symbol>>> for Board {
    fn from(cells: Vec<Option<Symbol>>) -> Self {
        Self(cells)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Board size `N` and win length `K` for one room, with `1 <= K <= N`.
///
/// The only way to get a `Rules` is through [`Rules::new`], so every
/// detection call made through it has valid parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    board_size: usize,
    win_condition: usize,
}

impl Rules {
    /// Classic 3×3, three in a row.
    pub const CLASSIC: Rules = Rules {
        board_size: 3,
        win_condition: 3,
    };

    /// Validates and builds rules.
    ///
    /// # Errors
    /// Rejects a zero board size, a zero win condition, and a win
    /// condition larger than the board.
    pub fn new(board_size: usize, win_condition: usize) -> Result<Self, RulesError> {
        if board_size == 0 {
            return Err(RulesError::EmptyBoard);
        }
        if win_condition == 0 {
            return Err(RulesError::ZeroWinCondition);
        }
        if win_condition > board_size {
            return Err(RulesError::WinConditionTooLarge {
                board_size,
                win_condition,
            });
        }
        Ok(Self {
            board_size,
            win_condition,
        })
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn win_condition(&self) -> usize {
        self.win_condition
    }

    /// Total number of cells, `N * N`.
    pub fn cell_count(&self) -> usize {
        self.board_size * self.board_size
    }

    /// A fresh empty board of the right size.
    pub fn empty_board(&self) -> Board {
        Board::empty(self.board_size)
    }

    /// See [`crate::evaluate`].
    pub fn winner(&self, board: &Board) -> Option<Symbol> {
        crate::evaluate(board.cells(), self.board_size, self.win_condition)
    }

    /// See [`crate::winning_line`].
    pub fn winning_line(&self, board: &Board) -> Option<Line> {
        crate::winning_line(board.cells(), self.board_size, self.win_condition)
    }

    /// See [`crate::classify`].
    pub fn classify(&self, board: &Board, current: Symbol) -> GameState {
        crate::classify(board.cells(), current, self.board_size, self.win_condition)
    }
}
