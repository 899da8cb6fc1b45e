//! The derived game state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Symbol;

/// How a finished round ended.
///
/// JSON: `{"win": "X"}` or `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win(Symbol),
    Draw,
}

/// Classification of a board, always recomputed from the board itself.
///
/// `#[serde(tag = "status")]` gives
/// `{"status": "playing", "turn": "O"}` and
/// `{"status": "finished", "result": "draw"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameState {
    /// The round is in progress and `turn` moves next.
    Playing { turn: Symbol },
    /// Someone won, or the board filled up.
    Finished { result: Outcome },
}

impl GameState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// The winning symbol, if the round ended in a win.
    pub fn winner(&self) -> Option<Symbol> {
        match self {
            Self::Finished {
                result: Outcome::Win(symbol),
            } => Some(*symbol),
            _ => None,
        }
    }

    /// Whose turn it is, if the round is still in progress.
    pub fn turn(&self) -> Option<Symbol> {
        match self {
            Self::Playing { turn } => Some(*turn),
            Self::Finished { .. } => None,
        }
    }
}

/// The status line shown to players.
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing { turn } => write!(f, "{turn}'s turn"),
            Self::Finished {
                result: Outcome::Win(symbol),
            } => write!(f, "{symbol} wins!"),
            Self::Finished {
                result: Outcome::Draw,
            } => write!(f, "It's a draw!"),
        }
    }
}
