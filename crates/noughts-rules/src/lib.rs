//! Board rules for Noughts.
//!
//! This crate knows nothing about rooms, players, or connections. It only
//! answers questions about a board:
//!
//! - **Who has won?** ([`evaluate`], [`winning_line`], [`Rules::winner`])
//! - **Is the board full?** ([`is_full`])
//! - **What state is the game in?** ([`classify`], [`GameState`])
//!
//! Every function here is pure. The room engine calls them after every
//! move and on every snapshot, so a [`GameState`] is never stored, only
//! recomputed.
//!
//! # Board layout
//!
//! A board of size `N` is a flat sequence of `N * N` cells in row-major
//! order: cell `row * N + col`.
//!
//! ```text
//!  0 | 1 | 2
//!  3 | 4 | 5
//!  6 | 7 | 8
//! ```

mod board;
mod detect;
mod error;
mod state;

pub use board::{Board, Rules, Symbol};
pub use detect::{Line, classify, evaluate, is_full, winning_line};
pub use error::RulesError;
pub use state::{GameState, Outcome};
