//! Win detection for arbitrary board size and win length.
//!
//! The scan walks four line families in a fixed order: rows, columns,
//! top-left → bottom-right diagonals, then top-right → bottom-left
//! diagonals. Within a family, start cells are visited top-to-bottom,
//! left-to-right, and only where a run of `win_condition` cells fits on
//! the board. The first complete run found is the one reported.
//!
//! Cost is O(N² · K) per call.

use crate::{GameState, Outcome, Symbol};

/// A direction as `(row step, column step)`.
type Direction = (usize, isize);

/// Scan order: rows, columns, diagonal, anti-diagonal.
const DIRECTIONS: [Direction; 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A complete winning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The symbol that fills the run.
    pub symbol: Symbol,
    /// Cell indices of the run, from the start cell outwards.
    pub cells: Vec<usize>,
}

/// Returns the symbol of the first winning run, or `None`.
///
/// `cells` must hold at least `board_size * board_size` entries and
/// `1 <= win_condition <= board_size`; [`crate::Rules::new`] enforces
/// both. Out-of-contract parameters yield `None`.
pub fn evaluate(
    cells: &[Option<Symbol>],
    board_size: usize,
    win_condition: usize,
) -> Option<Symbol> {
    find_run(cells, board_size, win_condition).map(|(symbol, _, _)| symbol)
}

/// Like [`evaluate`], but also returns the cells of the winning run.
pub fn winning_line(
    cells: &[Option<Symbol>],
    board_size: usize,
    win_condition: usize,
) -> Option<Line> {
    let (symbol, start, direction) = find_run(cells, board_size, win_condition)?;
    let cells = (0..win_condition)
        .map(|step| step_index(start, direction, step, board_size))
        .collect();
    Some(Line { symbol, cells })
}

/// Returns `true` when every cell holds a symbol.
pub fn is_full(cells: &[Option<Symbol>]) -> bool {
    cells.iter().all(Option::is_some)
}

/// Classifies a board. A winner takes precedence over a full board.
pub fn classify(
    cells: &[Option<Symbol>],
    current: Symbol,
    board_size: usize,
    win_condition: usize,
) -> GameState {
    if let Some(winner) = evaluate(cells, board_size, win_condition) {
        GameState::Finished {
            result: Outcome::Win(winner),
        }
    } else if is_full(cells) {
        GameState::Finished {
            result: Outcome::Draw,
        }
    } else {
        GameState::Playing { turn: current }
    }
}

/// Returns `(symbol, start cell, direction)` of the first complete run.
fn find_run(
    cells: &[Option<Symbol>],
    board_size: usize,
    win_condition: usize,
) -> Option<(Symbol, usize, Direction)> {
    if win_condition == 0
        || win_condition > board_size
        || cells.len() < board_size * board_size
    {
        return None;
    }
    let span = win_condition - 1;

    for direction in DIRECTIONS {
        let (dr, dc) = direction;
        let rows = if dr == 1 {
            0..board_size - span
        } else {
            0..board_size
        };
        let cols = match dc {
            1 => 0..board_size - span,
            -1 => span..board_size,
            _ => 0..board_size,
        };

        for row in rows {
            for col in cols.clone() {
                let start = row * board_size + col;
                let Some(symbol) = cells[start] else {
                    continue;
                };
                let complete = (1..win_condition).all(|step| {
                    cells[step_index(start, direction, step, board_size)] == Some(symbol)
                });
                if complete {
                    return Some((symbol, start, direction));
                }
            }
        }
    }

    None
}

/// Index of the cell `step` steps from `start` along `direction`.
///
/// Only called with starts chosen so the whole run stays on the board.
fn step_index(start: usize, (dr, dc): Direction, step: usize, board_size: usize) -> usize {
    let row = start / board_size + dr * step;
    let col = (start % board_size) as isize + dc * step as isize;
    row * board_size + col as usize
}
