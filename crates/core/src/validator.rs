//! Move validation - decides whether a swap is allowed.
//!
//! Validation never touches the caller's board; candidate swaps are tried on a
//! scratch clone.

use crate::board::Board;
use crate::error::GameError;
use crate::matcher::has_match_at;
use crate::types::Pos;

/// What a swap must satisfy beyond adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapRule {
    /// Any in-bounds adjacent swap is accepted.
    AdjacentOnly,
    /// The swap must create at least one match.
    MustMatch,
}

impl SwapRule {
    pub fn requires_match(self) -> bool {
        matches!(self, SwapRule::MustMatch)
    }
}

/// An unordered pair of adjacent positions. Stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub a: Pos,
    pub b: Pos,
}

impl Move {
    pub fn new(a: Pos, b: Pos) -> Self {
        if b < a {
            Self { a: b, b: a }
        } else {
            Self { a, b }
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// Check a swap without mutating `board`.
///
/// Returns `InvalidMove` for out-of-bounds or non-adjacent cells, and
/// `IllegalSwap` when `rule` requires a match and the swap makes none.
pub fn check_swap(
    board: &Board,
    a: Pos,
    b: Pos,
    min_run: u8,
    rule: SwapRule,
) -> Result<(), GameError> {
    if !board.in_bounds(a) || !board.in_bounds(b) || !a.is_adjacent(b) {
        return Err(GameError::InvalidMove { a, b });
    }
    if !rule.requires_match() {
        return Ok(());
    }
    let mut scratch = board.clone();
    scratch.swap(a, b)?;
    if creates_match(&scratch, a, b, min_run) {
        Ok(())
    } else {
        Err(GameError::IllegalSwap { a, b })
    }
}

/// `check_swap` as a boolean.
pub fn is_legal_swap(board: &Board, a: Pos, b: Pos, min_run: u8, rule: SwapRule) -> bool {
    check_swap(board, a, b, min_run, rule).is_ok()
}

/// Every legal swap in enumeration order: row-major over cells, right
/// neighbour before down neighbour.
pub fn legal_moves(board: &Board, min_run: u8, rule: SwapRule) -> Vec<Move> {
    let mut out = Vec::new();
    for_each_candidate(board, |scratch, a, b| {
        if !rule.requires_match() || creates_match(scratch, a, b, min_run) {
            out.push(Move::new(a, b));
        }
        true
    });
    out
}

/// True when at least one legal swap exists. Stops at the first hit.
pub fn has_legal_move(board: &Board, min_run: u8, rule: SwapRule) -> bool {
    let mut found = false;
    for_each_candidate(board, |scratch, a, b| {
        found = !rule.requires_match() || creates_match(scratch, a, b, min_run);
        !found
    });
    found
}

fn creates_match(swapped: &Board, a: Pos, b: Pos, min_run: u8) -> bool {
    has_match_at(swapped, a, min_run) || has_match_at(swapped, b, min_run)
}

/// Visit every adjacent pair with the pair swapped on one shared scratch
/// board. The swap is undone after each visit. `f` returns false to stop.
fn for_each_candidate<F>(board: &Board, mut f: F)
where
    F: FnMut(&Board, Pos, Pos) -> bool,
{
    let mut scratch = board.clone();
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let a = Pos::new(row, col);
            let neighbours = [
                (col + 1 < board.cols()).then(|| Pos::new(row, col + 1)),
                (row + 1 < board.rows()).then(|| Pos::new(row + 1, col)),
            ];
            for b in neighbours.into_iter().flatten() {
                // Both cells are in bounds and adjacent, so these cannot fail.
                if scratch.swap(a, b).is_err() {
                    continue;
                }
                let keep_going = f(&scratch, a, b);
                let _ = scratch.swap(a, b);
                if !keep_going {
                    return;
                }
            }
        }
    }
}
