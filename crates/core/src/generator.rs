//! Board generation - opening boards and reshuffles
//!
//! Generated boards never contain a match and always offer at least one swap
//! that creates one.

use crate::board::Board;
use crate::config::KindSet;
use crate::error::GameError;
use crate::matcher::{find_matches, has_match_at, MatchRules};
use crate::rng::{shuffle, RandomSource};
use crate::types::{JewelKind, Pos};
use crate::validator::{has_legal_move, SwapRule};

/// Draws per cell before falling back to the first kind that fits.
const MAX_REROLLS: u32 = 8;
/// Whole-board attempts before giving up.
const MAX_ATTEMPTS: u32 = 64;
/// Permutations tried by `reshuffle` before it regenerates from scratch.
const SHUFFLE_ATTEMPTS: u32 = 32;

/// Generate a stable, playable board.
pub fn generate<R: RandomSource + ?Sized>(
    rows: u8,
    cols: u8,
    kinds: &KindSet,
    min_run: u8,
    rng: &mut R,
) -> Result<Board, GameError> {
    let mut board = Board::new(rows, cols)?;
    for _ in 0..MAX_ATTEMPTS {
        board.clear();
        fill(&mut board, kinds, min_run, rng);
        if is_playable(&board, min_run) {
            return Ok(board);
        }
    }
    Err(GameError::InvalidConfig(format!(
        "no playable {}x{} board with {} kinds and min_run {} after {} attempts",
        rows,
        cols,
        kinds.len(),
        min_run,
        MAX_ATTEMPTS
    )))
}

/// Rearrange the board's tiles into a stable, playable layout.
///
/// Permutations of the existing kinds are tried first; if none works the
/// board is regenerated from `kinds`.
pub fn reshuffle<R: RandomSource + ?Sized>(
    board: &mut Board,
    kinds: &KindSet,
    min_run: u8,
    rng: &mut R,
) -> Result<(), GameError> {
    let mut pool: Vec<JewelKind> = board.tiles().map(|t| t.kind).collect();
    if pool.len() == board.slots().len() {
        for _ in 0..SHUFFLE_ATTEMPTS {
            shuffle(&mut pool, rng);
            board.refill_from(&pool);
            if is_playable(board, min_run) {
                return Ok(());
            }
        }
    }
    *board = generate(board.rows(), board.cols(), kinds, min_run, rng)?;
    Ok(())
}

fn is_playable(board: &Board, min_run: u8) -> bool {
    let rules = MatchRules {
        min_run,
        ..MatchRules::default()
    };
    find_matches(board, &rules).is_empty() && has_legal_move(board, min_run, SwapRule::MustMatch)
}

fn fill<R: RandomSource + ?Sized>(board: &mut Board, kinds: &KindSet, min_run: u8, rng: &mut R) {
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let pos = Pos::new(row, col);
            let mut kind = kinds.draw(rng);
            board.put(pos, kind);
            let mut rerolls = 0;
            while has_match_at(board, pos, min_run) && rerolls < MAX_REROLLS {
                kind = kinds.draw(rng);
                board.put(pos, kind);
                rerolls += 1;
            }
            if !has_match_at(board, pos, min_run) {
                continue;
            }
            for &fit in kinds.as_slice() {
                board.put(pos, fit);
                if !has_match_at(board, pos, min_run) {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SimpleRng};

    #[test]
    fn test_generated_board_is_stable_and_playable() {
        for seed in 1..20 {
            let mut rng = SimpleRng::new(seed);
            let board = generate(8, 8, &KindSet::all(), 3, &mut rng).unwrap();
            assert!(board.is_full());
            assert!(find_matches(&board, &MatchRules::default()).is_empty());
            assert!(has_legal_move(&board, 3, SwapRule::MustMatch));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(6, 7, &KindSet::all(), 3, &mut SimpleRng::new(42)).unwrap();
        let b = generate(6, 7, &KindSet::all(), 3, &mut SimpleRng::new(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_falls_back_when_source_repeats() {
        // Every draw is red; the fallback has to pick other kinds.
        let mut board = Board::new(4, 4).unwrap();
        fill(&mut board, &KindSet::first(3).unwrap(), 3, &mut ScriptedRng::constant(0));
        assert!(board.is_full());
        assert!(find_matches(&board, &MatchRules::default()).is_empty());
    }

    #[test]
    fn test_impossible_config_errors() {
        // A single kind always forms runs.
        let kinds = KindSet::first(1).unwrap();
        let err = generate(3, 3, &kinds, 3, &mut SimpleRng::new(1)).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_reshuffle_fixes_dead_board() {
        let mut board = Board::parse(&["RGB", "OYP", "GBR"]).unwrap();
        assert!(!has_legal_move(&board, 3, SwapRule::MustMatch));
        // Only pairs of each kind exist, so no permutation works and the
        // board is regenerated.
        let kinds = KindSet::first(3).unwrap();
        reshuffle(&mut board, &kinds, 3, &mut SimpleRng::new(5)).unwrap();
        assert!(board.tiles().all(|t| kinds.contains(t.kind)));
        assert!(find_matches(&board, &MatchRules::default()).is_empty());
        assert!(has_legal_move(&board, 3, SwapRule::MustMatch));
    }
}
