//! Cascade engine - resolves a board until it is stable
//!
//! One resolution runs the loop
//! `Scanning -> Resolving -> Collapsing -> Refilling -> Scanning ... -> Stable`.
//! Each pass through `Resolving` is one step of the report. A resolution that
//! would start step `cap + 1` fails with [`GameError::CascadeOverflow`] and the
//! board is put back exactly as it was on entry.

use crate::board::Board;
use crate::config::{GameConfig, KindSet};
use crate::error::GameError;
use crate::matcher::{find_matches, MatchRules, MatchSet};
use crate::rng::RandomSource;
use crate::scoring::{score_step, ScoreRules};
use crate::types::{Pos, DEFAULT_CASCADE_CAP};

/// Where the resolution loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeState {
    Scanning,
    Resolving,
    Collapsing,
    Refilling,
    Stable,
}

/// One remove/collapse/refill iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeStep {
    /// 1-based.
    pub iteration: u32,
    pub matches: MatchSet,
    pub cleared: u32,
    pub score: u32,
    /// Positions refilled at the end of the step, in fill order.
    pub refilled: Vec<Pos>,
}

/// Result of one resolution, earliest step first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CascadeReport {
    pub score: u32,
    pub cleared: u32,
    pub steps: Vec<CascadeStep>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of chained steps.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeEngine {
    pub match_rules: MatchRules,
    pub score_rules: ScoreRules,
    pub cap: u32,
}

impl Default for CascadeEngine {
    fn default() -> Self {
        Self::new(MatchRules::default(), ScoreRules::default(), DEFAULT_CASCADE_CAP)
    }
}

impl CascadeEngine {
    pub fn new(match_rules: MatchRules, score_rules: ScoreRules, cap: u32) -> Self {
        Self {
            match_rules,
            score_rules,
            cap,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.match_rules, config.score_rules, config.cascade_cap)
    }

    /// Resolve `board` until no match remains.
    ///
    /// A board without matches is returned untouched with an empty report.
    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        board: &mut Board,
        kinds: &KindSet,
        rng: &mut R,
    ) -> Result<CascadeReport, GameError> {
        let mut report = CascadeReport::default();
        let mut entry: Option<Board> = None;
        let mut pending = MatchSet::default();
        let mut step: Option<CascadeStep> = None;
        let mut state = CascadeState::Scanning;

        loop {
            state = match state {
                CascadeState::Scanning => {
                    pending = find_matches(board, &self.match_rules);
                    if pending.is_empty() {
                        CascadeState::Stable
                    } else if report.steps.len() as u32 >= self.cap {
                        if let Some(original) = entry.take() {
                            *board = original;
                        }
                        return Err(GameError::CascadeOverflow { cap: self.cap });
                    } else {
                        CascadeState::Resolving
                    }
                }
                CascadeState::Resolving => {
                    if entry.is_none() {
                        entry = Some(board.clone());
                    }
                    let iteration = report.steps.len() as u32 + 1;
                    let matches = std::mem::take(&mut pending);
                    let cleared = board.remove_at(matches.positions());
                    let score = score_step(&self.score_rules, &matches, iteration);
                    step = Some(CascadeStep {
                        iteration,
                        matches,
                        cleared,
                        score,
                        refilled: Vec::new(),
                    });
                    CascadeState::Collapsing
                }
                CascadeState::Collapsing => {
                    board.collapse();
                    CascadeState::Refilling
                }
                CascadeState::Refilling => {
                    let refilled = board.refill(kinds, rng);
                    if let Some(mut done) = step.take() {
                        done.refilled = refilled;
                        report.score = report.score.saturating_add(done.score);
                        report.cleared = report.cleared.saturating_add(done.cleared);
                        report.steps.push(done);
                    }
                    CascadeState::Scanning
                }
                CascadeState::Stable => return Ok(report),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::types::JewelKind;

    #[test]
    fn test_stable_board_is_untouched() {
        let mut board = Board::parse(&["RGB", "YPW", "ORG"]).unwrap();
        let before = board.clone();
        let mut rng = ScriptedRng::constant(0);
        let report = CascadeEngine::default()
            .resolve(&mut board, &KindSet::all(), &mut rng)
            .unwrap();
        assert_eq!(report, CascadeReport::default());
        assert_eq!(board, before);
        assert_eq!(rng.drawn(), 0);
    }

    #[test]
    fn test_single_run_clears_and_scores() {
        let mut board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        // Refill W, B, P across the top row: no new match.
        let mut rng = ScriptedRng::new(vec![6, 4, 5]);
        let report = CascadeEngine::default()
            .resolve(&mut board, &KindSet::all(), &mut rng)
            .unwrap();
        assert_eq!(report.cleared, 3);
        assert_eq!(report.score, 9);
        assert_eq!(report.depth(), 1);
        let step = &report.steps[0];
        assert_eq!(step.iteration, 1);
        assert_eq!(
            step.refilled,
            vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2)]
        );
        assert_eq!(board.to_string(), "WBP\nOYG\nBPW");
    }

    #[test]
    fn test_chain_reaction_produces_two_steps() {
        let mut board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        // First refill drops GGG into the cleared row; the second settles.
        let mut rng = ScriptedRng::new(vec![3, 3, 3, 6, 4, 5]);
        let report = CascadeEngine::default()
            .resolve(&mut board, &KindSet::all(), &mut rng)
            .unwrap();
        assert_eq!(report.depth(), 2);
        assert_eq!(report.steps[0].matches.iter().next().unwrap().kind(), JewelKind::Red);
        assert_eq!(report.steps[1].matches.iter().next().unwrap().kind(), JewelKind::Green);
        assert_eq!(report.steps[1].iteration, 2);
        assert_eq!(report.cleared, 6);
        assert_eq!(report.score, 18);
        assert_eq!(board.to_string(), "WBP\nOYG\nBPW");
    }

    #[test]
    fn test_cascade_multiplier_weights_later_steps() {
        let mut board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        let mut rng = ScriptedRng::new(vec![3, 3, 3, 6, 4, 5]);
        let engine = CascadeEngine::new(
            MatchRules::default(),
            ScoreRules {
                cascade_multiplier: true,
                ..ScoreRules::default()
            },
            DEFAULT_CASCADE_CAP,
        );
        let report = engine.resolve(&mut board, &KindSet::all(), &mut rng).unwrap();
        assert_eq!(report.score, 9 + 18);
    }

    #[test]
    fn test_overflow_rolls_back() {
        let mut board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        let before = board.clone();
        // Always refill red: the top row re-matches forever.
        let mut rng = ScriptedRng::constant(0);
        let engine = CascadeEngine::new(MatchRules::default(), ScoreRules::default(), 4);
        let err = engine
            .resolve(&mut board, &KindSet::all(), &mut rng)
            .unwrap_err();
        assert_eq!(err, GameError::CascadeOverflow { cap: 4 });
        assert_eq!(board, before);
    }

    #[test]
    fn test_default_cap_overflow_rolls_back() {
        let mut board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        let before = board.clone();
        let mut rng = ScriptedRng::constant(0);
        let err = CascadeEngine::default()
            .resolve(&mut board, &KindSet::all(), &mut rng)
            .unwrap_err();
        assert_eq!(err, GameError::CascadeOverflow { cap: 64 });
        assert_eq!(DEFAULT_CASCADE_CAP, 64);
        assert_eq!(board, before);
    }

    #[test]
    fn test_cap_is_inclusive() {
        // Exactly `cap` steps succeed.
        let mut board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        let mut rng = ScriptedRng::new(vec![6, 4, 5]);
        let engine = CascadeEngine::new(MatchRules::default(), ScoreRules::default(), 1);
        assert!(engine.resolve(&mut board, &KindSet::all(), &mut rng).is_ok());
    }
}
