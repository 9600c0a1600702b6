//! Scoring module - points for matches and cascade steps
//!
//! A match of `n` tiles scores `n * n` by default, or `n * p` with a flat
//! per-tile rate. When `cascade_multiplier` is on, the k-th step of a cascade
//! (1-based) has its points multiplied by k.
//! All arithmetic saturates.

use crate::matcher::{Match, MatchSet};

/// How a single match is valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreFormula {
    /// n tiles score n².
    SquaredLength,
    /// n tiles score n * points.
    PerTile(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreRules {
    pub formula: ScoreFormula,
    pub cascade_multiplier: bool,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            formula: ScoreFormula::SquaredLength,
            cascade_multiplier: false,
        }
    }
}

/// Points for one match of `len` tiles.
pub fn score_length(rules: &ScoreRules, len: usize) -> u32 {
    let n = u32::try_from(len).unwrap_or(u32::MAX);
    match rules.formula {
        ScoreFormula::SquaredLength => n.saturating_mul(n),
        ScoreFormula::PerTile(points) => n.saturating_mul(points),
    }
}

/// Points for one match.
pub fn score_match(rules: &ScoreRules, m: &Match) -> u32 {
    score_length(rules, m.len())
}

/// Points for a whole cascade step. `iteration` is 1-based.
pub fn score_step(rules: &ScoreRules, matches: &MatchSet, iteration: u32) -> u32 {
    let base = matches
        .iter()
        .fold(0u32, |acc, m| acc.saturating_add(score_match(rules, m)));
    if rules.cascade_multiplier {
        base.saturating_mul(iteration.max(1))
    } else {
        base
    }
}
