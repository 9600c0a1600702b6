use crate::core::{GameError, GameState, Move, MoveOutcome};

/// Best immediate swap found by [`plan_best_swap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSwap {
    pub mv: Move,
    /// Points the swap earns including its cascade.
    pub score: u32,
    pub cleared: u32,
    /// Number of cascade steps.
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    NoMove,
    Rejected(GameError),
}

impl PlanError {
    pub fn message(&self) -> String {
        match self {
            PlanError::NoMove => "no swap creates a match".to_string(),
            PlanError::Rejected(e) => e.to_string(),
        }
    }
}

/// Simulate every match-creating swap and pick the highest immediate score.
///
/// Each candidate runs on a clone of the session, RNG included, so the
/// refills seen here are exactly the ones a real swap would get. Ties keep
/// the earliest candidate (row-major, right neighbour before down).
/// Candidates that overflow the cascade cap are skipped.
pub fn plan_best_swap(state: &GameState) -> Option<PlannedSwap> {
    let mut best: Option<PlannedSwap> = None;

    for mv in candidates(state) {
        let mut sim = state.clone();
        let Ok(outcome) = sim.try_swap(mv.a, mv.b) else {
            continue;
        };
        let planned = PlannedSwap {
            mv,
            score: outcome.report.score,
            cleared: outcome.report.cleared,
            depth: outcome.report.depth() as u32,
        };
        match best {
            Some(b) if b.score >= planned.score => {}
            _ => best = Some(planned),
        }
    }

    best
}

/// Plan and play the best swap.
pub fn apply_best_swap(state: &mut GameState) -> Result<MoveOutcome, PlanError> {
    let planned = plan_best_swap(state).ok_or(PlanError::NoMove)?;
    state
        .try_swap(planned.mv.a, planned.mv.b)
        .map_err(PlanError::Rejected)
}

fn candidates(state: &GameState) -> Vec<Move> {
    let moves = state.legal_moves();
    if state.config().swap_rule.requires_match() {
        return moves;
    }
    // Without the must-match rule every pair is legal; only scoring ones are
    // worth simulating.
    moves
        .into_iter()
        .filter(|mv| {
            crate::core::is_legal_swap(
                state.board(),
                mv.a,
                mv.b,
                state.config().match_rules.min_run,
                crate::core::SwapRule::MustMatch,
            )
        })
        .collect()
}
