use crate::types::Pos;

/// Errors surfaced by board operations and move resolution.
///
/// None of these are retried internally; the caller decides what to try next.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid move {a} <-> {b}: cells must be in bounds and edge-adjacent")]
    InvalidMove { a: Pos, b: Pos },

    #[error("illegal swap {a} <-> {b}: swap does not create a match")]
    IllegalSwap { a: Pos, b: Pos },

    #[error("cascade did not stabilise within {cap} iterations")]
    CascadeOverflow { cap: u32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid board layout: {0}")]
    InvalidLayout(String),
}

impl GameError {
    /// True for errors that leave the board exactly as it was and can be
    /// answered with a different move.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::InvalidMove { .. } | GameError::IllegalSwap { .. }
        )
    }
}
