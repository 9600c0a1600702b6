//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the jewel grid and the match-resolution rules. It has
//! **zero dependencies** on UI, networking, or I/O:
//!
//! - **Deterministic**: randomness is injected through [`RandomSource`], so a
//!   seed reproduces a whole game
//! - **Testable**: every rule is a plain function over a [`Board`]
//! - **Portable**: terminal, headless and remote frontends share it unchanged
//!
//! # Module Structure
//!
//! - [`board`]: `rows x cols` grid with swap, remove, collapse and refill
//! - [`matcher`]: scans for runs of equal kinds
//! - [`validator`]: adjacency and must-match checks on a scratch copy
//! - [`cascade`]: remove/collapse/refill loop with an iteration cap
//! - [`scoring`]: points per match and per cascade step
//! - [`generator`]: stable opening boards and reshuffles
//! - [`game_state`]: one play session tying it all together
//!
//! # Example
//!
//! ```
//! use jewel_match_core::{GameConfig, GameState};
//!
//! let mut game = GameState::new(GameConfig::default().with_seed(12345)).unwrap();
//!
//! // Generated boards always offer a scoring swap.
//! let hint = game.hint().unwrap();
//! let outcome = game.try_swap(hint.a, hint.b).unwrap();
//!
//! assert!(outcome.report.cleared >= 3);
//! assert_eq!(game.score(), outcome.report.score);
//! ```

pub mod board;
pub mod cascade;
pub mod config;
pub mod error;
pub mod game_state;
pub mod generator;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod tile;
pub mod validator;

pub use jewel_match_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Slot};
pub use cascade::{CascadeEngine, CascadeReport, CascadeState, CascadeStep};
pub use config::{GameConfig, KindSet};
pub use error::GameError;
pub use game_state::{GameState, MoveOutcome};
pub use generator::{generate, reshuffle};
pub use matcher::{find_matches, has_match_at, Match, MatchRules, MatchSet, MatchShape};
pub use rng::{RandomSource, ScriptedRng, SimpleRng};
pub use scoring::{score_match, score_step, ScoreFormula, ScoreRules};
pub use snapshot::{BoardSnapshot, CascadeSummary, GameSnapshot};
pub use tile::Tile;
pub use validator::{check_swap, has_legal_move, is_legal_swap, legal_moves, Move, SwapRule};
