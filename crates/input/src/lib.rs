//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] and keeps the
//! board cursor and selection, which never live in the core.

pub mod cursor;
pub mod map;

pub use jewel_match_types as types;

pub use cursor::{CursorState, SwapRequest};
pub use map::{handle_key_event, should_quit};
