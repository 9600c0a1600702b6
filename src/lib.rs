//! Jewel Match (workspace facade crate).
//!
//! Re-exports the workspace crates as `jewel_match::{core,adapter,term,input,engine,types}`
//! so the binary, integration tests and benches share one import path.

pub use jewel_match_adapter as adapter;
pub use jewel_match_core as core;
pub use jewel_match_engine as engine;
pub use jewel_match_input as input;
pub use jewel_match_term as term;
pub use jewel_match_types as types;
