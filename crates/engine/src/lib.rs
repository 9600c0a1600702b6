//! Move planning on top of the core rules.

pub mod plan;

pub use jewel_match_core as core;
pub use jewel_match_types as types;

pub use plan::{apply_best_swap, plan_best_swap, PlanError, PlannedSwap};
