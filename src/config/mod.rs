//! Parameter management for Pure Rust XGBoost.
//!
//! [`Params`] holds the tree booster parameters, [`ObjectiveKind`] names the
//! learning task.

pub mod core;
pub mod objective;

pub use core::{Params, ParamsBuilder};
pub use objective::ObjectiveKind;
