//! Split finding module for Pure Rust XGBoost.

pub mod finder;

pub use finder::{threshold_l1, SplitFinder, SplitFinderConfig, SplitInfo};
