//! Tree learning algorithms for Pure Rust XGBoost.

pub mod serial;

pub use serial::{SerialTreeLearner, SerialTreeLearnerConfig};
