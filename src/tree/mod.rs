//! Tree learning module for Pure Rust XGBoost.
//!
//! This module provides the regression tree structure and the subsystem that
//! grows it: gradient histograms, split finding, row and column sampling and
//! the depth-wise serial learner.

pub mod histogram;
pub mod learner;
pub mod node;
pub mod sampling;
pub mod split;
pub mod tree;

pub use histogram::{FeatureHistogram, GradStats, HistogramBuilder};
pub use learner::{SerialTreeLearner, SerialTreeLearnerConfig};
pub use node::TreeNode;
pub use sampling::{Sampler, SamplingConfig};
pub use split::{SplitFinder, SplitFinderConfig, SplitInfo};
pub use tree::{ChildStats, Tree};
