//! # Pure Rust XGBoost
//!
//! A gradient boosted decision tree library in the XGBoost mould: a
//! [`DMatrix`] data handle with labels, weights, base margins and feature
//! metadata, a [`train`] driver with watchlists and callbacks, a [`Booster`]
//! model handle whose individual trees can be re-weighted, and a [`cv`]
//! cross-validation driver.
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::array;
//! use xgboost_rust::{train, DMatrix, Params};
//!
//! # fn main() -> xgboost_rust::Result<()> {
//! let dtrain = DMatrix::builder()
//!     .data(array![[1.0f32, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 1.0]])
//!     .label(vec![0.0f32, 0.0, 1.0, 1.0])
//!     .build()?;
//!
//! let params = Params::from_pairs([
//!     ("max_depth", "2"),
//!     ("eta", "1"),
//!     ("objective", "binary:logistic"),
//! ])?;
//! let mut booster = train(&params, &dtrain, 2, &[(&dtrain, "train")])?;
//!
//! // Halve the contribution of the second tree.
//! booster.set_tree_weight(1, 0.5)?;
//! let predictions = booster.predict(&dtrain)?;
//! assert_eq!(predictions.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: error taxonomy, scalar types, constants, engine traits, logging
//! - [`config`]: the booster parameter set
//! - [`dataset`]: the data handle, text and binary loaders, quantile binning
//! - [`tree`]: regression trees and the depth-wise histogram learner
//! - [`objective`] and [`metrics`]: losses and watchlist metrics
//! - [`boosting`]: the weighted tree ensemble and the [`Booster`] handle
//! - [`prediction`]: ensemble traversal and feature importance
//! - [`io`]: model persistence
//! - [`training`]: training loop, callbacks and cross-validation

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

pub mod core;

pub mod config;

pub mod dataset;

pub mod tree;

pub mod objective;

pub mod metrics;

pub mod boosting;

pub mod prediction;

pub mod io;

pub mod training;

// Re-export core functionality for convenience
pub use core::{
    error::{DatasetError, Result, XGBoostError},
    logging::{init_logging, LogConfig, Verbosity},
    types::*,
};

pub use config::{ObjectiveKind, Params, ParamsBuilder};

pub use dataset::{DMatrix, DMatrixBuilder, FeatureTypeSpec, MatrixElement};

pub use boosting::{Booster, EvaluationEntry};

pub use prediction::PredictOptions;

pub use io::ModelFormat;

pub use training::{
    cv, cv_with, train, train_with, CallbackEnv, CvOptions, CvResult, EarlyStopping,
    EvaluationHistory, EvaluationMonitor, RecordEvaluation, TrainOptions, TrainingCallback,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the default logger.
///
/// Safe to call more than once; only the first call installs anything.
///
/// ```rust
/// fn main() -> xgboost_rust::Result<()> {
///     xgboost_rust::init()?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    core::initialize_core()
}
