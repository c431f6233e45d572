//! Dataset management for Pure Rust XGBoost.
//!
//! - `dmatrix`: the [`DMatrix`] data handle and its builder
//! - `feature`: feature name and feature type validation
//! - `loader`: LibSVM and CSV text readers
//! - `binary`: binary cache format
//! - `binning`: quantile cut points used by the tree learner

pub mod binary;
pub mod binning;
pub mod dmatrix;
pub mod feature;
pub mod loader;

pub use binning::{BinMapper, BinnedMatrix};
pub use dmatrix::{DMatrix, DMatrixBuilder, MatrixElement};
pub use feature::{default_feature_names, validate_feature_names, FeatureTypeSpec};
pub use loader::{DataSource, TextFormat};
