//! Prediction pipeline module for Pure Rust XGBoost.
//!
//! This module provides:
//! - Weighted ensemble traversal producing margins and leaf indices
//! - Feature importance from split statistics

pub mod feature_importance;
pub mod predictor;

pub use feature_importance::FeatureImportanceCalculator;
pub use predictor::{PredictOptions, Predictor};
