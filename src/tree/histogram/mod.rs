//! Histogram construction module for Pure Rust XGBoost.

pub mod builder;

pub use builder::{FeatureHistogram, GradStats, HistogramBuilder};
