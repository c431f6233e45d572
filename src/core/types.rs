//! Core data types for the Pure Rust XGBoost implementation.
//!
//! Scalar aliases fix the precision used at each stage of the engine: features,
//! labels and per-row scores are 32-bit, histogram accumulation is 64-bit.

use crate::core::error::{DatasetError, XGBoostError};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::fmt;
use std::str::FromStr;

/// Prediction and gradient value type.
pub type Score = f32;

/// Target value and sample weight type.
pub type Label = f32;

/// Histogram accumulation type.
/// 64-bit float providing numerical stability when summing many gradients.
pub type Hist = f64;

/// Feature index type for identifying features in the dataset.
pub type FeatureIndex = usize;

/// Bin index type for discretized feature values.
pub type BinIndex = u32;

/// Tree node identifier type.
pub type NodeIndex = usize;

/// Iteration number type for boosting iterations.
pub type IterationIndex = usize;

const_assert_eq!(std::mem::size_of::<Score>(), 4);
const_assert_eq!(std::mem::size_of::<Label>(), 4);
const_assert_eq!(std::mem::size_of::<Hist>(), 8);
const_assert_eq!(std::mem::size_of::<BinIndex>(), 4);

/// Per-feature type tag.
///
/// The vocabulary is closed: `q` (quantitative), `i` (indicator),
/// `int` and `float`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    /// Continuous measurement (`q`)
    Quantitative,
    /// Binary 0/1 indicator (`i`)
    Indicator,
    /// Integer valued (`int`)
    Integer,
    /// Floating point valued (`float`)
    Float,
}

impl FeatureType {
    /// Short tag as used in feature maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Quantitative => "q",
            FeatureType::Indicator => "i",
            FeatureType::Integer => "int",
            FeatureType::Float => "float",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = XGBoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "q" => Ok(FeatureType::Quantitative),
            "i" => Ok(FeatureType::Indicator),
            "int" => Ok(FeatureType::Integer),
            "float" => Ok(FeatureType::Float),
            other => Err(DatasetError::InvalidFeatureType {
                value: other.to_string(),
            }
            .into()),
        }
    }
}

/// Feature importance calculation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportanceType {
    /// Number of times a feature is used to split
    Weight,
    /// Total loss reduction of the splits using a feature
    Gain,
    /// Average number of hessian-weighted samples covered by the splits
    Cover,
    /// Total coverage of the splits using a feature
    TotalCover,
    /// Average loss reduction of the splits using a feature
    AverageGain,
}

impl Default for ImportanceType {
    fn default() -> Self {
        ImportanceType::Weight
    }
}

impl fmt::Display for ImportanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportanceType::Weight => write!(f, "weight"),
            ImportanceType::Gain => write!(f, "gain"),
            ImportanceType::Cover => write!(f, "cover"),
            ImportanceType::TotalCover => write!(f, "total_cover"),
            ImportanceType::AverageGain => write!(f, "average_gain"),
        }
    }
}

impl FromStr for ImportanceType {
    type Err = XGBoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(ImportanceType::Weight),
            "gain" | "total_gain" => Ok(ImportanceType::Gain),
            "cover" => Ok(ImportanceType::Cover),
            "total_cover" => Ok(ImportanceType::TotalCover),
            "average_gain" => Ok(ImportanceType::AverageGain),
            other => Err(XGBoostError::invalid_parameter(
                "importance_type",
                other,
                "must be one of weight, gain, cover, total_cover, average_gain",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_type_vocabulary() {
        for tag in ["q", "i", "int", "float"] {
            let parsed: FeatureType = tag.parse().unwrap();
            assert_eq!(parsed.to_string(), tag);
        }
        let err = "a".parse::<FeatureType>().unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_importance_type_parsing() {
        assert_eq!("weight".parse::<ImportanceType>().unwrap(), ImportanceType::Weight);
        assert_eq!("total_gain".parse::<ImportanceType>().unwrap(), ImportanceType::Gain);
        assert_eq!(ImportanceType::default(), ImportanceType::Weight);
        assert!("shap".parse::<ImportanceType>().is_err());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&FeatureType::Indicator).unwrap();
        let back: FeatureType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FeatureType::Indicator);
    }
}
