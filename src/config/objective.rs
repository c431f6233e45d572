//! Learning task selection.
//!
//! Objectives are named the way the engine's parameter schema names them,
//! `<family>:<variant>`.

use crate::core::error::{Result, XGBoostError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Objective (loss family plus output transform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveKind {
    /// Squared error regression, identity output
    #[serde(rename = "reg:squarederror", alias = "reg:linear")]
    SquaredError,
    /// Logistic regression on targets in `[0, 1]`, probability output
    #[serde(rename = "reg:logistic")]
    RegLogistic,
    /// Binary classification, probability output
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
    /// Binary classification, raw margin output
    #[serde(rename = "binary:logitraw")]
    BinaryLogitRaw,
    /// Multi-class classification, class index output
    #[serde(rename = "multi:softmax")]
    MultiSoftmax,
    /// Multi-class classification, per-class probability output
    #[serde(rename = "multi:softprob")]
    MultiSoftprob,
}

impl Default for ObjectiveKind {
    fn default() -> Self {
        ObjectiveKind::SquaredError
    }
}

impl ObjectiveKind {
    /// Canonical parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveKind::SquaredError => "reg:squarederror",
            ObjectiveKind::RegLogistic => "reg:logistic",
            ObjectiveKind::BinaryLogistic => "binary:logistic",
            ObjectiveKind::BinaryLogitRaw => "binary:logitraw",
            ObjectiveKind::MultiSoftmax => "multi:softmax",
            ObjectiveKind::MultiSoftprob => "multi:softprob",
        }
    }

    /// Whether the objective grows one tree per class.
    pub fn is_multiclass(&self) -> bool {
        matches!(self, ObjectiveKind::MultiSoftmax | ObjectiveKind::MultiSoftprob)
    }

    /// Whether labels must be 0 or 1.
    pub fn is_binary(&self) -> bool {
        matches!(self, ObjectiveKind::BinaryLogistic | ObjectiveKind::BinaryLogitRaw)
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectiveKind {
    type Err = XGBoostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "reg:squarederror" | "reg:linear" => Ok(ObjectiveKind::SquaredError),
            "reg:logistic" => Ok(ObjectiveKind::RegLogistic),
            "binary:logistic" => Ok(ObjectiveKind::BinaryLogistic),
            "binary:logitraw" => Ok(ObjectiveKind::BinaryLogitRaw),
            "multi:softmax" => Ok(ObjectiveKind::MultiSoftmax),
            "multi:softprob" => Ok(ObjectiveKind::MultiSoftprob),
            other => Err(XGBoostError::invalid_parameter(
                "objective",
                other,
                "unknown objective function",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_parsing() {
        assert_eq!(
            "binary:logistic".parse::<ObjectiveKind>().unwrap(),
            ObjectiveKind::BinaryLogistic
        );
        assert_eq!(
            "reg:linear".parse::<ObjectiveKind>().unwrap(),
            ObjectiveKind::SquaredError
        );
        let err = "rank:unknown".parse::<ObjectiveKind>().unwrap_err();
        assert!(err.is_engine_error());
    }

    #[test]
    fn test_objective_serde_names() {
        let json = serde_json::to_string(&ObjectiveKind::MultiSoftprob).unwrap();
        assert_eq!(json, "\"multi:softprob\"");
        let back: ObjectiveKind = serde_json::from_str("\"reg:linear\"").unwrap();
        assert_eq!(back, ObjectiveKind::SquaredError);
        assert!(ObjectiveKind::MultiSoftmax.is_multiclass());
        assert!(!ObjectiveKind::BinaryLogistic.is_multiclass());
    }
}
