//! Objective functions for Pure Rust XGBoost.
//!
//! An objective supplies first and second order gradients of its loss at the
//! current margins and maps margins into the output space returned by
//! `predict`. Use [`create_objective`] to build the one a [`Params`] selects.

pub mod classification;
pub mod regression;

pub use classification::{BinaryLogistic, Softmax};
pub use regression::{LogisticRegression, SquaredError};

use crate::config::{ObjectiveKind, Params};
use crate::core::error::{Result, XGBoostError};
use crate::core::traits::ObjectiveFunction;
use crate::core::types::*;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut2};

/// Build the objective configured by `params`.
pub fn create_objective(params: &Params) -> Result<Box<dyn ObjectiveFunction>> {
    let kind = params.objective_kind();
    let objective: Box<dyn ObjectiveFunction> = match kind {
        ObjectiveKind::SquaredError => Box::new(SquaredError),
        ObjectiveKind::RegLogistic => Box::new(LogisticRegression),
        ObjectiveKind::BinaryLogistic => Box::new(BinaryLogistic::new(false)),
        ObjectiveKind::BinaryLogitRaw => Box::new(BinaryLogistic::new(true)),
        ObjectiveKind::MultiSoftmax | ObjectiveKind::MultiSoftprob => {
            if params.num_class < 2 {
                return Err(XGBoostError::invalid_parameter(
                    "num_class",
                    params.num_class.to_string(),
                    format!("{} requires num_class >= 2", kind),
                ));
            }
            Box::new(Softmax::new(
                params.num_class,
                kind == ObjectiveKind::MultiSoftprob,
            ))
        }
    };
    log::debug!("Created objective {}", objective.name());
    Ok(objective)
}

/// Logistic function.
pub(crate) fn sigmoid(x: Score) -> Score {
    1.0 / (1.0 + (-x).exp())
}

/// Check that margins, labels, weights and outputs agree on shape.
pub(crate) fn check_gradient_shapes(
    name: &str,
    margins: &ArrayView2<'_, Score>,
    labels: &ArrayView1<'_, Label>,
    weights: Option<&ArrayView1<'_, Label>>,
    gradients: &ArrayViewMut2<'_, Score>,
    hessians: &ArrayViewMut2<'_, Score>,
) -> Result<()> {
    if margins.nrows() != labels.len() {
        return Err(XGBoostError::training(format!(
            "{}: {} margins for {} labels",
            name,
            margins.nrows(),
            labels.len()
        )));
    }
    if let Some(w) = weights {
        if w.len() != labels.len() {
            return Err(XGBoostError::training(format!(
                "{}: {} weights for {} labels",
                name,
                w.len(),
                labels.len()
            )));
        }
    }
    if gradients.dim() != margins.dim() || hessians.dim() != margins.dim() {
        return Err(XGBoostError::training(format!(
            "{}: gradient buffers {:?}/{:?} do not match margins {:?}",
            name,
            gradients.dim(),
            hessians.dim(),
            margins.dim()
        )));
    }
    Ok(())
}

/// Weight of row `i`, 1 when unweighted.
pub(crate) fn row_weight(weights: Option<&ArrayView1<'_, Label>>, i: usize) -> Score {
    weights.map_or(1.0, |w| w[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_objective() {
        let params = Params::from_pairs([("objective", "binary:logistic")]).unwrap();
        let objective = create_objective(&params).unwrap();
        assert_eq!(objective.name(), "binary:logistic");
        assert_eq!(objective.default_metric(), "error");

        let params = Params::from_pairs([("num_class", "3")]).unwrap();
        let objective = create_objective(&params).unwrap();
        assert_eq!(objective.name(), "multi:softmax");
        assert_eq!(objective.num_output_groups(), 3);

        let objective = create_objective(&Params::default()).unwrap();
        assert_eq!(objective.name(), "reg:squarederror");
        assert_eq!(objective.default_metric(), "rmse");
    }

    #[test]
    fn test_multiclass_requires_classes() {
        let mut params = Params::default();
        params.objective = Some(ObjectiveKind::MultiSoftprob);
        let err = create_objective(&params).unwrap_err();
        assert!(err.is_engine_error());
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
    }
}
