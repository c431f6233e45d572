//! Regression objectives.

use super::{check_gradient_shapes, row_weight, sigmoid};
use crate::core::constants::MIN_HESSIAN;
use crate::core::error::{Result, XGBoostError};
use crate::core::traits::ObjectiveFunction;
use crate::core::types::*;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut2, Zip};

/// Squared error loss `(margin - label)^2 / 2` with identity output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl ObjectiveFunction for SquaredError {
    fn compute_gradients(
        &self,
        margins: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
        gradients: &mut ArrayViewMut2<'_, Score>,
        hessians: &mut ArrayViewMut2<'_, Score>,
    ) -> Result<()> {
        check_gradient_shapes(self.name(), margins, labels, weights, gradients, hessians)?;
        for i in 0..labels.len() {
            let w = row_weight(weights, i);
            gradients[[i, 0]] = (margins[[i, 0]] - labels[i]) * w;
            hessians[[i, 0]] = w;
        }
        Ok(())
    }

    fn transform_predictions(&self, margins: Array2<Score>) -> Array2<Score> {
        margins
    }

    fn name(&self) -> &'static str {
        "reg:squarederror"
    }

    fn validate_labels(&self, labels: &ArrayView1<'_, Label>) -> Result<()> {
        if let Some(bad) = labels.iter().find(|l| !l.is_finite()) {
            return Err(XGBoostError::training(format!(
                "{}: label must be finite, got {}",
                self.name(),
                bad
            )));
        }
        Ok(())
    }

    fn default_metric(&self) -> &'static str {
        "rmse"
    }
}

/// Logistic regression on targets in `[0, 1]`, probability output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticRegression;

impl LogisticRegression {
    pub(crate) fn logistic_gradients(
        name: &str,
        margins: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
        gradients: &mut ArrayViewMut2<'_, Score>,
        hessians: &mut ArrayViewMut2<'_, Score>,
    ) -> Result<()> {
        check_gradient_shapes(name, margins, labels, weights, gradients, hessians)?;
        for i in 0..labels.len() {
            let w = row_weight(weights, i);
            let p = sigmoid(margins[[i, 0]]);
            gradients[[i, 0]] = (p - labels[i]) * w;
            hessians[[i, 0]] = (p * (1.0 - p)).max(MIN_HESSIAN) * w;
        }
        Ok(())
    }

    pub(crate) fn logit(name: &str, base_score: f64) -> Result<f64> {
        if base_score <= 0.0 || base_score >= 1.0 {
            return Err(XGBoostError::invalid_parameter(
                "base_score",
                base_score.to_string(),
                format!("{} requires base_score in (0, 1)", name),
            ));
        }
        Ok((base_score / (1.0 - base_score)).ln())
    }
}

impl ObjectiveFunction for LogisticRegression {
    fn compute_gradients(
        &self,
        margins: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
        gradients: &mut ArrayViewMut2<'_, Score>,
        hessians: &mut ArrayViewMut2<'_, Score>,
    ) -> Result<()> {
        Self::logistic_gradients(self.name(), margins, labels, weights, gradients, hessians)
    }

    fn transform_predictions(&self, mut margins: Array2<Score>) -> Array2<Score> {
        Zip::from(&mut margins).for_each(|m| *m = sigmoid(*m));
        margins
    }

    fn prob_to_margin(&self, base_score: f64) -> Result<f64> {
        Self::logit(self.name(), base_score)
    }

    fn name(&self) -> &'static str {
        "reg:logistic"
    }

    fn validate_labels(&self, labels: &ArrayView1<'_, Label>) -> Result<()> {
        if let Some(bad) = labels.iter().find(|&&l| !(0.0..=1.0).contains(&l)) {
            return Err(XGBoostError::training(format!(
                "{}: label must be in [0,1] for logistic regression, got {}",
                self.name(),
                bad
            )));
        }
        Ok(())
    }

    fn default_metric(&self) -> &'static str {
        "rmse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_squared_error_gradients() {
        let margins = array![[0.5f32], [2.0]];
        let labels = Array1::from(vec![1.0f32, 1.0]);
        let weights = Array1::from(vec![1.0f32, 2.0]);
        let mut g = Array2::zeros((2, 1));
        let mut h = Array2::zeros((2, 1));

        SquaredError
            .compute_gradients(
                &margins.view(),
                &labels.view(),
                Some(&weights.view()),
                &mut g.view_mut(),
                &mut h.view_mut(),
            )
            .unwrap();

        assert_eq!(g, array![[-0.5f32], [2.0]]);
        assert_eq!(h, array![[1.0f32], [2.0]]);
        assert_eq!(SquaredError.prob_to_margin(0.5).unwrap(), 0.5);
    }

    #[test]
    fn test_gradient_shape_mismatch() {
        let margins = array![[0.5f32], [2.0]];
        let labels = Array1::from(vec![1.0f32]);
        let mut g = Array2::zeros((2, 1));
        let mut h = Array2::zeros((2, 1));
        let err = SquaredError
            .compute_gradients(&margins.view(), &labels.view(), None, &mut g.view_mut(), &mut h.view_mut())
            .unwrap_err();
        assert!(err.is_engine_error());
    }

    #[test]
    fn test_logistic_regression() {
        let objective = LogisticRegression;
        let margins = array![[0.0f32]];
        let labels = Array1::from(vec![1.0f32]);
        let mut g = Array2::zeros((1, 1));
        let mut h = Array2::zeros((1, 1));
        objective
            .compute_gradients(&margins.view(), &labels.view(), None, &mut g.view_mut(), &mut h.view_mut())
            .unwrap();
        assert_relative_eq!(g[[0, 0]], -0.5);
        assert_relative_eq!(h[[0, 0]], 0.25);

        assert_relative_eq!(objective.prob_to_margin(0.5).unwrap(), 0.0);
        assert!(objective.prob_to_margin(1.0).is_err());
        assert_eq!(objective.transform_predictions(array![[0.0f32]]), array![[0.5f32]]);
        assert!(objective.validate_labels(&Array1::from(vec![1.5f32]).view()).is_err());
    }
}
