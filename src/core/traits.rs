//! Core trait definitions for Pure Rust XGBoost.
//!
//! The engine is pluggable at two seams: the loss being optimised
//! ([`ObjectiveFunction`]) and the scores reported on watchlists ([`Metric`]).
//! Margins and predictions travel as `(num_rows, num_groups)` matrices, where
//! `num_groups` is 1 except for multi-class objectives.

use crate::core::error::Result;
use crate::core::types::*;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut2};

use std::fmt::Debug;

/// Trait for objective functions that compute gradients and hessians.
pub trait ObjectiveFunction: Send + Sync + Debug {
    /// Compute first and second order gradients of the loss at `margins`.
    ///
    /// All matrices share the shape `(num_rows, num_output_groups())`.
    fn compute_gradients(
        &self,
        margins: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
        gradients: &mut ArrayViewMut2<'_, Score>,
        hessians: &mut ArrayViewMut2<'_, Score>,
    ) -> Result<()>;

    /// Transform raw margins into the values returned by `predict`.
    fn transform_predictions(&self, margins: Array2<Score>) -> Array2<Score>;

    /// Transform raw margins into the values metrics are computed on.
    fn eval_transform(&self, margins: Array2<Score>) -> Array2<Score> {
        self.transform_predictions(margins)
    }

    /// Convert a global bias given in output space into margin space.
    fn prob_to_margin(&self, base_score: f64) -> Result<f64> {
        Ok(base_score)
    }

    /// Number of trees grown per boosting round.
    fn num_output_groups(&self) -> usize {
        1
    }

    /// Get the objective function name.
    fn name(&self) -> &'static str;

    /// Validate labels for this objective function.
    fn validate_labels(&self, labels: &ArrayView1<'_, Label>) -> Result<()>;

    /// Name of the metric evaluated when none is configured.
    fn default_metric(&self) -> &'static str;
}

/// Trait for evaluation metrics reported on watchlist datasets.
pub trait Metric: Send + Sync + Debug {
    /// Evaluate transformed predictions against labels.
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64>;

    /// Name used in evaluation logs and result keys.
    fn name(&self) -> &str;

    /// Whether larger values mean a better model.
    fn higher_is_better(&self) -> bool {
        false
    }

    /// Validate input dimensions.
    fn validate_inputs(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<()> {
        if predictions.nrows() != labels.len() {
            return Err(crate::core::error::XGBoostError::engine(format!(
                "metric {}: {} predictions for {} labels",
                self.name(),
                predictions.nrows(),
                labels.len()
            )));
        }
        if let Some(w) = weights {
            if w.len() != labels.len() {
                return Err(crate::core::error::XGBoostError::engine(format!(
                    "metric {}: {} weights for {} labels",
                    self.name(),
                    w.len(),
                    labels.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[derive(Debug)]
    struct MockMetric;

    impl Metric for MockMetric {
        fn evaluate(
            &self,
            predictions: &ArrayView2<'_, Score>,
            labels: &ArrayView1<'_, Label>,
            weights: Option<&ArrayView1<'_, Label>>,
        ) -> Result<f64> {
            self.validate_inputs(predictions, labels, weights)?;
            Ok(predictions.sum() as f64)
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[test]
    fn test_metric_input_validation() {
        let metric = MockMetric;
        let preds = array![[0.5f32], [0.25]];
        let labels = Array1::from(vec![1.0f32, 0.0]);
        assert_eq!(metric.evaluate(&preds.view(), &labels.view(), None).unwrap(), 0.75);

        let short = Array1::from(vec![1.0f32]);
        assert!(metric.evaluate(&preds.view(), &short.view(), None).is_err());
        assert!(!metric.higher_is_better());
    }
}
