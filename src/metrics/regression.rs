//! Regression metrics.

use super::weighted_mean;
use crate::core::error::Result;
use crate::core::traits::Metric;
use crate::core::types::*;
use ndarray::{ArrayView1, ArrayView2};

/// Root mean squared error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl Metric for Rmse {
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64> {
        self.validate_inputs(predictions, labels, weights)?;
        let mse = weighted_mean(labels.len(), weights, |i| {
            let diff = predictions[[i, 0]] as f64 - labels[i] as f64;
            diff * diff
        });
        Ok(mse.sqrt())
    }

    fn name(&self) -> &str {
        "rmse"
    }
}

/// Mean absolute error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl Metric for Mae {
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64> {
        self.validate_inputs(predictions, labels, weights)?;
        Ok(weighted_mean(labels.len(), weights, |i| {
            (predictions[[i, 0]] as f64 - labels[i] as f64).abs()
        }))
    }

    fn name(&self) -> &str {
        "mae"
    }
}
