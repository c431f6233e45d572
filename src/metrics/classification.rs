//! Classification metrics.
//!
//! Binary metrics read the first prediction column as the probability of the
//! positive class (the raw margin for `binary:logitraw`). Multi-class metrics
//! read one probability column per class.

use super::weighted_mean;
use crate::core::constants::PROB_EPSILON;
use crate::core::error::{Result, XGBoostError};
use crate::core::traits::Metric;
use crate::core::types::*;
use crate::objective::classification::argmax;
use ndarray::{ArrayView1, ArrayView2};

/// Binary misclassification rate.
#[derive(Debug, Clone)]
pub struct BinaryError {
    threshold: Score,
    name: String,
}

impl Default for BinaryError {
    fn default() -> Self {
        BinaryError {
            threshold: 0.5,
            name: "error".to_string(),
        }
    }
}

impl BinaryError {
    /// Error rate where predictions above `threshold` count as positive.
    pub fn with_threshold(threshold: Score) -> Self {
        BinaryError {
            threshold,
            name: format!("error@{}", threshold),
        }
    }
}

impl Metric for BinaryError {
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64> {
        self.validate_inputs(predictions, labels, weights)?;
        Ok(weighted_mean(labels.len(), weights, |i| {
            let predicted = predictions[[i, 0]] > self.threshold;
            let actual = labels[i] > 0.5;
            if predicted != actual {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Binary negative log likelihood.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLoss;

impl Metric for LogLoss {
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64> {
        self.validate_inputs(predictions, labels, weights)?;
        Ok(weighted_mean(labels.len(), weights, |i| {
            let p = (predictions[[i, 0]] as f64).clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
            let y = labels[i] as f64;
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        }))
    }

    fn name(&self) -> &str {
        "logloss"
    }
}

/// Area under the ROC curve; tied predictions count half.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auc;

impl Metric for Auc {
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64> {
        self.validate_inputs(predictions, labels, weights)?;
        let n = labels.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| predictions[[b, 0]].total_cmp(&predictions[[a, 0]]));

        let mut area = 0.0;
        let mut positives = 0.0;
        let mut negatives = 0.0;
        let mut i = 0;
        while i < n {
            let score = predictions[[order[i], 0]];
            let mut group_pos = 0.0;
            let mut group_neg = 0.0;
            while i < n && predictions[[order[i], 0]] == score {
                let row = order[i];
                let w = weights.map_or(1.0, |w| w[row] as f64);
                if labels[row] > 0.5 {
                    group_pos += w;
                } else {
                    group_neg += w;
                }
                i += 1;
            }
            area += group_neg * (positives + group_pos / 2.0);
            positives += group_pos;
            negatives += group_neg;
        }

        if positives <= 0.0 || negatives <= 0.0 {
            log::warn!("auc: dataset contains only one class, reporting 0.5");
            return Ok(0.5);
        }
        Ok(area / (positives * negatives))
    }

    fn name(&self) -> &str {
        "auc"
    }

    fn higher_is_better(&self) -> bool {
        true
    }
}

/// Multi-class misclassification rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiError;

impl Metric for MultiError {
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64> {
        self.validate_inputs(predictions, labels, weights)?;
        Ok(weighted_mean(labels.len(), weights, |i| {
            let predicted = if predictions.ncols() == 1 {
                predictions[[i, 0]] as usize
            } else {
                argmax(predictions.row(i))
            };
            if predicted != labels[i] as usize {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn name(&self) -> &str {
        "merror"
    }
}

/// Multi-class negative log likelihood.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiLogLoss;

impl Metric for MultiLogLoss {
    fn evaluate(
        &self,
        predictions: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
    ) -> Result<f64> {
        self.validate_inputs(predictions, labels, weights)?;
        let num_class = predictions.ncols();
        if let Some(bad) = labels.iter().find(|&&l| l < 0.0 || l as usize >= num_class) {
            return Err(XGBoostError::engine(format!(
                "mlogloss: label {} out of range for {} classes",
                bad, num_class
            )));
        }
        Ok(weighted_mean(labels.len(), weights, |i| {
            let p = predictions[[i, labels[i] as usize]] as f64;
            -p.max(PROB_EPSILON).ln()
        }))
    }

    fn name(&self) -> &str {
        "mlogloss"
    }
}
