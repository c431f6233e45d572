//! Classification objectives: binary logistic and multi-class softmax.

use super::regression::LogisticRegression;
use super::{check_gradient_shapes, row_weight, sigmoid};
use crate::core::constants::MIN_HESSIAN;
use crate::core::error::{Result, XGBoostError};
use crate::core::traits::ObjectiveFunction;
use crate::core::types::*;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2, Axis, Zip};

/// Binary logistic loss on 0/1 labels.
///
/// With `output_raw` the booster returns margins (`binary:logitraw`),
/// otherwise probabilities (`binary:logistic`).
#[derive(Debug, Clone, Copy)]
pub struct BinaryLogistic {
    output_raw: bool,
}

impl BinaryLogistic {
    /// Create the objective.
    pub fn new(output_raw: bool) -> Self {
        BinaryLogistic { output_raw }
    }
}

impl ObjectiveFunction for BinaryLogistic {
    fn compute_gradients(
        &self,
        margins: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
        gradients: &mut ArrayViewMut2<'_, Score>,
        hessians: &mut ArrayViewMut2<'_, Score>,
    ) -> Result<()> {
        LogisticRegression::logistic_gradients(
            self.name(),
            margins,
            labels,
            weights,
            gradients,
            hessians,
        )
    }

    fn transform_predictions(&self, mut margins: Array2<Score>) -> Array2<Score> {
        if !self.output_raw {
            Zip::from(&mut margins).for_each(|m| *m = sigmoid(*m));
        }
        margins
    }

    fn prob_to_margin(&self, base_score: f64) -> Result<f64> {
        LogisticRegression::logit(self.name(), base_score)
    }

    fn name(&self) -> &'static str {
        if self.output_raw {
            "binary:logitraw"
        } else {
            "binary:logistic"
        }
    }

    fn validate_labels(&self, labels: &ArrayView1<'_, Label>) -> Result<()> {
        if let Some(bad) = labels.iter().find(|&&l| !(0.0..=1.0).contains(&l)) {
            return Err(XGBoostError::training(format!(
                "{}: label must be in [0,1] for binary classification, got {}",
                self.name(),
                bad
            )));
        }
        Ok(())
    }

    fn default_metric(&self) -> &'static str {
        if self.output_raw {
            "auc"
        } else {
            "error"
        }
    }
}

/// Softmax cross entropy over `num_class` margins per row.
///
/// `multi:softmax` predicts the arg-max class index, `multi:softprob` the full
/// probability matrix. Metrics always see probabilities.
#[derive(Debug, Clone, Copy)]
pub struct Softmax {
    num_class: usize,
    output_prob: bool,
}

impl Softmax {
    /// Create the objective.
    pub fn new(num_class: usize, output_prob: bool) -> Self {
        Softmax {
            num_class,
            output_prob,
        }
    }

    fn softmax(mut margins: Array2<Score>) -> Array2<Score> {
        for mut row in margins.axis_iter_mut(Axis(0)) {
            let max = row.iter().copied().fold(Score::NEG_INFINITY, Score::max);
            row.mapv_inplace(|m| (m - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|e| e / sum);
        }
        margins
    }
}

/// Index of the largest value; first one on ties.
pub(crate) fn argmax(row: ArrayView1<'_, Score>) -> usize {
    let mut best = 0;
    for (k, &value) in row.iter().enumerate() {
        if value > row[best] {
            best = k;
        }
    }
    best
}

impl ObjectiveFunction for Softmax {
    fn compute_gradients(
        &self,
        margins: &ArrayView2<'_, Score>,
        labels: &ArrayView1<'_, Label>,
        weights: Option<&ArrayView1<'_, Label>>,
        gradients: &mut ArrayViewMut2<'_, Score>,
        hessians: &mut ArrayViewMut2<'_, Score>,
    ) -> Result<()> {
        check_gradient_shapes(self.name(), margins, labels, weights, gradients, hessians)?;
        if margins.ncols() != self.num_class {
            return Err(XGBoostError::training(format!(
                "{}: expected {} margin columns, got {}",
                self.name(),
                self.num_class,
                margins.ncols()
            )));
        }

        let probabilities = Self::softmax(margins.to_owned());
        for (i, row) in probabilities.axis_iter(Axis(0)).enumerate() {
            let w = row_weight(weights, i);
            let label = labels[i] as usize;
            for (k, &p) in row.iter().enumerate() {
                let target = if k == label { 1.0 } else { 0.0 };
                gradients[[i, k]] = (p - target) * w;
                hessians[[i, k]] = (2.0 * p * (1.0 - p)).max(MIN_HESSIAN) * w;
            }
        }
        Ok(())
    }

    fn transform_predictions(&self, margins: Array2<Score>) -> Array2<Score> {
        if self.output_prob {
            return Self::softmax(margins);
        }
        Array1::from_iter(margins.axis_iter(Axis(0)).map(|row| argmax(row) as Score))
            .insert_axis(Axis(1))
    }

    fn eval_transform(&self, margins: Array2<Score>) -> Array2<Score> {
        Self::softmax(margins)
    }

    fn num_output_groups(&self) -> usize {
        self.num_class
    }

    fn name(&self) -> &'static str {
        if self.output_prob {
            "multi:softprob"
        } else {
            "multi:softmax"
        }
    }

    fn validate_labels(&self, labels: &ArrayView1<'_, Label>) -> Result<()> {
        let num_class = self.num_class as Label;
        if let Some(bad) = labels
            .iter()
            .find(|&&l| l < 0.0 || l >= num_class || l.fract() != 0.0)
        {
            return Err(XGBoostError::training(format!(
                "{}: label must be an integer in [0, {}), got {}",
                self.name(),
                self.num_class,
                bad
            )));
        }
        Ok(())
    }

    fn default_metric(&self) -> &'static str {
        if self.output_prob {
            "mlogloss"
        } else {
            "merror"
        }
    }
}
