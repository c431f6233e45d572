//! Evaluation metrics for Pure Rust XGBoost.
//!
//! Metrics score transformed predictions (`(num_rows, num_groups)` matrices)
//! against labels and optional row weights. They are looked up by the names the
//! `eval_metric` parameter accepts:
//!
//! | name | metric |
//! |---|---|
//! | `rmse` | root mean squared error |
//! | `mae` | mean absolute error |
//! | `logloss` | negative log likelihood of a binary label |
//! | `error`, `error@t` | binary misclassification rate at threshold 0.5 or `t` |
//! | `auc` | area under the ROC curve |
//! | `merror` | multi-class misclassification rate |
//! | `mlogloss` | multi-class negative log likelihood |
//!
//! ```rust
//! use xgboost_rust::metrics::create_metric;
//! use ndarray::array;
//!
//! let metric = create_metric("error").unwrap();
//! let predictions = array![[0.9f32], [0.2], [0.7]];
//! let labels = array![1.0f32, 0.0, 0.0];
//! let value = metric.evaluate(&predictions.view(), &labels.view(), None).unwrap();
//! assert!((value - 1.0 / 3.0).abs() < 1e-12);
//! ```

pub mod classification;
pub mod regression;

pub use classification::{Auc, BinaryError, LogLoss, MultiError, MultiLogLoss};
pub use regression::{Mae, Rmse};

use crate::core::error::{Result, XGBoostError};
use crate::core::traits::Metric;
use crate::core::types::*;
use ndarray::ArrayView1;

/// Build a metric from its `eval_metric` name.
pub fn create_metric(name: &str) -> Result<Box<dyn Metric>> {
    let name = name.trim();
    let metric: Box<dyn Metric> = match name {
        "rmse" => Box::new(Rmse),
        "mae" => Box::new(Mae),
        "logloss" => Box::new(LogLoss),
        "error" => Box::new(BinaryError::default()),
        "auc" => Box::new(Auc),
        "merror" => Box::new(MultiError),
        "mlogloss" => Box::new(MultiLogLoss),
        _ => match name.strip_prefix("error@") {
            Some(threshold) => {
                let threshold = threshold.parse::<f32>().map_err(|_| {
                    XGBoostError::invalid_parameter("eval_metric", name, "invalid error threshold")
                })?;
                Box::new(BinaryError::with_threshold(threshold))
            }
            None => {
                return Err(XGBoostError::invalid_parameter(
                    "eval_metric",
                    name,
                    "unknown metric",
                ))
            }
        },
    };
    Ok(metric)
}

/// Weighted mean of `loss(i)` over all rows.
pub(crate) fn weighted_mean<F>(
    num_rows: usize,
    weights: Option<&ArrayView1<'_, Label>>,
    loss: F,
) -> f64
where
    F: Fn(usize) -> f64,
{
    let mut sum = 0.0;
    let mut weight_sum = 0.0;
    for i in 0..num_rows {
        let w = weights.map_or(1.0, |w| w[i] as f64);
        sum += w * loss(i);
        weight_sum += w;
    }
    if weight_sum > 0.0 {
        sum / weight_sum
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_create_metric() {
        for name in ["rmse", "mae", "logloss", "error", "auc", "merror", "mlogloss"] {
            assert_eq!(create_metric(name).unwrap().name(), name);
        }
        assert_eq!(create_metric("error@0.7").unwrap().name(), "error@0.7");
        assert!(create_metric("auc").unwrap().higher_is_better());

        let err = create_metric("ndcg@3").unwrap_err();
        assert!(err.is_engine_error());
        assert!(create_metric("error@x").is_err());
    }

    #[test]
    fn test_weighted_mean() {
        let weights = Array1::from(vec![1.0f32, 3.0]);
        let value = weighted_mean(2, Some(&weights.view()), |i| i as f64);
        assert!((value - 0.75).abs() < 1e-12);
        assert_eq!(weighted_mean(0, None, |_| 1.0), 0.0);
    }
}
