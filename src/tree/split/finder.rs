//! Split finding for Pure Rust XGBoost.
//!
//! Every bin boundary of every candidate feature is scored twice, once with
//! missing values sent right and once with them sent left, and the direction
//! with the larger loss reduction becomes the node's default direction.

use crate::config::Params;
use crate::core::constants::RT_EPS;
use crate::core::types::{BinIndex, FeatureIndex};
use crate::dataset::binning::{BinMapper, BinnedMatrix};
use crate::tree::histogram::{FeatureHistogram, GradStats};
use rayon::prelude::*;

/// L1 soft-thresholding of a gradient sum.
pub fn threshold_l1(sum_gradients: f64, alpha: f64) -> f64 {
    if sum_gradients > alpha {
        sum_gradients - alpha
    } else if sum_gradients < -alpha {
        sum_gradients + alpha
    } else {
        0.0
    }
}

/// Regularization terms shared by split scoring and leaf weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitFinderConfig {
    /// Minimum sum of hessians in each child
    pub min_child_weight: f64,
    /// L2 regularization
    pub lambda: f64,
    /// L1 regularization
    pub alpha: f64,
    /// Minimum loss reduction
    pub gamma: f64,
    /// Maximum absolute leaf weight (0 = unconstrained)
    pub max_delta_step: f64,
}

impl Default for SplitFinderConfig {
    fn default() -> Self {
        SplitFinderConfig::from(&Params::default())
    }
}

impl From<&Params> for SplitFinderConfig {
    fn from(params: &Params) -> Self {
        SplitFinderConfig {
            min_child_weight: params.min_child_weight,
            lambda: params.lambda,
            alpha: params.alpha,
            gamma: params.gamma,
            max_delta_step: params.max_delta_step,
        }
    }
}

impl SplitFinderConfig {
    /// Optimal leaf weight before shrinkage.
    pub fn calc_weight(&self, stats: GradStats) -> f64 {
        if stats.sum_hessians < self.min_child_weight || stats.sum_hessians <= 0.0 {
            return 0.0;
        }
        let weight = -threshold_l1(stats.sum_gradients, self.alpha)
            / (stats.sum_hessians + self.lambda);
        if self.max_delta_step > 0.0 {
            weight.clamp(-self.max_delta_step, self.max_delta_step)
        } else {
            weight
        }
    }

    /// Structure score of a node holding `stats`.
    pub fn calc_gain(&self, stats: GradStats) -> f64 {
        if stats.sum_hessians < self.min_child_weight || stats.sum_hessians <= 0.0 {
            return 0.0;
        }
        let denominator = stats.sum_hessians + self.lambda;
        if self.max_delta_step > 0.0 {
            let weight = self.calc_weight(stats);
            -(2.0 * (stats.sum_gradients * weight + self.alpha * weight.abs())
                + denominator * weight * weight)
        } else {
            let g = threshold_l1(stats.sum_gradients, self.alpha);
            g * g / denominator
        }
    }
}

/// Information about a chosen split point.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Feature index for the split
    pub feature: FeatureIndex,
    /// Rows with bin `<= threshold_bin` go left
    pub threshold_bin: BinIndex,
    /// Rows with value `<= threshold_value` go left
    pub threshold_value: f64,
    /// Loss reduction of the split
    pub gain: f64,
    /// Default direction for missing values
    pub default_left: bool,
    /// Left child statistics
    pub left: GradStats,
    /// Right child statistics
    pub right: GradStats,
}

/// Histogram based split finder.
#[derive(Debug, Clone, Default)]
pub struct SplitFinder {
    config: SplitFinderConfig,
}

impl SplitFinder {
    /// Creates a split finder with the given regularization.
    pub fn new(config: SplitFinderConfig) -> Self {
        SplitFinder { config }
    }

    /// Regularization in use.
    pub fn config(&self) -> &SplitFinderConfig {
        &self.config
    }

    /// Best split over all candidate features, if any improves the loss enough.
    pub fn find_best_split(
        &self,
        histograms: &[FeatureHistogram],
        binned: &BinnedMatrix,
        parent: GradStats,
    ) -> Option<SplitInfo> {
        let candidates: Vec<Option<SplitInfo>> = histograms
            .par_iter()
            .map(|hist| {
                self.find_best_split_for_feature(hist, binned.mapper(hist.feature()), parent)
            })
            .collect();

        // Sequential reduction keeps ties on the lowest feature index.
        let mut best: Option<SplitInfo> = None;
        for candidate in candidates.into_iter().flatten() {
            if best.as_ref().map_or(true, |b| candidate.gain > b.gain) {
                best = Some(candidate);
            }
        }

        best.filter(|split| split.gain > RT_EPS && split.gain >= self.config.gamma)
    }

    /// Best split of one feature.
    pub fn find_best_split_for_feature(
        &self,
        hist: &FeatureHistogram,
        mapper: &BinMapper,
        parent: GradStats,
    ) -> Option<SplitInfo> {
        let bins = hist.bins();
        let num_bins = bins.len();
        let missing = hist.missing();
        let parent_gain = self.config.calc_gain(parent);
        let mut best: Option<SplitInfo> = None;

        let mut consider = |bin: usize, left: GradStats, default_left: bool| {
            let right = parent - left;
            if left.is_empty() || right.is_empty() {
                return;
            }
            if left.sum_hessians < self.config.min_child_weight
                || right.sum_hessians < self.config.min_child_weight
            {
                return;
            }
            let gain = self.config.calc_gain(left) + self.config.calc_gain(right) - parent_gain;
            if best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitInfo {
                    feature: hist.feature(),
                    threshold_bin: bin as BinIndex,
                    threshold_value: Self::threshold_value(mapper, bin),
                    gain,
                    default_left,
                    left,
                    right,
                });
            }
        };

        // Missing values go right; with missing rows the last boundary
        // separates present from missing.
        let last = if missing.is_empty() {
            num_bins.saturating_sub(1)
        } else {
            num_bins
        };
        let mut left = GradStats::default();
        for (bin, stats) in bins.iter().enumerate().take(last) {
            left += *stats;
            consider(bin, left, false);
        }

        // Missing values go left
        if !missing.is_empty() {
            let mut left = missing;
            for (bin, stats) in bins.iter().enumerate().take(num_bins.saturating_sub(1)) {
                left += *stats;
                consider(bin, left, true);
            }
        }

        best
    }

    fn threshold_value(mapper: &BinMapper, bin: usize) -> f64 {
        let bound = mapper.upper_bound(bin as BinIndex);
        // Infinite thresholds do not survive JSON model files.
        if bound.is_finite() {
            bound
        } else {
            f64::MAX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DMatrix;
    use crate::tree::histogram::HistogramBuilder;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn config() -> SplitFinderConfig {
        SplitFinderConfig {
            min_child_weight: 0.0,
            lambda: 1.0,
            alpha: 0.0,
            gamma: 0.0,
            max_delta_step: 0.0,
        }
    }

    fn setup(values: Vec<f32>, gradients: &[f32]) -> (BinnedMatrix, Vec<FeatureHistogram>, GradStats) {
        let n = values.len();
        let dm = DMatrix::from_dense(Array2::from_shape_vec((n, 1), values).unwrap());
        let binned = BinnedMatrix::from_dmatrix(&dm, 256);
        let hessians = vec![1.0; n];
        let rows: Vec<usize> = (0..n).collect();
        let hists =
            HistogramBuilder::new().construct_histograms(&binned, &[0], &rows, gradients, &hessians);
        let parent = GradStats::from_rows(&rows, gradients, &hessians);
        (binned, hists, parent)
    }

    #[test]
    fn test_threshold_l1() {
        assert_eq!(threshold_l1(3.0, 1.0), 2.0);
        assert_eq!(threshold_l1(-3.0, 1.0), -2.0);
        assert_eq!(threshold_l1(0.5, 1.0), 0.0);
    }

    #[test]
    fn test_leaf_weight() {
        let cfg = config();
        let stats = GradStats {
            sum_gradients: -10.0,
            sum_hessians: 4.0,
            count: 4,
        };
        assert_relative_eq!(cfg.calc_weight(stats), 2.0);

        let clipped = SplitFinderConfig {
            max_delta_step: 0.5,
            ..cfg.clone()
        };
        assert_relative_eq!(clipped.calc_weight(stats), 0.5);

        let heavy = SplitFinderConfig {
            min_child_weight: 5.0,
            ..cfg
        };
        assert_eq!(heavy.calc_weight(stats), 0.0);
    }

    #[test]
    fn test_finds_separating_split() {
        let (binned, hists, parent) =
            setup(vec![1.0, 2.0, 3.0, 4.0], &[-1.0, -1.0, 1.0, 1.0]);
        let split = SplitFinder::new(config())
            .find_best_split(&hists, &binned, parent)
            .unwrap();

        assert_eq!(split.feature, 0);
        assert_eq!(split.threshold_value, 2.5);
        assert_eq!(split.left.count, 2);
        assert_eq!(split.right.count, 2);
        // 4/3 + 4/3 - 0
        assert_relative_eq!(split.gain, 8.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_direction_is_learned() {
        let (binned, hists, parent) =
            setup(vec![1.0, f32::NAN, 3.0, 4.0], &[-1.0, -1.0, 1.0, 1.0]);
        let split = SplitFinder::new(config())
            .find_best_split(&hists, &binned, parent)
            .unwrap();

        assert!(split.default_left);
        assert_eq!(split.threshold_value, 2.0);
        assert_eq!(split.left.count, 2);
    }

    #[test]
    fn test_gamma_rejects_weak_split() {
        let (binned, hists, parent) =
            setup(vec![1.0, 2.0, 3.0, 4.0], &[-1.0, -1.0, 1.0, 1.0]);
        let finder = SplitFinder::new(SplitFinderConfig {
            gamma: 10.0,
            ..config()
        });
        assert!(finder.find_best_split(&hists, &binned, parent).is_none());
    }

    #[test]
    fn test_constant_feature_has_no_split() {
        let (binned, hists, parent) = setup(vec![1.0; 4], &[-1.0, -1.0, 1.0, 1.0]);
        assert!(SplitFinder::new(config())
            .find_best_split(&hists, &binned, parent)
            .is_none());
    }
}
