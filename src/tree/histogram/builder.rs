//! Gradient histogram construction.
//!
//! A node histogram holds, for every candidate feature, the gradient and
//! hessian sums of the node's rows per bin plus a separate bucket for rows
//! whose value is missing.

use crate::core::constants::MISSING_BIN;
use crate::core::types::{BinIndex, FeatureIndex, Hist, Score};
use crate::dataset::binning::BinnedMatrix;
use rayon::prelude::*;
use std::ops::{AddAssign, Sub};

/// Gradient statistics of a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradStats {
    /// Sum of first order gradients
    pub sum_gradients: Hist,
    /// Sum of second order gradients
    pub sum_hessians: Hist,
    /// Number of rows
    pub count: usize,
}

impl GradStats {
    /// Statistics of a single row.
    pub fn new(gradient: Score, hessian: Score) -> Self {
        GradStats {
            sum_gradients: gradient as Hist,
            sum_hessians: hessian as Hist,
            count: 1,
        }
    }

    /// Statistics over `rows`.
    pub fn from_rows(rows: &[usize], gradients: &[Score], hessians: &[Score]) -> Self {
        rows.iter().fold(GradStats::default(), |mut acc, &row| {
            acc += GradStats::new(gradients[row], hessians[row]);
            acc
        })
    }

    /// Whether no rows contributed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl AddAssign for GradStats {
    fn add_assign(&mut self, other: Self) {
        self.sum_gradients += other.sum_gradients;
        self.sum_hessians += other.sum_hessians;
        self.count += other.count;
    }
}

impl Sub for GradStats {
    type Output = GradStats;

    fn sub(self, other: Self) -> Self {
        GradStats {
            sum_gradients: self.sum_gradients - other.sum_gradients,
            sum_hessians: self.sum_hessians - other.sum_hessians,
            count: self.count.saturating_sub(other.count),
        }
    }
}

/// Histogram of one feature over the rows of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureHistogram {
    feature: FeatureIndex,
    bins: Vec<GradStats>,
    missing: GradStats,
}

impl FeatureHistogram {
    /// Accumulate the rows of a node for one binned column.
    pub fn build(
        feature: FeatureIndex,
        column: &[BinIndex],
        num_bins: usize,
        rows: &[usize],
        gradients: &[Score],
        hessians: &[Score],
    ) -> Self {
        let mut bins = vec![GradStats::default(); num_bins];
        let mut missing = GradStats::default();
        for &row in rows {
            let stats = GradStats::new(gradients[row], hessians[row]);
            match column[row] {
                MISSING_BIN => missing += stats,
                bin => {
                    if let Some(slot) = bins.get_mut(bin as usize) {
                        *slot += stats;
                    }
                }
            }
        }
        FeatureHistogram {
            feature,
            bins,
            missing,
        }
    }

    /// Histogram of the sibling node: `self` is the parent histogram.
    pub fn subtract(&self, child: &FeatureHistogram) -> FeatureHistogram {
        FeatureHistogram {
            feature: self.feature,
            bins: self
                .bins
                .iter()
                .zip(&child.bins)
                .map(|(&parent, &child)| parent - child)
                .collect(),
            missing: self.missing - child.missing,
        }
    }

    /// Feature this histogram belongs to
    pub fn feature(&self) -> FeatureIndex {
        self.feature
    }

    /// Per-bin statistics
    pub fn bins(&self) -> &[GradStats] {
        &self.bins
    }

    /// Statistics of rows with a missing value
    pub fn missing(&self) -> GradStats {
        self.missing
    }
}

/// Builds node histograms for a set of candidate features.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramBuilder;

impl HistogramBuilder {
    /// Creates a new histogram builder.
    pub fn new() -> Self {
        HistogramBuilder
    }

    /// Constructs histograms for all `features` in parallel.
    pub fn construct_histograms(
        &self,
        binned: &BinnedMatrix,
        features: &[FeatureIndex],
        rows: &[usize],
        gradients: &[Score],
        hessians: &[Score],
    ) -> Vec<FeatureHistogram> {
        features
            .par_iter()
            .map(|&feature| {
                FeatureHistogram::build(
                    feature,
                    binned.column(feature),
                    binned.mapper(feature).num_bins(),
                    rows,
                    gradients,
                    hessians,
                )
            })
            .collect()
    }

    /// Constructs sibling histograms using parent - child.
    pub fn construct_histograms_by_subtraction(
        &self,
        parent: &[FeatureHistogram],
        child: &[FeatureHistogram],
    ) -> Vec<FeatureHistogram> {
        parent
            .par_iter()
            .zip(child.par_iter())
            .map(|(parent, child)| parent.subtract(child))
            .collect()
    }
}
