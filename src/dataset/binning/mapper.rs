//! Bin mapper implementation for feature discretization.
//!
//! A [`BinMapper`] holds ascending upper bounds; value `v` falls into the first
//! bin whose bound is `>= v`. The last bound is `+inf`, so every non-missing
//! value has a bin and `v <= upper_bound(bin)` is exactly the test a tree split
//! on that bin applies at prediction time.

use crate::core::constants::MISSING_BIN;
use crate::core::types::*;
use serde::{Deserialize, Serialize};

/// Bin mapper for one numerical feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinMapper {
    /// Ascending bin upper bounds, last one is `+inf`
    bin_upper_bounds: Vec<f64>,
    /// Number of distinct non-missing values seen
    num_unique_values: usize,
    /// Number of missing values seen
    num_missing: usize,
}

impl BinMapper {
    /// Build cut points from the values of one feature.
    ///
    /// With at most `max_bins` distinct values each value gets its own bin and
    /// bounds sit halfway between neighbours; otherwise bounds are quantiles.
    pub fn from_values(values: &[f32], max_bins: usize) -> Self {
        let mut valid: Vec<f32> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let num_missing = values.len() - valid.len();
        valid.sort_by(f32::total_cmp);

        let mut unique = valid.clone();
        unique.dedup();

        let bin_upper_bounds = if unique.is_empty() {
            Vec::new()
        } else if unique.len() <= max_bins.max(1) {
            Self::create_unique_value_boundaries(&unique)
        } else {
            Self::create_quantile_boundaries(&valid, max_bins)
        };

        BinMapper {
            bin_upper_bounds,
            num_unique_values: unique.len(),
            num_missing,
        }
    }

    fn create_unique_value_boundaries(unique: &[f32]) -> Vec<f64> {
        let mut bounds: Vec<f64> = unique
            .windows(2)
            .map(|pair| {
                let (low, high) = (pair[0] as f64, pair[1] as f64);
                let mid = (low + high) / 2.0;
                if mid.is_finite() {
                    mid
                } else {
                    // an infinite neighbour; keep the bound finite and below `high`
                    low.max(f64::MIN)
                }
            })
            .collect();
        bounds.push(f64::INFINITY);
        bounds
    }

    fn create_quantile_boundaries(sorted: &[f32], num_bins: usize) -> Vec<f64> {
        let n = sorted.len();
        let mut bounds: Vec<f64> = (1..num_bins)
            .map(|i| (sorted[(i * n / num_bins).min(n - 1)] as f64).max(f64::MIN))
            .collect();
        bounds.dedup();
        if bounds.last().map_or(false, |&last| last >= sorted[n - 1] as f64) {
            bounds.pop();
        }
        bounds.push(f64::INFINITY);
        bounds
    }

    /// Bin of a value; NaN maps to [`MISSING_BIN`].
    pub fn value_to_bin(&self, value: f32) -> BinIndex {
        if value.is_nan() || self.bin_upper_bounds.is_empty() {
            return MISSING_BIN;
        }
        let value = value as f64;
        self.bin_upper_bounds.partition_point(|&bound| bound < value) as BinIndex
    }

    /// Upper bound of a bin, the split threshold for "bin <= b".
    pub fn upper_bound(&self, bin: BinIndex) -> f64 {
        self.bin_upper_bounds
            .get(bin as usize)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Number of bins
    pub fn num_bins(&self) -> usize {
        self.bin_upper_bounds.len()
    }

    /// Number of distinct non-missing values
    pub fn num_unique_values(&self) -> usize {
        self.num_unique_values
    }

    /// Number of missing values
    pub fn num_missing(&self) -> usize {
        self.num_missing
    }

    /// Whether the feature can be split on at all
    pub fn is_trivial(&self) -> bool {
        self.num_bins() < 2 && self.num_missing == 0
    }

    /// Bin boundaries
    pub fn bin_boundaries(&self) -> &[f64] {
        &self.bin_upper_bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_value_bins() {
        let mapper = BinMapper::from_values(&[0.0, 1.0, 1.0, 0.0, f32::NAN], 256);
        assert_eq!(mapper.num_bins(), 2);
        assert_eq!(mapper.num_unique_values(), 2);
        assert_eq!(mapper.num_missing(), 1);
        assert_eq!(mapper.bin_boundaries(), &[0.5, f64::INFINITY]);
        assert_eq!(mapper.value_to_bin(0.0), 0);
        assert_eq!(mapper.value_to_bin(1.0), 1);
        assert_eq!(mapper.value_to_bin(f32::NAN), MISSING_BIN);
        assert_eq!(mapper.upper_bound(0), 0.5);
    }

    #[test]
    fn test_quantile_bins() {
        let values: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let mapper = BinMapper::from_values(&values, 10);
        assert!(mapper.num_bins() <= 10);
        assert!(mapper.num_bins() >= 2);

        for window in values.windows(2) {
            assert!(mapper.value_to_bin(window[0]) <= mapper.value_to_bin(window[1]));
        }
        for &value in &values {
            let bin = mapper.value_to_bin(value);
            assert!(value as f64 <= mapper.upper_bound(bin));
            if bin > 0 {
                assert!(value as f64 > mapper.upper_bound(bin - 1));
            }
        }
    }

    #[test]
    fn test_infinite_values_get_finite_bounds() {
        let mapper = BinMapper::from_values(&[f32::NEG_INFINITY, f32::INFINITY], 256);
        assert_eq!(mapper.num_bins(), 2);
        assert_eq!(mapper.upper_bound(0), f64::MIN);
        assert_eq!(mapper.value_to_bin(f32::NEG_INFINITY), 0);
        assert_eq!(mapper.value_to_bin(f32::INFINITY), 1);
        assert_eq!(mapper.value_to_bin(0.0), 1);

        let mapper = BinMapper::from_values(&[1.0, f32::INFINITY], 256);
        assert_eq!(mapper.bin_boundaries(), &[1.0, f64::INFINITY]);
        assert_eq!(mapper.value_to_bin(1.0), 0);
        assert_eq!(mapper.value_to_bin(f32::INFINITY), 1);

        let mut values: Vec<f32> = (0..100).map(|i| i as f32).collect();
        values.extend([f32::NEG_INFINITY; 50]);
        let mapper = BinMapper::from_values(&values, 4);
        let (last, interior) = mapper.bin_boundaries().split_last().unwrap();
        assert_eq!(*last, f64::INFINITY);
        assert!(interior.iter().all(|b| b.is_finite()));
        assert_eq!(mapper.value_to_bin(f32::NEG_INFINITY), 0);
    }

    #[test]
    fn test_constant_and_empty_features() {
        let constant = BinMapper::from_values(&[3.0; 5], 16);
        assert_eq!(constant.num_bins(), 1);
        assert!(constant.is_trivial());

        let empty = BinMapper::from_values(&[f32::NAN, f32::NAN], 16);
        assert_eq!(empty.num_bins(), 0);
        assert_eq!(empty.value_to_bin(1.0), MISSING_BIN);
    }
}
