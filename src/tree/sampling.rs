//! Row and column sampling for tree construction.
//!
//! Sampling is driven by a seeded [`StdRng`], so two boosters trained with the
//! same seed on the same data grow identical trees.

use crate::config::Params;
use crate::core::types::FeatureIndex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Configuration for row and feature sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Fraction of rows used by each tree
    pub subsample: f64,
    /// Fraction of features used by each tree
    pub colsample_bytree: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig::from(&Params::default())
    }
}

impl From<&Params> for SamplingConfig {
    fn from(params: &Params) -> Self {
        SamplingConfig {
            subsample: params.subsample,
            colsample_bytree: params.colsample_bytree,
            seed: params.seed,
        }
    }
}

/// Per-tree row and feature sampler.
#[derive(Debug, Clone)]
pub struct Sampler {
    config: SamplingConfig,
    rng: StdRng,
}

impl Sampler {
    /// Creates a sampler seeded from `config.seed`.
    pub fn new(config: SamplingConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Sampler { config, rng }
    }

    /// Rows used by the next tree; each row is kept with probability `subsample`.
    pub fn sample_rows(&mut self, num_rows: usize) -> Vec<usize> {
        if self.config.subsample >= 1.0 {
            return (0..num_rows).collect();
        }
        let ratio = self.config.subsample;
        let rng = &mut self.rng;
        let rows: Vec<usize> = (0..num_rows).filter(|_| rng.gen::<f64>() < ratio).collect();
        log::trace!("Row sampling kept {} of {} rows", rows.len(), num_rows);
        rows
    }

    /// Features used by the next tree, in ascending order. At least one is kept.
    pub fn sample_features(&mut self, num_features: usize) -> Vec<FeatureIndex> {
        if self.config.colsample_bytree >= 1.0 || num_features == 0 {
            return (0..num_features).collect();
        }
        let amount = ((num_features as f64 * self.config.colsample_bytree).round() as usize)
            .clamp(1, num_features);
        let mut features = index::sample(&mut self.rng, num_features, amount).into_vec();
        features.sort_unstable();
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(subsample: f64, colsample_bytree: f64) -> SamplingConfig {
        SamplingConfig {
            subsample,
            colsample_bytree,
            seed: 7,
        }
    }

    #[test]
    fn test_no_sampling_keeps_everything() {
        let mut sampler = Sampler::new(config(1.0, 1.0));
        assert_eq!(sampler.sample_rows(4), vec![0, 1, 2, 3]);
        assert_eq!(sampler.sample_features(3), vec![0, 1, 2]);
    }

    #[test]
    fn test_feature_sampling() {
        let mut sampler = Sampler::new(config(1.0, 0.5));
        let features = sampler.sample_features(10);
        assert_eq!(features.len(), 5);
        assert!(features.windows(2).all(|w| w[0] < w[1]));
        assert!(features.iter().all(|&f| f < 10));

        let mut tiny = Sampler::new(config(1.0, 0.01));
        assert_eq!(tiny.sample_features(3).len(), 1);
    }

    #[test]
    fn test_row_sampling_is_seeded() {
        let mut a = Sampler::new(config(0.5, 1.0));
        let mut b = Sampler::new(config(0.5, 1.0));
        let rows = a.sample_rows(1000);
        assert_eq!(rows, b.sample_rows(1000));
        assert!(rows.len() > 350 && rows.len() < 650);
    }
}
