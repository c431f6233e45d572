//! Feature binning for histogram based split finding.
//!
//! [`BinnedMatrix`] is the training-time view of a [`DMatrix`]: one
//! [`BinMapper`] per feature and the bin index of every entry, stored column by
//! column so histograms can be built one feature at a time.

pub mod mapper;

pub use mapper::BinMapper;

use crate::core::types::*;
use crate::dataset::dmatrix::DMatrix;
use rayon::prelude::*;

/// Column-major binned copy of a feature matrix
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    mappers: Vec<BinMapper>,
    columns: Vec<Vec<BinIndex>>,
    num_rows: usize,
}

impl BinnedMatrix {
    /// Discretize every feature of `matrix` into at most `max_bins` bins.
    pub fn from_dmatrix(matrix: &DMatrix, max_bins: usize) -> Self {
        let features = matrix.features();
        let (mappers, columns): (Vec<BinMapper>, Vec<Vec<BinIndex>>) = (0..matrix.num_col())
            .into_par_iter()
            .map(|j| {
                let values = features.column(j).to_vec();
                let mapper = BinMapper::from_values(&values, max_bins);
                let bins = values.iter().map(|&v| mapper.value_to_bin(v)).collect();
                (mapper, bins)
            })
            .unzip();

        log::debug!(
            "Binned {} rows x {} features, {} bins in total",
            matrix.num_row(),
            mappers.len(),
            mappers.iter().map(BinMapper::num_bins).sum::<usize>()
        );

        BinnedMatrix {
            mappers,
            columns,
            num_rows: matrix.num_row(),
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of features
    pub fn num_features(&self) -> usize {
        self.mappers.len()
    }

    /// Mapper of one feature
    pub fn mapper(&self, feature: FeatureIndex) -> &BinMapper {
        &self.mappers[feature]
    }

    /// Bin indices of one feature
    pub fn column(&self, feature: FeatureIndex) -> &[BinIndex] {
        &self.columns[feature]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MISSING_BIN;
    use ndarray::array;

    #[test]
    fn test_binned_matrix() {
        let dm = DMatrix::from_dense(array![[0.0f32, 5.0], [1.0, f32::NAN], [0.0, 7.0]]);
        let binned = BinnedMatrix::from_dmatrix(&dm, 256);

        assert_eq!(binned.num_rows(), 3);
        assert_eq!(binned.num_features(), 2);
        assert_eq!(binned.column(0), &[0, 1, 0]);
        assert_eq!(binned.column(1), &[0, MISSING_BIN, 1]);
        assert_eq!(binned.mapper(1).upper_bound(0), 6.0);
    }
}
