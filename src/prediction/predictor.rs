//! Core prediction engine for Pure Rust XGBoost.
//!
//! Margins are accumulated in `f64`, one row at a time and one tree at a time
//! in growth order, so a prediction does not depend on the number of worker
//! threads and the incremental caches kept during training agree bit for bit
//! with a prediction from scratch.

use crate::boosting::model::GBTreeModel;
use crate::core::error::{Result, XGBoostError};
use crate::core::types::*;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Prediction settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictOptions {
    /// Return untransformed margins
    pub output_margin: bool,
    /// Use only the trees of the first `ntree_limit` rounds (0 = all)
    pub ntree_limit: usize,
}

impl PredictOptions {
    /// Default options: transformed output over every tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to return raw margins
    pub fn with_output_margin(mut self, output_margin: bool) -> Self {
        self.output_margin = output_margin;
        self
    }

    /// Set the number of rounds to use
    pub fn with_ntree_limit(mut self, ntree_limit: usize) -> Self {
        self.ntree_limit = ntree_limit;
        self
    }
}

/// Scores rows against a [`GBTreeModel`].
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    model: &'a GBTreeModel,
}

impl<'a> Predictor<'a> {
    /// Create a predictor over `model`
    pub fn new(model: &'a GBTreeModel) -> Self {
        Predictor { model }
    }

    /// Starting margins, `(num_rows, num_groups)`.
    ///
    /// A non-empty `base_margin` (row-major, one value per row and group)
    /// replaces the model's global base margin.
    pub fn initial_margins(
        &self,
        num_rows: usize,
        base_margin: &ArrayView1<'_, Score>,
    ) -> Result<Array2<f64>> {
        let groups = self.model.num_output_group();
        if base_margin.is_empty() {
            return Ok(Array2::from_elem((num_rows, groups), self.model.base_margin()));
        }
        if base_margin.len() != num_rows * groups {
            return Err(XGBoostError::prediction(format!(
                "base_margin has {} values, expected {} rows x {} groups",
                base_margin.len(),
                num_rows,
                groups
            )));
        }
        Ok(Array2::from_shape_fn((num_rows, groups), |(i, k)| {
            base_margin[i * groups + k] as f64
        }))
    }

    /// Add the contribution of trees `[begin, end)` to `margins`.
    pub fn accumulate(
        &self,
        features: &ArrayView2<'_, f32>,
        margins: &mut Array2<f64>,
        begin: usize,
        end: usize,
    ) {
        if begin >= end {
            return;
        }
        margins
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(features.axis_iter(Axis(0)).into_par_iter())
            .for_each(|(mut margin, row)| {
                self.model.accumulate_row(&row, begin, end, &mut margin);
            });
    }

    /// Raw margins, `(num_rows, num_groups)`.
    pub fn predict_margin(
        &self,
        features: &ArrayView2<'_, f32>,
        base_margin: &ArrayView1<'_, Score>,
        ntree_limit: usize,
    ) -> Result<Array2<Score>> {
        let mut margins = self.initial_margins(features.nrows(), base_margin)?;
        self.accumulate(features, &mut margins, 0, self.model.tree_limit(ntree_limit));
        Ok(margins.mapv(|m| m as Score))
    }

    /// Leaf reached in every tree, `(num_rows, num_trees)`.
    pub fn predict_leaf(&self, features: &ArrayView2<'_, f32>, ntree_limit: usize) -> Array2<u32> {
        let end = self.model.tree_limit(ntree_limit);
        let mut leaves = Array2::zeros((features.nrows(), end));
        leaves
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(features.axis_iter(Axis(0)).into_par_iter())
            .for_each(|(mut out, row)| self.model.leaf_indices(&row, end, &mut out));
        leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ChildStats, Tree};
    use ndarray::{array, Array1};

    fn stump(left: Score, right: Score) -> Tree {
        let mut tree = Tree::with_root(0.0, 2.0, 2);
        let stats = ChildStats {
            sum_gradients: 0.0,
            sum_hessians: 1.0,
            data_count: 1,
        };
        let (l, r) = tree.split_node(0, 0, 0.5, 0, 1.0, false, stats, stats).unwrap();
        tree.set_leaf_value(l, left).unwrap();
        tree.set_leaf_value(r, right).unwrap();
        tree
    }

    fn model() -> GBTreeModel {
        let mut model = GBTreeModel::new(1, 1, 0.5);
        model.add_iteration_trees(vec![stump(-1.0, 1.0)]).unwrap();
        model.add_iteration_trees(vec![stump(-0.5, 0.5)]).unwrap();
        model
    }

    #[test]
    fn test_predict_margin() {
        let model = model();
        let predictor = Predictor::new(&model);
        let features = array![[0.0f32], [1.0], [f32::NAN]];
        let empty = Array1::<Score>::zeros(0);

        let margins = predictor.predict_margin(&features.view(), &empty.view(), 0).unwrap();
        assert_eq!(margins, array![[-1.0f32], [2.0], [2.0]]);

        let first = predictor.predict_margin(&features.view(), &empty.view(), 1).unwrap();
        assert_eq!(first, array![[-0.5f32], [1.5], [1.5]]);
    }

    #[test]
    fn test_row_base_margin() {
        let model = model();
        let predictor = Predictor::new(&model);
        let features = array![[0.0f32], [1.0]];
        let base = array![1.0f32, -1.0];
        let margins = predictor.predict_margin(&features.view(), &base.view(), 0).unwrap();
        assert_eq!(margins, array![[-0.5f32], [0.5]]);

        let bad = array![1.0f32, 2.0, 3.0];
        assert!(predictor.predict_margin(&features.view(), &bad.view(), 0).is_err());
    }

    #[test]
    fn test_predict_leaf() {
        let model = model();
        let leaves = Predictor::new(&model).predict_leaf(&array![[0.0f32], [1.0]].view(), 0);
        assert_eq!(leaves, array![[1u32, 1], [2, 2]]);
    }

    #[test]
    fn test_options_builder() {
        let options = PredictOptions::new().with_output_margin(true).with_ntree_limit(3);
        assert!(options.output_margin);
        assert_eq!(options.ntree_limit, 3);
    }
}
