//! Tree ensemble with per-tree weights.
//!
//! The model stores trees in the order they were grown. For multi-class
//! objectives each boosting round appends one tree per output group, so tree
//! `i` belongs to group `i % num_output_group` and round `i / num_output_group`.
//! Every tree carries a weight multiplier (1.0 when grown) that scales its leaf
//! values at prediction time and can be changed after training.

use crate::core::constants::DEFAULT_TREE_WEIGHT;
use crate::core::types::IterationIndex;
use crate::tree::Tree;
use ndarray::{ArrayView1, ArrayViewMut1};
use serde::{Deserialize, Serialize};

/// A tree plus its position in the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeInfo {
    /// The regression tree
    pub tree: Tree,
    /// Boosting round that produced the tree
    pub iteration: IterationIndex,
    /// Output group (class index for multi-class, else 0)
    pub group: usize,
    /// Multiplier applied to the tree's leaf values
    pub weight: f64,
}

impl TreeInfo {
    /// Creates a tree entry with the default weight.
    pub fn new(tree: Tree, iteration: IterationIndex, group: usize) -> Self {
        TreeInfo {
            tree,
            iteration,
            group,
            weight: DEFAULT_TREE_WEIGHT,
        }
    }
}

/// Gradient boosted tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GBTreeModel {
    trees: Vec<TreeInfo>,
    num_output_group: usize,
    num_feature: usize,
    /// Global initial margin, already in margin space
    base_margin: f64,
}

impl GBTreeModel {
    /// Creates an empty ensemble.
    pub fn new(num_feature: usize, num_output_group: usize, base_margin: f64) -> Self {
        GBTreeModel {
            trees: Vec::new(),
            num_output_group: num_output_group.max(1),
            num_feature,
            base_margin,
        }
    }

    /// Appends the trees of one boosting round, one per output group.
    pub fn add_iteration_trees(&mut self, trees: Vec<Tree>) -> anyhow::Result<()> {
        if trees.len() != self.num_output_group {
            return Err(anyhow::anyhow!(
                "Expected {} trees per iteration, got {}",
                self.num_output_group,
                trees.len()
            ));
        }
        let iteration = self.num_iterations();
        for (group, tree) in trees.into_iter().enumerate() {
            self.trees.push(TreeInfo::new(tree, iteration, group));
        }
        Ok(())
    }

    /// Total number of trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of completed boosting rounds.
    pub fn num_iterations(&self) -> usize {
        self.trees.len() / self.num_output_group
    }

    /// Trees grown per round.
    pub fn num_output_group(&self) -> usize {
        self.num_output_group
    }

    /// Column count of the training data.
    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    /// Initial margin shared by every row.
    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    /// All trees in growth order.
    pub fn trees(&self) -> &[TreeInfo] {
        &self.trees
    }

    /// Weight of tree `index`.
    pub fn weight(&self, index: usize) -> Option<f64> {
        self.trees.get(index).map(|info| info.weight)
    }

    /// Sets the weight of tree `index`; false when the index is out of range.
    pub fn set_weight(&mut self, index: usize, weight: f64) -> bool {
        match self.trees.get_mut(index) {
            Some(info) => {
                info.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Number of trees used when prediction is limited to `num_rounds`
    /// rounds; 0 selects every tree.
    pub fn tree_limit(&self, num_rounds: usize) -> usize {
        if num_rounds == 0 {
            self.trees.len()
        } else {
            (num_rounds * self.num_output_group).min(self.trees.len())
        }
    }

    /// Adds the weighted contribution of trees `[begin, end)` for one row to
    /// `margins`, which holds one accumulator per output group.
    pub fn accumulate_row(
        &self,
        features: &ArrayView1<'_, f32>,
        begin: usize,
        end: usize,
        margins: &mut ArrayViewMut1<'_, f64>,
    ) {
        for info in &self.trees[begin..end.min(self.trees.len())] {
            let leaf = info.tree.predict(features);
            margins[info.group] += info.weight * leaf as f64;
        }
    }

    /// Leaf index reached by one row in every tree of `[0, end)`.
    pub fn leaf_indices(
        &self,
        features: &ArrayView1<'_, f32>,
        end: usize,
        out: &mut ArrayViewMut1<'_, u32>,
    ) {
        for (slot, info) in out.iter_mut().zip(&self.trees[..end.min(self.trees.len())]) {
            *slot = info.tree.predict_leaf_index(features) as u32;
        }
    }

    /// Checks the structure of every tree and the group layout.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.num_output_group == 0 {
            return Err(anyhow::anyhow!("Model has no output groups"));
        }
        if self.trees.len() % self.num_output_group != 0 {
            return Err(anyhow::anyhow!(
                "{} trees do not fill {} output groups",
                self.trees.len(),
                self.num_output_group
            ));
        }
        for (i, info) in self.trees.iter().enumerate() {
            if info.group != i % self.num_output_group {
                return Err(anyhow::anyhow!("Tree {} has group {}", i, info.group));
            }
            if !info.weight.is_finite() {
                return Err(anyhow::anyhow!("Tree {} has weight {}", i, info.weight));
            }
            info.tree
                .validate()
                .map_err(|e| anyhow::anyhow!("Tree {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Summary statistics over the ensemble.
    pub fn statistics(&self) -> EnsembleStatistics {
        let num_trees = self.trees.len();
        let total_leaves: usize = self.trees.iter().map(|info| info.tree.num_leaves()).sum();
        let max_depth = self
            .trees
            .iter()
            .map(|info| info.tree.depth())
            .max()
            .unwrap_or(0);
        EnsembleStatistics {
            num_trees,
            num_iterations: self.num_iterations(),
            total_leaves,
            average_leaves: if num_trees > 0 {
                total_leaves as f64 / num_trees as f64
            } else {
                0.0
            },
            max_depth,
        }
    }
}

/// Ensemble summary.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleStatistics {
    /// Total trees
    pub num_trees: usize,
    /// Completed boosting rounds
    pub num_iterations: usize,
    /// Leaves across all trees
    pub total_leaves: usize,
    /// Mean leaves per tree
    pub average_leaves: f64,
    /// Deepest tree
    pub max_depth: usize,
}
