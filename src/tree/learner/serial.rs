//! Serial tree learner for Pure Rust XGBoost.
//!
//! Grows one regression tree depth-wise from first and second order gradients.
//! Nodes are expanded in breadth-first order; the smaller child of every split
//! gets a freshly built histogram and its sibling is derived by subtraction.

use crate::config::Params;
use crate::core::constants::MISSING_BIN;
use crate::core::types::{FeatureIndex, NodeIndex, Score};
use crate::dataset::binning::BinnedMatrix;
use crate::tree::histogram::{FeatureHistogram, GradStats, HistogramBuilder};
use crate::tree::split::{SplitFinder, SplitFinderConfig, SplitInfo};
use crate::tree::tree::{ChildStats, Tree};
use std::collections::VecDeque;

/// Configuration for the serial tree learner.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialTreeLearnerConfig {
    /// Maximum tree depth (0 = unlimited)
    pub max_depth: usize,
    /// Shrinkage applied to leaf weights
    pub eta: f64,
    /// Regularization used for split scoring and leaf weights
    pub split: SplitFinderConfig,
}

impl Default for SerialTreeLearnerConfig {
    fn default() -> Self {
        SerialTreeLearnerConfig::from(&Params::default())
    }
}

impl From<&Params> for SerialTreeLearnerConfig {
    fn from(params: &Params) -> Self {
        SerialTreeLearnerConfig {
            max_depth: params.max_depth,
            eta: params.eta,
            split: SplitFinderConfig::from(params),
        }
    }
}

/// Node waiting to be expanded.
#[derive(Debug)]
struct NodeInfo {
    node_index: NodeIndex,
    rows: Vec<usize>,
    depth: usize,
    stats: GradStats,
    histograms: Vec<FeatureHistogram>,
}

/// Serial tree learner implementing depth-wise tree construction.
#[derive(Debug, Clone)]
pub struct SerialTreeLearner {
    config: SerialTreeLearnerConfig,
    histogram_builder: HistogramBuilder,
    split_finder: SplitFinder,
}

impl SerialTreeLearner {
    /// Creates a new serial tree learner with the given configuration.
    pub fn new(config: SerialTreeLearnerConfig) -> Self {
        let split_finder = SplitFinder::new(config.split.clone());
        SerialTreeLearner {
            config,
            histogram_builder: HistogramBuilder::new(),
            split_finder,
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &SerialTreeLearnerConfig {
        &self.config
    }

    /// Grows a tree over `rows`, splitting only on `features`.
    ///
    /// `gradients` and `hessians` are indexed by row of `binned`.
    pub fn train(
        &self,
        binned: &BinnedMatrix,
        gradients: &[Score],
        hessians: &[Score],
        rows: Vec<usize>,
        features: &[FeatureIndex],
    ) -> anyhow::Result<Tree> {
        if gradients.len() != binned.num_rows() || hessians.len() != binned.num_rows() {
            return Err(anyhow::anyhow!(
                "Gradient and hessian arrays must match dataset size: {} rows, {} gradients, {} hessians",
                binned.num_rows(),
                gradients.len(),
                hessians.len()
            ));
        }

        let root_stats = GradStats::from_rows(&rows, gradients, hessians);
        let mut tree = Tree::with_root(
            root_stats.sum_gradients,
            root_stats.sum_hessians,
            root_stats.count,
        );

        let root_histograms = if self.can_expand(0) && !rows.is_empty() {
            self.histogram_builder
                .construct_histograms(binned, features, &rows, gradients, hessians)
        } else {
            Vec::new()
        };

        let mut queue = VecDeque::new();
        queue.push_back(NodeInfo {
            node_index: 0,
            rows,
            depth: 0,
            stats: root_stats,
            histograms: root_histograms,
        });

        while let Some(node) = queue.pop_front() {
            if !self.can_expand(node.depth) || node.histograms.is_empty() {
                continue;
            }
            let split = match self
                .split_finder
                .find_best_split(&node.histograms, binned, node.stats)
            {
                Some(split) => split,
                None => continue,
            };
            let (left, right) = self.apply_split(&mut tree, binned, gradients, hessians, node, &split)?;
            queue.push_back(left);
            queue.push_back(right);
        }

        self.finalize_leaf_values(&mut tree)?;
        tree.validate()?;

        log::trace!(
            "Tree grown: {} leaves, depth {}",
            tree.num_leaves(),
            tree.depth()
        );
        Ok(tree)
    }

    fn can_expand(&self, depth: usize) -> bool {
        self.config.max_depth == 0 || depth < self.config.max_depth
    }

    /// Applies a split to the tree and returns the two child nodes.
    fn apply_split(
        &self,
        tree: &mut Tree,
        binned: &BinnedMatrix,
        gradients: &[Score],
        hessians: &[Score],
        parent: NodeInfo,
        split: &SplitInfo,
    ) -> anyhow::Result<(NodeInfo, NodeInfo)> {
        let column = binned.column(split.feature);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            parent.rows.iter().copied().partition(|&row| match column[row] {
                MISSING_BIN => split.default_left,
                bin => bin <= split.threshold_bin,
            });

        let (left_index, right_index) = tree.split_node(
            parent.node_index,
            split.feature,
            split.threshold_value,
            split.threshold_bin,
            split.gain,
            split.default_left,
            ChildStats {
                sum_gradients: split.left.sum_gradients,
                sum_hessians: split.left.sum_hessians,
                data_count: left_rows.len(),
            },
            ChildStats {
                sum_gradients: split.right.sum_gradients,
                sum_hessians: split.right.sum_hessians,
                data_count: right_rows.len(),
            },
        )?;

        let child_depth = parent.depth + 1;
        let (left_histograms, right_histograms) = if self.can_expand(child_depth) {
            let features: Vec<FeatureIndex> =
                parent.histograms.iter().map(FeatureHistogram::feature).collect();
            let build = |rows: &[usize]| {
                self.histogram_builder
                    .construct_histograms(binned, &features, rows, gradients, hessians)
            };
            if left_rows.len() <= right_rows.len() {
                let small = build(&left_rows);
                let large = self
                    .histogram_builder
                    .construct_histograms_by_subtraction(&parent.histograms, &small);
                (small, large)
            } else {
                let small = build(&right_rows);
                let large = self
                    .histogram_builder
                    .construct_histograms_by_subtraction(&parent.histograms, &small);
                (large, small)
            }
        } else {
            (Vec::new(), Vec::new())
        };

        let left = NodeInfo {
            node_index: left_index,
            rows: left_rows,
            depth: child_depth,
            stats: split.left,
            histograms: left_histograms,
        };
        let right = NodeInfo {
            node_index: right_index,
            rows: right_rows,
            depth: child_depth,
            stats: split.right,
            histograms: right_histograms,
        };
        Ok((left, right))
    }

    /// Sets `eta * weight` on every leaf.
    fn finalize_leaf_values(&self, tree: &mut Tree) -> anyhow::Result<()> {
        for leaf in tree.leaf_indices() {
            let stats = match tree.node(leaf) {
                Some(node) => GradStats {
                    sum_gradients: node.sum_gradients(),
                    sum_hessians: node.sum_hessians(),
                    count: node.data_count(),
                },
                None => continue,
            };
            let value = self.config.eta * self.config.split.calc_weight(stats);
            tree.set_leaf_value(leaf, value as Score)?;
        }
        Ok(())
    }
}
