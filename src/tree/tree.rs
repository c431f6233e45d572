//! Regression tree implementation for Pure Rust XGBoost.
//!
//! Nodes live in a contiguous vector with the root at index 0. Leaf values are
//! stored with the learning rate already applied, so the ensemble output is a
//! plain weighted sum of leaf values.

use crate::core::types::{BinIndex, FeatureIndex, NodeIndex, Score};
use crate::tree::node::TreeNode;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Child statistics passed to [`Tree::split_node`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    /// Sum of gradients
    pub sum_gradients: f64,
    /// Sum of hessians
    pub sum_hessians: f64,
    /// Number of rows
    pub data_count: usize,
}

/// Decision tree structure representing a single tree in the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Vector of tree nodes (index 0 is always the root)
    nodes: Vec<TreeNode>,
    /// Current number of leaf nodes
    num_leaves: usize,
    /// Maximum depth reached so far
    max_depth: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a new tree with a single root leaf.
    pub fn new() -> Self {
        Tree {
            nodes: vec![TreeNode::new_leaf(0.0, 0.0, 0, 0, None)],
            num_leaves: 1,
            max_depth: 0,
        }
    }

    /// Creates a single-leaf tree with the given root statistics.
    pub fn with_root(sum_gradients: f64, sum_hessians: f64, data_count: usize) -> Self {
        Tree {
            nodes: vec![TreeNode::new_leaf(
                sum_gradients,
                sum_hessians,
                data_count,
                0,
                None,
            )],
            num_leaves: 1,
            max_depth: 0,
        }
    }

    /// Returns the number of nodes in the tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Returns the maximum depth of the tree.
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Returns a reference to the node at the given index.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Returns a mutable reference to the node at the given index.
    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut TreeNode> {
        self.nodes.get_mut(index)
    }

    /// Returns the root node.
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Predicts the output for a single row.
    ///
    /// Columns beyond the end of `features` are treated as missing.
    pub fn predict(&self, features: &ArrayView1<'_, f32>) -> Score {
        let leaf = self.predict_leaf_index(features);
        self.nodes[leaf].leaf_value().unwrap_or(0.0)
    }

    /// Predicts the leaf index for a single row.
    pub fn predict_leaf_index(&self, features: &ArrayView1<'_, f32>) -> NodeIndex {
        let mut node_index = 0;
        loop {
            let node = &self.nodes[node_index];
            let value = node
                .split_feature()
                .and_then(|feature| features.get(feature).copied())
                .unwrap_or(f32::NAN);
            match node.next_node(value) {
                Some(next) if next < self.nodes.len() => node_index = next,
                _ => return node_index,
            }
        }
    }

    /// Sets the value of the leaf at the given index.
    pub fn set_leaf_value(&mut self, node_index: NodeIndex, value: Score) -> anyhow::Result<()> {
        let node = self
            .nodes
            .get_mut(node_index)
            .ok_or_else(|| anyhow::anyhow!("Node index {} out of bounds", node_index))?;
        if !node.is_leaf() {
            return Err(anyhow::anyhow!("Cannot set value of non-leaf node {}", node_index));
        }
        node.set_leaf_value(value);
        Ok(())
    }

    /// Splits a leaf node into an internal node with two children.
    #[allow(clippy::too_many_arguments)]
    pub fn split_node(
        &mut self,
        node_index: NodeIndex,
        split_feature: FeatureIndex,
        split_threshold: f64,
        split_bin: BinIndex,
        split_gain: f64,
        default_left: bool,
        left: ChildStats,
        right: ChildStats,
    ) -> anyhow::Result<(NodeIndex, NodeIndex)> {
        let node = self
            .nodes
            .get(node_index)
            .ok_or_else(|| anyhow::anyhow!("Node index {} out of bounds", node_index))?;
        if !node.is_leaf() {
            return Err(anyhow::anyhow!("Cannot split non-leaf node {}", node_index));
        }

        let child_depth = node.depth() + 1;
        self.max_depth = self.max_depth.max(child_depth);

        let left_child_index = self.nodes.len();
        let right_child_index = left_child_index + 1;

        self.nodes.push(TreeNode::new_leaf(
            left.sum_gradients,
            left.sum_hessians,
            left.data_count,
            child_depth,
            Some(node_index),
        ));
        self.nodes.push(TreeNode::new_leaf(
            right.sum_gradients,
            right.sum_hessians,
            right.data_count,
            child_depth,
            Some(node_index),
        ));

        self.nodes[node_index].set_split(
            left_child_index,
            right_child_index,
            split_feature,
            split_threshold,
            split_bin,
            split_gain,
            default_left,
        );

        // Added 2 leaves, removed 1
        self.num_leaves += 1;

        Ok((left_child_index, right_child_index))
    }

    /// Returns all leaf node indices.
    pub fn leaf_indices(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| if node.is_leaf() { Some(i) } else { None })
            .collect()
    }

    /// Text dump of the tree, one node per line in depth-first order.
    ///
    /// Internal nodes print as `0:[f1<=0.5] yes=1,no=2,missing=1`, leaves as
    /// `1:leaf=0.25`. `feature_names` supplies the split feature labels.
    pub fn dump(&self, feature_names: &[String], with_stats: bool) -> String {
        let mut out = String::new();
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            for _ in 0..node.depth() {
                out.push('\t');
            }
            match (node.left_child(), node.right_child(), node.split_feature()) {
                (Some(left), Some(right), Some(feature)) if !node.is_leaf() => {
                    let name = feature_names
                        .get(feature)
                        .cloned()
                        .unwrap_or_else(|| format!("f{}", feature));
                    let missing = if node.default_left() { left } else { right };
                    let _ = write!(
                        out,
                        "{}:[{}<={}] yes={},no={},missing={}",
                        index,
                        name,
                        node.split_threshold().unwrap_or(0.0),
                        left,
                        right,
                        missing
                    );
                    if with_stats {
                        let _ = write!(
                            out,
                            ",gain={},cover={}",
                            node.split_gain(),
                            node.sum_hessians()
                        );
                    }
                    stack.push(right);
                    stack.push(left);
                }
                _ => {
                    let _ = write!(out, "{}:leaf={}", index, node.leaf_value().unwrap_or(0.0));
                    if with_stats {
                        let _ = write!(out, ",cover={}", node.sum_hessians());
                    }
                }
            }
            out.push('\n');
        }
        out
    }

    /// Validates the tree structure consistency.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.nodes.is_empty() {
            return Err(anyhow::anyhow!("Tree has no nodes"));
        }

        if self.nodes[0].parent().is_some() {
            return Err(anyhow::anyhow!("Root node should not have a parent"));
        }

        let mut leaf_count = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                leaf_count += 1;
                if node.left_child().is_some() || node.right_child().is_some() {
                    return Err(anyhow::anyhow!("Leaf node {} has children", i));
                }
                continue;
            }

            let (left_idx, right_idx) = match (node.left_child(), node.right_child()) {
                (Some(left), Some(right)) => (left, right),
                _ => return Err(anyhow::anyhow!("Internal node {} missing children", i)),
            };

            if left_idx >= self.nodes.len() || right_idx >= self.nodes.len() {
                return Err(anyhow::anyhow!("Node {} has invalid child indices", i));
            }
            if node.split_feature().is_none() || node.split_threshold().is_none() {
                return Err(anyhow::anyhow!("Internal node {} has no split", i));
            }
            if self.nodes[left_idx].parent() != Some(i) {
                return Err(anyhow::anyhow!("Left child {} parent mismatch", left_idx));
            }
            if self.nodes[right_idx].parent() != Some(i) {
                return Err(anyhow::anyhow!("Right child {} parent mismatch", right_idx));
            }
        }

        if leaf_count != self.num_leaves {
            return Err(anyhow::anyhow!(
                "Leaf count mismatch: expected {}, found {}",
                self.num_leaves,
                leaf_count
            ));
        }

        Ok(())
    }

    /// Converts the tree to a JSON representation.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e))
    }

    /// Creates a tree from a JSON representation.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let tree: Tree = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("JSON deserialization failed: {}", e))?;
        tree.validate()?;
        Ok(tree)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree(nodes={}, leaves={}, depth={})",
            self.num_nodes(),
            self.num_leaves(),
            self.depth()
        )
    }
}
