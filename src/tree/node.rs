//! Tree node implementation for Pure Rust XGBoost.
//!
//! A node is either a leaf carrying a (shrunk) output value or an internal node
//! splitting on `feature <= threshold`, with missing values routed by
//! `default_left`.

use crate::core::types::{BinIndex, FeatureIndex, NodeIndex, Score};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tree node representation supporting both internal and leaf nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Left child node index (for internal nodes only)
    left_child: Option<NodeIndex>,
    /// Right child node index (for internal nodes only)
    right_child: Option<NodeIndex>,
    /// Parent node index (None for root node)
    parent: Option<NodeIndex>,
    /// Split feature index (for internal nodes only)
    split_feature: Option<FeatureIndex>,
    /// Split threshold value (for internal nodes only)
    split_threshold: Option<f64>,
    /// Bin threshold for the split (for internal nodes only)
    split_bin: Option<BinIndex>,
    /// Prediction value (for leaf nodes only)
    leaf_value: Option<Score>,
    /// Sum of gradients in this node
    sum_gradients: f64,
    /// Sum of hessians in this node, reported as cover
    sum_hessians: f64,
    /// Number of training rows in this node
    data_count: usize,
    /// Loss reduction of the split
    split_gain: f64,
    /// Node depth in the tree
    depth: usize,
    /// Whether this node is a leaf
    is_leaf: bool,
    /// Default direction for missing values (true = left, false = right)
    default_left: bool,
}

impl TreeNode {
    /// Creates a new leaf node with the given statistics.
    pub fn new_leaf(
        sum_gradients: f64,
        sum_hessians: f64,
        data_count: usize,
        depth: usize,
        parent: Option<NodeIndex>,
    ) -> Self {
        TreeNode {
            left_child: None,
            right_child: None,
            parent,
            split_feature: None,
            split_threshold: None,
            split_bin: None,
            leaf_value: None,
            sum_gradients,
            sum_hessians,
            data_count,
            split_gain: 0.0,
            depth,
            is_leaf: true,
            default_left: false,
        }
    }

    /// Returns true if this node is a leaf node.
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Returns the left child node index (for internal nodes).
    pub fn left_child(&self) -> Option<NodeIndex> {
        self.left_child
    }

    /// Returns the right child node index (for internal nodes).
    pub fn right_child(&self) -> Option<NodeIndex> {
        self.right_child
    }

    /// Returns the parent node index.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns the split feature index (for internal nodes).
    pub fn split_feature(&self) -> Option<FeatureIndex> {
        self.split_feature
    }

    /// Returns the split threshold value (for internal nodes).
    pub fn split_threshold(&self) -> Option<f64> {
        self.split_threshold
    }

    /// Returns the split bin index (for internal nodes).
    pub fn split_bin(&self) -> Option<BinIndex> {
        self.split_bin
    }

    /// Returns the leaf value (for leaf nodes).
    pub fn leaf_value(&self) -> Option<Score> {
        self.leaf_value
    }

    /// Sets the leaf value.
    pub fn set_leaf_value(&mut self, value: Score) {
        self.leaf_value = Some(value);
    }

    /// Returns the sum of gradients in this node.
    pub fn sum_gradients(&self) -> f64 {
        self.sum_gradients
    }

    /// Returns the sum of hessians in this node.
    pub fn sum_hessians(&self) -> f64 {
        self.sum_hessians
    }

    /// Returns the number of training rows in this node.
    pub fn data_count(&self) -> usize {
        self.data_count
    }

    /// Returns the split gain value.
    pub fn split_gain(&self) -> f64 {
        self.split_gain
    }

    /// Returns the node depth in the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the default direction for missing values.
    pub fn default_left(&self) -> bool {
        self.default_left
    }

    /// Child a row with value `value` on the split feature is routed to.
    ///
    /// Returns `None` for leaves.
    pub fn next_node(&self, value: f32) -> Option<NodeIndex> {
        if self.is_leaf {
            return None;
        }
        let threshold = self.split_threshold?;
        let go_left = if value.is_nan() {
            self.default_left
        } else {
            value as f64 <= threshold
        };
        if go_left {
            self.left_child
        } else {
            self.right_child
        }
    }

    /// Converts this node from leaf to internal node with the given split.
    #[allow(clippy::too_many_arguments)]
    pub fn set_split(
        &mut self,
        left_child: NodeIndex,
        right_child: NodeIndex,
        split_feature: FeatureIndex,
        split_threshold: f64,
        split_bin: BinIndex,
        split_gain: f64,
        default_left: bool,
    ) {
        self.left_child = Some(left_child);
        self.right_child = Some(right_child);
        self.split_feature = Some(split_feature);
        self.split_threshold = Some(split_threshold);
        self.split_bin = Some(split_bin);
        self.split_gain = split_gain;
        self.default_left = default_left;
        self.is_leaf = false;
        self.leaf_value = None;
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf {
            write!(
                f,
                "Leaf(value={:.4}, data_count={}, cover={:.4})",
                self.leaf_value.unwrap_or(0.0),
                self.data_count,
                self.sum_hessians
            )
        } else {
            write!(
                f,
                "Internal(feature={}, threshold={:.4}, gain={:.4}, default_left={})",
                self.split_feature.unwrap_or(0),
                self.split_threshold.unwrap_or(0.0),
                self.split_gain,
                self.default_left
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_leaf_node() {
        let node = TreeNode::new_leaf(10.0, 5.0, 100, 2, Some(0));

        assert!(node.is_leaf());
        assert_eq!(node.sum_gradients(), 10.0);
        assert_eq!(node.sum_hessians(), 5.0);
        assert_eq!(node.data_count(), 100);
        assert_eq!(node.depth(), 2);
        assert_eq!(node.parent(), Some(0));
        assert!(node.left_child().is_none());
        assert!(node.next_node(1.0).is_none());
    }

    #[test]
    fn test_set_split_and_routing() {
        let mut node = TreeNode::new_leaf(10.0, 5.0, 100, 0, None);
        node.set_leaf_value(0.5);
        node.set_split(1, 2, 3, 2.5, 10, 1.2, false);

        assert!(!node.is_leaf());
        assert_eq!(node.split_feature(), Some(3));
        assert_eq!(node.split_threshold(), Some(2.5));
        assert!(node.leaf_value().is_none());

        assert_eq!(node.next_node(2.5), Some(1));
        assert_eq!(node.next_node(2.6), Some(2));
        assert_eq!(node.next_node(f32::NAN), Some(2));
    }
}
