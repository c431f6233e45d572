//! Feature importance from split statistics.
//!
//! Every internal node contributes to the feature it splits on: one occurrence,
//! its loss reduction (gain) and its hessian sum (cover). Features that never
//! appear in a split are left out of the result.

use crate::boosting::model::GBTreeModel;
use crate::core::constants::DEFAULT_FEATURE_PREFIX;
use crate::core::types::{FeatureIndex, ImportanceType};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
struct SplitTotals {
    count: usize,
    gain: f64,
    cover: f64,
}

/// Feature importance calculator
#[derive(Debug)]
pub struct FeatureImportanceCalculator<'a> {
    model: &'a GBTreeModel,
    feature_names: &'a [String],
}

impl<'a> FeatureImportanceCalculator<'a> {
    /// Create a calculator; `feature_names` label the split features.
    pub fn new(model: &'a GBTreeModel, feature_names: &'a [String]) -> Self {
        FeatureImportanceCalculator {
            model,
            feature_names,
        }
    }

    fn totals(&self) -> BTreeMap<FeatureIndex, SplitTotals> {
        let mut totals: BTreeMap<FeatureIndex, SplitTotals> = BTreeMap::new();
        for info in self.model.trees() {
            for node in info.tree.nodes().iter().filter(|node| !node.is_leaf()) {
                if let Some(feature) = node.split_feature() {
                    let entry = totals.entry(feature).or_default();
                    entry.count += 1;
                    entry.gain += node.split_gain();
                    entry.cover += node.sum_hessians();
                }
            }
        }
        totals
    }

    fn name(&self, feature: FeatureIndex) -> String {
        self.feature_names
            .get(feature)
            .cloned()
            .unwrap_or_else(|| format!("{}{}", DEFAULT_FEATURE_PREFIX, feature))
    }

    /// Importance score per used feature.
    pub fn calculate_importance(&self, importance_type: ImportanceType) -> BTreeMap<String, f64> {
        self.totals()
            .into_iter()
            .map(|(feature, totals)| {
                let count = totals.count as f64;
                let score = match importance_type {
                    ImportanceType::Weight => count,
                    ImportanceType::Gain => totals.gain,
                    ImportanceType::AverageGain => totals.gain / count,
                    ImportanceType::Cover => totals.cover / count,
                    ImportanceType::TotalCover => totals.cover,
                };
                (self.name(feature), score)
            })
            .collect()
    }

    /// Used features sorted by decreasing importance; ties keep name order.
    pub fn get_importance_ranking(&self, importance_type: ImportanceType) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> =
            self.calculate_importance(importance_type).into_iter().collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }
}
