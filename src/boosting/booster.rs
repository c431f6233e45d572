//! The trained model handle.
//!
//! A [`Booster`] owns the tree ensemble together with everything needed to use
//! it: the parameters it was trained with, the objective that turns margins
//! into predictions, and the feature names and types of the training data.

use crate::boosting::model::GBTreeModel;
use crate::config::Params;
use crate::core::error::{Result, XGBoostError};
use crate::core::traits::{Metric, ObjectiveFunction};
use crate::core::types::*;
use crate::dataset::{default_feature_names, DMatrix};
use crate::io::model_file::{ModelDocument, ModelFormat, MODEL_FORMAT_VERSION};
use crate::metrics::create_metric;
use crate::objective::create_objective;
use crate::prediction::{FeatureImportanceCalculator, PredictOptions, Predictor};

use chrono::Utc;
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

const BEST_ITERATION_ATTR: &str = "best_iteration";
const BEST_SCORE_ATTR: &str = "best_score";

/// One metric value measured on one watchlist entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationEntry {
    /// Watchlist name of the dataset
    pub data: String,
    /// Metric name
    pub metric: String,
    /// Metric value
    pub value: f64,
}

/// Format one round of evaluation results: `[3]\teval-error:0.042000\ttrain-error:0.046000`.
pub fn format_evaluation(iteration: usize, entries: &[EvaluationEntry]) -> String {
    let mut line = format!("[{}]", iteration);
    for entry in entries {
        let _ = write!(line, "\t{}-{}:{:.6}", entry.data, entry.metric, entry.value);
    }
    line
}

/// Gradient boosted tree model.
#[derive(Debug)]
pub struct Booster {
    params: Params,
    objective: Box<dyn ObjectiveFunction>,
    model: GBTreeModel,
    feature_names: Option<Vec<String>>,
    feature_types: Option<Vec<FeatureType>>,
    attributes: BTreeMap<String, String>,
}

impl Booster {
    /// Create an untrained booster shaped after `dtrain`.
    pub fn new(params: Params, dtrain: &DMatrix) -> Result<Self> {
        params.validate()?;
        let objective = create_objective(&params)?;
        let base_margin = objective.prob_to_margin(params.base_score)?;
        let model = GBTreeModel::new(dtrain.num_col(), objective.num_output_groups(), base_margin);
        log::debug!(
            "Booster created: objective {}, {} features, {} output group(s)",
            objective.name(),
            dtrain.num_col(),
            model.num_output_group()
        );

        Ok(Booster {
            params,
            objective,
            model,
            feature_names: dtrain.has_feature_names().then(|| dtrain.feature_names()),
            feature_types: dtrain.feature_types().map(|types| types.to_vec()),
            attributes: BTreeMap::new(),
        })
    }

    /// Training parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Objective in use
    pub fn objective(&self) -> &dyn ObjectiveFunction {
        self.objective.as_ref()
    }

    /// Tree ensemble
    pub fn model(&self) -> &GBTreeModel {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut GBTreeModel {
        &mut self.model
    }

    /// Feature names of the training data; positional defaults when none were set.
    pub fn feature_names(&self) -> Vec<String> {
        match &self.feature_names {
            Some(names) => names.clone(),
            None => default_feature_names(self.model.num_feature()),
        }
    }

    /// Feature types of the training data
    pub fn feature_types(&self) -> Option<&[FeatureType]> {
        self.feature_types.as_deref()
    }

    /// Number of trees; `num_class` per round for multi-class objectives.
    pub fn num_trees(&self) -> usize {
        self.model.num_trees()
    }

    /// Number of completed boosting rounds
    pub fn num_boosted_rounds(&self) -> usize {
        self.model.num_iterations()
    }

    /// Check that `data` has the columns this model was trained on.
    ///
    /// Explicit names on either side must match exactly. When both sides use
    /// positional names the column counts may differ, as sparse text inputs
    /// only extend to the largest index present.
    pub fn validate_features(&self, data: &DMatrix) -> Result<()> {
        if self.feature_names.is_none() && !data.has_feature_names() {
            if data.num_col() != self.model.num_feature() {
                log::debug!(
                    "Data has {} columns, model was trained on {}",
                    data.num_col(),
                    self.model.num_feature()
                );
            }
            return Ok(());
        }
        let expected = self.feature_names();
        let actual = data.feature_names();
        if expected != actual {
            return Err(XGBoostError::feature_mismatch(&expected, &actual));
        }
        Ok(())
    }

    fn margins(&self, data: &DMatrix, ntree_limit: usize) -> Result<Array2<Score>> {
        self.validate_features(data)?;
        Predictor::new(&self.model).predict_margin(
            &data.features(),
            &data.get_base_margin(),
            ntree_limit,
        )
    }

    /// Predictions over every tree, transformed by the objective.
    ///
    /// One value per row, except `multi:softprob` which yields `num_class`
    /// probabilities per row in row-major order.
    pub fn predict(&self, data: &DMatrix) -> Result<Array1<Score>> {
        self.predict_with(data, PredictOptions::default())
    }

    /// Predictions with explicit options.
    pub fn predict_with(&self, data: &DMatrix, options: PredictOptions) -> Result<Array1<Score>> {
        let margins = self.margins(data, options.ntree_limit)?;
        let output = if options.output_margin {
            margins
        } else {
            self.objective.transform_predictions(margins)
        };
        Ok(output.iter().copied().collect())
    }

    /// Leaf index of every row in every tree, `(num_rows, num_trees)`.
    pub fn predict_leaf(&self, data: &DMatrix) -> Result<Array2<u32>> {
        self.validate_features(data)?;
        Ok(Predictor::new(&self.model).predict_leaf(&data.features(), 0))
    }

    /// Weight of tree `index`.
    pub fn tree_weight(&self, index: usize) -> Result<f64> {
        self.model
            .weight(index)
            .ok_or_else(|| XGBoostError::index_out_of_bounds(index, self.model.num_trees()))
    }

    /// Set the weight of tree `index`.
    pub fn set_tree_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        self.set_tree_weights(&[(index, weight)])
    }

    /// Set several tree weights. Every pair is checked before any is applied,
    /// so a failed call leaves all weights unchanged.
    pub fn set_tree_weights(&mut self, weights: &[(usize, f64)]) -> Result<()> {
        let num_trees = self.model.num_trees();
        for &(index, weight) in weights {
            if index >= num_trees {
                return Err(XGBoostError::index_out_of_bounds(index, num_trees));
            }
            if !weight.is_finite() {
                return Err(XGBoostError::invalid_parameter(
                    "tree_weight",
                    weight.to_string(),
                    "must be finite",
                ));
            }
        }
        for &(index, weight) in weights {
            self.model.set_weight(index, weight);
        }
        Ok(())
    }

    /// Importance score of every feature used in a split.
    pub fn get_score(&self, importance_type: ImportanceType) -> BTreeMap<String, f64> {
        let names = self.feature_names();
        FeatureImportanceCalculator::new(&self.model, &names).calculate_importance(importance_type)
    }

    /// Split counts per feature, same as `get_score(ImportanceType::Weight)`.
    pub fn get_fscore(&self) -> BTreeMap<String, f64> {
        self.get_score(ImportanceType::Weight)
    }

    /// Text dump of every tree.
    pub fn dump_model(&self, with_stats: bool) -> Vec<String> {
        let names = self.feature_names();
        self.model
            .trees()
            .iter()
            .map(|info| info.tree.dump(&names, with_stats))
            .collect()
    }

    /// String attribute
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Set a string attribute; `None` deletes it.
    pub fn set_attr<S: Into<String>>(&mut self, key: &str, value: Option<S>) {
        match value {
            Some(value) => {
                self.attributes.insert(key.to_string(), value.into());
            }
            None => {
                self.attributes.remove(key);
            }
        }
    }

    /// All string attributes
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Round with the best score, recorded by early stopping.
    pub fn best_iteration(&self) -> Option<usize> {
        self.attr(BEST_ITERATION_ATTR).and_then(|v| v.parse().ok())
    }

    /// Best score, recorded by early stopping.
    pub fn best_score(&self) -> Option<f64> {
        self.attr(BEST_SCORE_ATTR).and_then(|v| v.parse().ok())
    }

    pub(crate) fn set_best(&mut self, iteration: usize, score: f64) {
        self.set_attr(BEST_ITERATION_ATTR, Some(iteration.to_string()));
        self.set_attr(BEST_SCORE_ATTR, Some(score.to_string()));
    }

    /// Metrics reported on watchlists: `eval_metric`, else the objective default.
    pub(crate) fn eval_metrics(&self) -> Result<Vec<Box<dyn Metric>>> {
        if self.params.eval_metric.is_empty() {
            Ok(vec![create_metric(self.objective.default_metric())?])
        } else {
            self.params
                .eval_metric
                .iter()
                .map(|name| create_metric(name))
                .collect()
        }
    }

    /// Score margins of `data` with `metrics`.
    pub(crate) fn evaluate_margins(
        &self,
        metrics: &[Box<dyn Metric>],
        margins: Array2<Score>,
        data: &DMatrix,
        name: &str,
    ) -> Result<Vec<EvaluationEntry>> {
        if !data.has_label() {
            return Err(XGBoostError::engine(format!(
                "watchlist entry '{}' has no labels",
                name
            )));
        }
        let predictions = self.objective.eval_transform(margins);
        let labels = data.get_label();
        let weights = data.weights();
        metrics
            .iter()
            .map(|metric| {
                Ok(EvaluationEntry {
                    data: name.to_string(),
                    metric: metric.name().to_string(),
                    value: metric.evaluate(&predictions.view(), &labels, weights.as_ref())?,
                })
            })
            .collect()
    }

    /// Evaluate the current model on every watchlist entry.
    pub fn evaluate(&self, evals: &[(&DMatrix, &str)]) -> Result<Vec<EvaluationEntry>> {
        let metrics = self.eval_metrics()?;
        let mut entries = Vec::new();
        for &(data, name) in evals {
            let margins = self.margins(data, 0)?;
            entries.extend(self.evaluate_margins(&metrics, margins, data, name)?);
        }
        Ok(entries)
    }

    /// Evaluation line for `iteration`, e.g. `[0]\teval-error:0.042831`.
    pub fn eval_set(&self, evals: &[(&DMatrix, &str)], iteration: usize) -> Result<String> {
        Ok(format_evaluation(iteration, &self.evaluate(evals)?))
    }

    fn to_document(&self) -> ModelDocument {
        ModelDocument {
            version: MODEL_FORMAT_VERSION.to_string(),
            created_at: Utc::now(),
            params: self.params.clone(),
            model: self.model.clone(),
            feature_names: self.feature_names.clone(),
            feature_types: self.feature_types.clone(),
            attributes: self.attributes.clone(),
        }
    }

    fn from_document(document: ModelDocument) -> Result<Self> {
        let objective = create_objective(&document.params)
            .map_err(|e| XGBoostError::engine(format!("invalid model parameters: {}", e)))?;
        if objective.num_output_groups() != document.model.num_output_group() {
            return Err(XGBoostError::engine(format!(
                "objective {} expects {} output groups, model has {}",
                objective.name(),
                objective.num_output_groups(),
                document.model.num_output_group()
            )));
        }
        Ok(Booster {
            params: document.params,
            objective,
            model: document.model,
            feature_names: document.feature_names,
            feature_types: document.feature_types,
            attributes: document.attributes,
        })
    }

    /// Save to `path`: JSON when the path ends in `.json`, binary otherwise.
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_document().write(path)
    }

    /// Load a model written by [`Booster::save_model`].
    ///
    /// Any failure, including a missing file, is an engine error.
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self> {
        let booster = Self::from_document(ModelDocument::read(path.as_ref())?)?;
        log::info!(
            "Loaded model with {} trees from {}",
            booster.num_trees(),
            path.as_ref().display()
        );
        Ok(booster)
    }

    /// Binary form of the model, as written by [`Booster::save_model`].
    pub fn save_raw(&self) -> Result<Vec<u8>> {
        self.to_document().to_bytes(ModelFormat::Binary)
    }

    /// Restore a model from [`Booster::save_raw`] output.
    pub fn load_raw(bytes: &[u8]) -> Result<Self> {
        Self::from_document(ModelDocument::from_bytes(bytes)?)
    }
}
