//! Booster parameter set.
//!
//! Parameters arrive as a string dictionary (the engine's native schema), as a
//! JSON object, from a `.json`/`.toml` file, from `XGBOOST_*` environment
//! variables, or through [`ParamsBuilder`]. Every source funnels into
//! [`Params::set`], so aliases and parsing rules are identical everywhere.

use crate::config::objective::ObjectiveKind;
use crate::core::constants::*;
use crate::core::error::{Result, XGBoostError};
use crate::core::logging::Verbosity;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Training parameters of a booster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Objective; `None` selects the default for the class count
    pub objective: Option<ObjectiveKind>,
    /// Step size shrinkage applied to new leaf values
    pub eta: f64,
    /// Maximum depth of a tree (0 = unlimited)
    pub max_depth: usize,
    /// Minimum sum of hessians in each child
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub lambda: f64,
    /// L1 regularization on leaf weights
    pub alpha: f64,
    /// Minimum loss reduction required to split
    pub gamma: f64,
    /// Maximum absolute leaf weight before shrinkage (0 = unconstrained)
    pub max_delta_step: f64,
    /// Row sampling ratio per tree
    pub subsample: f64,
    /// Column sampling ratio per tree
    pub colsample_bytree: f64,
    /// Maximum number of histogram bins per feature
    pub max_bin: usize,
    /// Initial prediction of every row, in output space
    pub base_score: f64,
    /// Number of classes for multi-class objectives
    pub num_class: usize,
    /// Metrics reported on watchlists; empty selects the objective default
    pub eval_metric: Vec<String>,
    /// Random seed for row and column sampling
    pub seed: u64,
    /// Worker threads (0 = all cores)
    pub nthread: usize,
    /// Suppress engine messages
    pub silent: bool,
    /// Message verbosity, 0 (silent) to 3 (debug)
    pub verbosity: u32,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            objective: None,
            eta: DEFAULT_ETA,
            max_depth: DEFAULT_MAX_DEPTH,
            min_child_weight: DEFAULT_MIN_CHILD_WEIGHT,
            lambda: DEFAULT_LAMBDA,
            alpha: DEFAULT_ALPHA,
            gamma: DEFAULT_GAMMA,
            max_delta_step: 0.0,
            subsample: DEFAULT_SUBSAMPLE,
            colsample_bytree: DEFAULT_COLSAMPLE_BYTREE,
            max_bin: DEFAULT_MAX_BIN,
            base_score: DEFAULT_BASE_SCORE,
            num_class: 0,
            eval_metric: Vec::new(),
            seed: 0,
            nthread: 0,
            silent: false,
            verbosity: 1,
        }
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| XGBoostError::invalid_parameter(key, value, "expected a number"))
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    let parsed = parse_float(key, value)
        .map_err(|_| XGBoostError::invalid_parameter(key, value, "expected a non-negative integer"))?;
    if parsed < 0.0 || parsed.fract() != 0.0 || !parsed.is_finite() {
        return Err(XGBoostError::invalid_parameter(
            key,
            value,
            "expected a non-negative integer",
        ));
    }
    Ok(parsed as usize)
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        _ => Err(XGBoostError::invalid_parameter(key, value, "expected 0 or 1")),
    }
}

impl Params {
    /// Create a parameter set with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from a string dictionary.
    ///
    /// ```
    /// use xgboost_rust::Params;
    ///
    /// let params = Params::from_pairs([("max_depth", "2"), ("eta", "1"), ("objective", "binary:logistic")]).unwrap();
    /// assert_eq!(params.max_depth, 2);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Params::default();
        for (key, value) in pairs {
            params.set(key.as_ref(), value.as_ref())?;
        }
        params.validate()?;
        Ok(params)
    }

    /// Build parameters from a JSON object such as `{"max_depth": 2, "eval_metric": ["error", "auc"]}`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            XGBoostError::invalid_parameter("params", value.to_string(), "expected a JSON object")
        })?;

        let mut params = Params::default();
        for (key, entry) in object {
            match entry {
                Value::Array(items) => {
                    for item in items {
                        params.set(key, &json_scalar(key, item)?)?;
                    }
                }
                other => params.set(key, &json_scalar(key, other)?)?,
            }
        }
        params.validate()?;
        Ok(params)
    }

    /// Set a single parameter by name.
    ///
    /// Unknown names are logged and ignored; malformed values are rejected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "objective" => self.objective = Some(ObjectiveKind::from_str(value)?),
            "eta" | "learning_rate" => self.eta = parse_float(key, value)?,
            "max_depth" => self.max_depth = parse_count(key, value)?,
            "min_child_weight" => self.min_child_weight = parse_float(key, value)?,
            "lambda" | "reg_lambda" => self.lambda = parse_float(key, value)?,
            "alpha" | "reg_alpha" => self.alpha = parse_float(key, value)?,
            "gamma" | "min_split_loss" => self.gamma = parse_float(key, value)?,
            "max_delta_step" => self.max_delta_step = parse_float(key, value)?,
            "subsample" => self.subsample = parse_float(key, value)?,
            "colsample_bytree" => self.colsample_bytree = parse_float(key, value)?,
            "max_bin" => self.max_bin = parse_count(key, value)?,
            "base_score" => self.base_score = parse_float(key, value)?,
            "num_class" => self.num_class = parse_count(key, value)?,
            "eval_metric" => {
                let metric = value.trim().to_string();
                if !self.eval_metric.contains(&metric) {
                    self.eval_metric.push(metric);
                }
            }
            "seed" | "random_state" => self.seed = parse_count(key, value)? as u64,
            "nthread" | "n_jobs" => self.nthread = parse_count(key, value)?,
            "silent" => self.silent = parse_flag(key, value)?,
            "verbosity" => self.verbosity = parse_count(key, value)? as u32,
            "booster" => {
                if value != "gbtree" {
                    return Err(XGBoostError::invalid_parameter(
                        key,
                        value,
                        "only the gbtree booster is available",
                    ));
                }
            }
            "tree_method" => match value {
                "auto" | "exact" | "approx" | "hist" => {
                    log::debug!("tree_method={} uses histogram split finding", value)
                }
                _ => {
                    return Err(XGBoostError::invalid_parameter(
                        key,
                        value,
                        "must be one of auto, exact, approx, hist",
                    ))
                }
            },
            _ => log::warn!("Ignoring unknown parameter {}={}", key, value),
        }
        Ok(())
    }

    /// Resolved objective: explicit objective, else `multi:softmax` when
    /// `num_class > 1`, else squared error.
    pub fn objective_kind(&self) -> ObjectiveKind {
        match self.objective {
            Some(kind) => kind,
            None if self.num_class > 1 => ObjectiveKind::MultiSoftmax,
            None => ObjectiveKind::default(),
        }
    }

    /// Number of trees grown per boosting round.
    pub fn num_output_groups(&self) -> usize {
        if self.objective_kind().is_multiclass() {
            self.num_class.max(1)
        } else {
            1
        }
    }

    /// Effective message verbosity.
    pub fn verbosity_level(&self) -> Verbosity {
        if self.silent {
            Verbosity::Silent
        } else {
            Verbosity::from(self.verbosity)
        }
    }

    /// Validate the parameter values
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("eta", self.eta),
            ("lambda", self.lambda),
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("min_child_weight", self.min_child_weight),
            ("max_delta_step", self.max_delta_step),
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
            ("base_score", self.base_score),
        ] {
            if !value.is_finite() {
                return Err(XGBoostError::invalid_parameter(
                    name,
                    value.to_string(),
                    "must be finite",
                ));
            }
        }

        if self.eta < 0.0 {
            return Err(XGBoostError::invalid_parameter(
                "eta",
                self.eta.to_string(),
                "must be non-negative",
            ));
        }

        if self.lambda < 0.0 || self.alpha < 0.0 || self.gamma < 0.0 {
            return Err(XGBoostError::invalid_parameter(
                "lambda/alpha/gamma",
                format!("{}/{}/{}", self.lambda, self.alpha, self.gamma),
                "regularization terms must be non-negative",
            ));
        }

        if self.min_child_weight < 0.0 || self.max_delta_step < 0.0 {
            return Err(XGBoostError::invalid_parameter(
                "min_child_weight/max_delta_step",
                format!("{}/{}", self.min_child_weight, self.max_delta_step),
                "must be non-negative",
            ));
        }

        for (name, ratio) in [("subsample", self.subsample), ("colsample_bytree", self.colsample_bytree)] {
            if ratio <= 0.0 || ratio > 1.0 {
                return Err(XGBoostError::invalid_parameter(
                    name,
                    ratio.to_string(),
                    "must be in range (0.0, 1.0]",
                ));
            }
        }

        if self.max_bin < 2 {
            return Err(XGBoostError::invalid_parameter(
                "max_bin",
                self.max_bin.to_string(),
                "must be at least 2",
            ));
        }

        if self.objective_kind().is_multiclass() && self.num_class < 2 {
            return Err(XGBoostError::invalid_parameter(
                "num_class",
                self.num_class.to_string(),
                "multi-class objectives need num_class >= 2",
            ));
        }

        let kind = self.objective_kind();
        if matches!(kind, ObjectiveKind::BinaryLogistic | ObjectiveKind::RegLogistic)
            && !(self.base_score > 0.0 && self.base_score < 1.0)
        {
            return Err(XGBoostError::invalid_parameter(
                "base_score",
                self.base_score.to_string(),
                "must be in (0, 1) for logistic objectives",
            ));
        }

        Ok(())
    }

    /// Load parameters from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            XGBoostError::engine(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let value: Value = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => {
                let table: toml::Value = toml::from_str(&content).map_err(|e| {
                    XGBoostError::engine(format!("Failed to parse TOML config: {}", e))
                })?;
                serde_json::to_value(table)?
            }
            _ => {
                return Err(XGBoostError::engine(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        Self::from_json(&value)
    }

    /// Save parameters to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(&self.as_json())?,
            Some("toml") => toml::to_string_pretty(&self.as_json()).map_err(|e| {
                XGBoostError::serialization(format!("Failed to serialize to TOML: {}", e))
            })?,
            _ => {
                return Err(XGBoostError::engine(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load parameters from `XGBOOST_<NAME>` environment variables
    pub fn load_from_environment() -> Result<Self> {
        let mut params = Params::default();
        params.apply_environment_overrides()?;
        Ok(params)
    }

    /// Apply `XGBOOST_<NAME>` environment variables on top of these parameters
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        let mut overrides: Vec<(String, String)> = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix("XGBOOST_")
                    .map(|name| (name.to_ascii_lowercase(), value))
            })
            .collect();
        overrides.sort();

        for (key, value) in overrides {
            self.set(&key, &value)?;
        }
        self.validate()
    }

    /// Parameter dictionary in the engine's string schema.
    pub fn as_parameter_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("objective".to_string(), self.objective_kind().to_string());
        map.insert("eta".to_string(), self.eta.to_string());
        map.insert("max_depth".to_string(), self.max_depth.to_string());
        map.insert("min_child_weight".to_string(), self.min_child_weight.to_string());
        map.insert("lambda".to_string(), self.lambda.to_string());
        map.insert("alpha".to_string(), self.alpha.to_string());
        map.insert("gamma".to_string(), self.gamma.to_string());
        map.insert("max_delta_step".to_string(), self.max_delta_step.to_string());
        map.insert("subsample".to_string(), self.subsample.to_string());
        map.insert("colsample_bytree".to_string(), self.colsample_bytree.to_string());
        map.insert("max_bin".to_string(), self.max_bin.to_string());
        map.insert("base_score".to_string(), self.base_score.to_string());
        map.insert("num_class".to_string(), self.num_class.to_string());
        map.insert("seed".to_string(), self.seed.to_string());
        map.insert("nthread".to_string(), self.nthread.to_string());
        map.insert("silent".to_string(), u8::from(self.silent).to_string());
        map.insert("verbosity".to_string(), self.verbosity.to_string());
        if !self.eval_metric.is_empty() {
            map.insert("eval_metric".to_string(), self.eval_metric.join(","));
        }
        map
    }

    fn as_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (key, value) in self.as_parameter_map() {
            if key == "eval_metric" {
                object.insert(key, Value::from(self.eval_metric.clone()));
            } else {
                object.insert(key, Value::String(value));
            }
        }
        Value::Object(object)
    }
}

fn json_scalar(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        other => Err(XGBoostError::invalid_parameter(
            key,
            other.to_string(),
            "expected a string, number or boolean",
        )),
    }
}

/// Fluent builder for [`Params`]
#[derive(Debug, Clone)]
pub struct ParamsBuilder {
    params: Params,
    validation_errors: Vec<String>,
}

impl ParamsBuilder {
    /// Create a new builder with default parameters
    pub fn new() -> Self {
        ParamsBuilder {
            params: Params::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the objective
    pub fn objective(mut self, objective: ObjectiveKind) -> Self {
        self.params.objective = Some(objective);
        self
    }

    /// Set the learning rate
    pub fn eta(mut self, eta: f64) -> Self {
        if eta < 0.0 {
            self.validation_errors.push("eta must be non-negative".to_string());
        }
        self.params.eta = eta;
        self
    }

    /// Set the maximum tree depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.params.max_depth = depth;
        self
    }

    /// Set the minimum child hessian sum
    pub fn min_child_weight(mut self, weight: f64) -> Self {
        self.params.min_child_weight = weight;
        self
    }

    /// Set the L2 regularization term
    pub fn lambda(mut self, lambda: f64) -> Self {
        if lambda < 0.0 {
            self.validation_errors.push("lambda must be non-negative".to_string());
        }
        self.params.lambda = lambda;
        self
    }

    /// Set the L1 regularization term
    pub fn alpha(mut self, alpha: f64) -> Self {
        if alpha < 0.0 {
            self.validation_errors.push("alpha must be non-negative".to_string());
        }
        self.params.alpha = alpha;
        self
    }

    /// Set the minimum split loss
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.params.gamma = gamma;
        self
    }

    /// Set the row sampling ratio
    pub fn subsample(mut self, ratio: f64) -> Self {
        if ratio <= 0.0 || ratio > 1.0 {
            self.validation_errors
                .push("subsample must be in range (0.0, 1.0]".to_string());
        }
        self.params.subsample = ratio;
        self
    }

    /// Set the column sampling ratio
    pub fn colsample_bytree(mut self, ratio: f64) -> Self {
        if ratio <= 0.0 || ratio > 1.0 {
            self.validation_errors
                .push("colsample_bytree must be in range (0.0, 1.0]".to_string());
        }
        self.params.colsample_bytree = ratio;
        self
    }

    /// Set the number of histogram bins
    pub fn max_bin(mut self, max_bin: usize) -> Self {
        self.params.max_bin = max_bin;
        self
    }

    /// Set the number of classes
    pub fn num_class(mut self, num_class: usize) -> Self {
        self.params.num_class = num_class;
        self
    }

    /// Add an evaluation metric
    pub fn eval_metric<S: Into<String>>(mut self, metric: S) -> Self {
        self.params.eval_metric.push(metric.into());
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    /// Set the number of worker threads
    pub fn nthread(mut self, nthread: usize) -> Self {
        self.params.nthread = nthread;
        self
    }

    /// Suppress engine messages
    pub fn silent(mut self, silent: bool) -> Self {
        self.params.silent = silent;
        self
    }

    /// Build the parameter set
    pub fn build(self) -> Result<Params> {
        if !self.validation_errors.is_empty() {
            return Err(XGBoostError::invalid_parameter(
                "params",
                "builder",
                self.validation_errors.join(", "),
            ));
        }

        self.params.validate()?;
        Ok(self.params)
    }
}

impl Default for ParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
