//! Cross-validation.
//!
//! The dataset is split into `nfold` folds. Every fold trains its own booster
//! on the remaining rows and reports on a `train` and a `test` watchlist entry.
//! The boosters advance in lock-step, one round at a time in parallel, so
//! callbacks and early stopping see fold-averaged results after every round.

use crate::boosting::{Booster, EvaluationEntry};
use crate::config::Params;
use crate::core::error::{Result, XGBoostError};
use crate::core::logging::{Verbosity, TRACKER_TARGET};
use crate::dataset::DMatrix;
use crate::training::callback::{CallbackEnv, EarlyStopping, EvaluationMonitor, TrainingCallback};
use crate::training::session::{thread_pool, TrainingSession};
use crate::training::train::CallbackList;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Options of [`cv_with`].
pub struct CvOptions<'a> {
    /// Number of boosting rounds
    pub num_boost_round: usize,
    /// Number of folds
    pub nfold: usize,
    /// Seed of the fold permutation
    pub seed: u64,
    /// Permute rows before splitting
    pub shuffle: bool,
    /// Keep the class proportions of every fold close to the whole dataset
    pub stratified: bool,
    /// Metrics to report; empty keeps the booster's `eval_metric`
    pub metrics: Vec<String>,
    /// Stop when the mean test metric has not improved for this many rounds
    pub early_stopping_rounds: Option<usize>,
    /// Log an aggregated evaluation line every this many rounds (0 = never)
    pub verbose_eval: usize,
    /// Caller callbacks; only `after_iteration` is invoked
    pub callbacks: Vec<&'a mut dyn TrainingCallback>,
}

impl<'a> CvOptions<'a> {
    /// `nfold` folds of `num_boost_round` rounds with shuffling and seed 0
    pub fn new(num_boost_round: usize, nfold: usize) -> Self {
        CvOptions {
            num_boost_round,
            nfold,
            seed: 0,
            shuffle: true,
            stratified: false,
            metrics: Vec::new(),
            early_stopping_rounds: None,
            verbose_eval: 0,
            callbacks: Vec::new(),
        }
    }

    /// Set the permutation seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable row permutation
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Enable or disable stratified folds
    pub fn stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    /// Add a reported metric
    pub fn metric<S: Into<String>>(mut self, metric: S) -> Self {
        self.metrics.push(metric.into());
        self
    }

    /// Enable early stopping
    pub fn early_stopping_rounds(mut self, rounds: usize) -> Self {
        self.early_stopping_rounds = Some(rounds);
        self
    }

    /// Evaluation logging period (0 disables)
    pub fn verbose_eval(mut self, period: usize) -> Self {
        self.verbose_eval = period;
        self
    }

    /// Add a callback
    pub fn callback(mut self, callback: &'a mut dyn TrainingCallback) -> Self {
        self.callbacks.push(callback);
        self
    }
}

impl fmt::Debug for CvOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CvOptions")
            .field("num_boost_round", &self.num_boost_round)
            .field("nfold", &self.nfold)
            .field("seed", &self.seed)
            .field("shuffle", &self.shuffle)
            .field("stratified", &self.stratified)
            .field("metrics", &self.metrics)
            .field("early_stopping_rounds", &self.early_stopping_rounds)
            .field("verbose_eval", &self.verbose_eval)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Aggregated cross-validation results.
///
/// Series are named `{data}-{metric}-mean` and `{data}-{metric}-std`, e.g.
/// `test-error-mean`, and hold one value per completed round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvResult {
    series: BTreeMap<String, Vec<f64>>,
    best_iteration: Option<usize>,
}

impl CvResult {
    /// Number of rounds kept
    pub fn num_rounds(&self) -> usize {
        self.series.values().map(Vec::len).next().unwrap_or(0)
    }

    /// Values of one series
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Number of series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether no series were produced
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Series names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Best round found by early stopping
    pub fn best_iteration(&self) -> Option<usize> {
        self.best_iteration
    }

    /// The underlying map
    pub fn as_map(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.series
    }

    fn record(&mut self, mean: &[EvaluationEntry], stdv: &[f64]) {
        for (entry, std) in mean.iter().zip(stdv) {
            let prefix = format!("{}-{}", entry.data, entry.metric);
            self.series
                .entry(format!("{}-mean", prefix))
                .or_default()
                .push(entry.value);
            self.series
                .entry(format!("{}-std", prefix))
                .or_default()
                .push(*std);
        }
    }

    fn truncate(&mut self, num_rounds: usize) {
        for values in self.series.values_mut() {
            values.truncate(num_rounds);
        }
    }
}

/// Row indices of the test part of every fold, each sorted ascending.
pub(crate) fn make_folds(
    labels: &[f32],
    num_rows: usize,
    nfold: usize,
    seed: u64,
    shuffle: bool,
    stratified: bool,
) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); nfold];

    if stratified {
        let mut order: Vec<usize> = (0..num_rows).collect();
        order.sort_by(|&a, &b| labels[a].total_cmp(&labels[b]).then(a.cmp(&b)));

        let mut dealt = 0;
        let mut start = 0;
        while start < order.len() {
            let class = labels[order[start]];
            let end = start
                + order[start..]
                    .iter()
                    .take_while(|&&row| labels[row].total_cmp(&class).is_eq())
                    .count();
            let members = &mut order[start..end];
            if shuffle {
                members.shuffle(&mut rng);
            }
            for &row in members.iter() {
                folds[dealt % nfold].push(row);
                dealt += 1;
            }
            start = end;
        }
    } else {
        let mut order: Vec<usize> = (0..num_rows).collect();
        if shuffle {
            order.shuffle(&mut rng);
        }
        let base = num_rows / nfold;
        let extra = num_rows % nfold;
        let mut rows = order.into_iter();
        for (i, fold) in folds.iter_mut().enumerate() {
            let size = base + usize::from(i < extra);
            fold.extend(rows.by_ref().take(size));
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    folds
}

struct CvFold<'a> {
    booster: Booster,
    session: TrainingSession<'a>,
}

impl CvFold<'_> {
    fn update(&mut self) -> Result<Vec<EvaluationEntry>> {
        self.session.update(&mut self.booster)?;
        self.session.evaluate(&self.booster)
    }
}

/// Fold-averaged results and the population standard deviation of each.
fn aggregate(results: &[Vec<EvaluationEntry>]) -> (Vec<EvaluationEntry>, Vec<f64>) {
    let Some(first) = results.first() else {
        return (Vec::new(), Vec::new());
    };
    let count = results.len() as f64;
    let mut mean = Vec::with_capacity(first.len());
    let mut stdv = Vec::with_capacity(first.len());
    for (i, entry) in first.iter().enumerate() {
        let values: Vec<f64> = results.iter().map(|fold| fold[i].value).collect();
        let m = values.iter().sum::<f64>() / count;
        let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / count;
        mean.push(EvaluationEntry {
            data: entry.data.clone(),
            metric: entry.metric.clone(),
            value: m,
        });
        stdv.push(var.sqrt());
    }
    (mean, stdv)
}

/// Cross-validate `params` on `dtrain` with `nfold` shuffled folds.
pub fn cv(params: &Params, dtrain: &DMatrix, num_boost_round: usize, nfold: usize) -> Result<CvResult> {
    cv_with(params, dtrain, CvOptions::new(num_boost_round, nfold))
}

/// Cross-validate with full control over fold construction and the loop.
pub fn cv_with(params: &Params, dtrain: &DMatrix, options: CvOptions<'_>) -> Result<CvResult> {
    let CvOptions {
        num_boost_round,
        nfold,
        seed,
        shuffle,
        stratified,
        metrics,
        early_stopping_rounds,
        verbose_eval,
        callbacks,
    } = options;

    let num_rows = dtrain.num_row();
    if nfold < 2 || nfold > num_rows {
        return Err(XGBoostError::invalid_parameter(
            "nfold",
            nfold.to_string(),
            format!("must be between 2 and the number of rows ({})", num_rows),
        ));
    }
    if !dtrain.has_label() {
        return Err(XGBoostError::training("cross-validation data has no labels"));
    }

    let mut params = params.clone();
    if !metrics.is_empty() {
        params.eval_metric = metrics;
    }
    params.validate()?;
    let verbosity = params.verbosity_level();

    let labels = dtrain.get_label().to_vec();
    let folds = make_folds(&labels, num_rows, nfold, seed, shuffle, stratified);
    let mut fold_data = Vec::with_capacity(nfold);
    for test_rows in &folds {
        let mut in_test = vec![false; num_rows];
        for &row in test_rows {
            in_test[row] = true;
        }
        let train_rows: Vec<usize> = (0..num_rows).filter(|&row| !in_test[row]).collect();
        fold_data.push((dtrain.slice(&train_rows)?, dtrain.slice(test_rows)?));
    }

    let mut cv_folds = Vec::with_capacity(nfold);
    for (train, test) in &fold_data {
        let booster = Booster::new(params.clone(), train)?;
        let session = TrainingSession::new(&booster, train, &[(train, "train"), (test, "test")])?;
        cv_folds.push(CvFold { booster, session });
    }

    if verbosity >= Verbosity::Info {
        log::info!(
            target: TRACKER_TARGET,
            "Cross-validation started: {} folds, {} rows, {} rounds",
            nfold,
            num_rows,
            num_boost_round
        );
    }

    let mut callbacks = CallbackList::new(callbacks);
    if verbose_eval > 0 && verbosity > Verbosity::Silent {
        callbacks.push(Box::new(EvaluationMonitor::new(verbose_eval)));
    }
    let mut early_stopping = early_stopping_rounds.map(EarlyStopping::new);

    let pool = thread_pool(params.nthread)?;
    let mut result = CvResult::default();
    for iteration in 0..num_boost_round {
        let results = pool.install(|| {
            cv_folds
                .par_iter_mut()
                .map(CvFold::update)
                .collect::<Result<Vec<_>>>()
        })?;
        let (mean, stdv) = aggregate(&results);
        result.record(&mean, &stdv);

        let env = CallbackEnv {
            iteration,
            begin_iteration: 0,
            end_iteration: num_boost_round,
            evaluation: &mean,
            stdv: Some(&stdv),
        };
        let mut stop = callbacks.after_iteration(&env)?;
        if let Some(early) = early_stopping.as_mut() {
            if early.after_iteration(&env)? {
                let best = early.best_iteration();
                result.truncate(best + 1);
                result.best_iteration = Some(best);
                stop = true;
            }
        }
        if stop {
            break;
        }
    }

    if verbosity >= Verbosity::Info {
        log::info!(
            target: TRACKER_TARGET,
            "Cross-validation finished after {} rounds",
            result.num_rounds()
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn data(num_rows: usize) -> DMatrix {
        let features = Array2::from_shape_fn((num_rows, 2), |(i, j)| ((i * 7 + j * 3) % 11) as f32);
        let labels: Vec<f32> = (0..num_rows).map(|i| if (i * 7) % 11 > 5 { 1.0 } else { 0.0 }).collect();
        DMatrix::builder().data(features).label(labels).build().unwrap()
    }

    #[test]
    fn test_folds_partition_rows() {
        let labels = vec![0.0f32; 23];
        let folds = make_folds(&labels, 23, 5, 7, true, false);
        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);

        let mut all: Vec<usize> = folds.concat();
        all.sort_unstable();
        assert_eq!(all, (0..23).collect::<Vec<_>>());
        assert!(folds.iter().all(|fold| fold.windows(2).all(|w| w[0] < w[1])));
    }

    #[test]
    fn test_unshuffled_folds_are_contiguous() {
        let labels = vec![0.0f32; 6];
        let folds = make_folds(&labels, 6, 3, 0, false, false);
        assert_eq!(folds, vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_stratified_folds_balance_classes() {
        let labels: Vec<f32> = (0..30).map(|i| if i < 10 { 1.0 } else { 0.0 }).collect();
        let folds = make_folds(&labels, 30, 5, 3, true, true);
        for fold in &folds {
            assert_eq!(fold.len(), 6);
            assert_eq!(fold.iter().filter(|&&row| labels[row] == 1.0).count(), 2);
        }
    }

    #[test]
    fn test_population_std() {
        let entry = |value| EvaluationEntry {
            data: "test".to_string(),
            metric: "rmse".to_string(),
            value,
        };
        let (mean, stdv) = aggregate(&[vec![entry(1.0)], vec![entry(3.0)]]);
        assert_eq!(mean[0].value, 2.0);
        assert_eq!(stdv, vec![1.0]);
    }

    #[test]
    fn test_four_series_for_one_metric() {
        let dtrain = data(100);
        let params = Params::from_pairs([("objective", "binary:logistic"), ("max_depth", "2")]).unwrap();
        let result = cv(&params, &dtrain, 3, 10).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(
            result.names().collect::<Vec<_>>(),
            vec!["test-error-mean", "test-error-std", "train-error-mean", "train-error-std"]
        );
        assert_eq!(result.num_rounds(), 3);
        assert!(result.series("test-error-std").unwrap().iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn test_same_seed_same_result() {
        let dtrain = data(60);
        let params = Params::from_pairs([("objective", "binary:logistic"), ("subsample", "0.8")]).unwrap();
        let options = || CvOptions::new(3, 4).seed(11).metric("logloss").metric("auc");
        let a = cv_with(&params, &dtrain, options()).unwrap();
        let b = cv_with(&params, &dtrain, options()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn test_early_stopping_truncates() {
        let dtrain = data(50);
        let params = Params::from_pairs([("objective", "binary:logistic"), ("eta", "1")]).unwrap();
        let result = cv_with(&params, &dtrain, CvOptions::new(40, 5).early_stopping_rounds(2)).unwrap();
        match result.best_iteration() {
            Some(best) => assert_eq!(result.num_rounds(), best + 1),
            None => assert_eq!(result.num_rounds(), 40),
        }
    }

    #[test]
    fn test_invalid_fold_count() {
        let dtrain = data(5);
        let params = Params::default();
        for nfold in [0, 1, 6] {
            let err = cv(&params, &dtrain, 1, nfold).unwrap_err();
            assert!(matches!(err, XGBoostError::InvalidParameter { .. }));
        }
    }
}
