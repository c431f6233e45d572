//! Training callbacks.
//!
//! Callbacks observe the boosting loop once per round through a
//! [`CallbackEnv`] and may ask it to stop. Three are provided:
//!
//! * [`RecordEvaluation`] collects every evaluation result into an
//!   [`EvaluationHistory`]
//! * [`EvaluationMonitor`] logs evaluation lines on the console target
//! * [`EarlyStopping`] stops once the monitored metric has not improved for a
//!   number of rounds

use crate::boosting::{format_evaluation, Booster, EvaluationEntry};
use crate::core::error::{Result, XGBoostError};
use crate::core::logging::CONSOLE_TARGET;
use crate::metrics::create_metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// State of the boosting loop after one round.
#[derive(Debug, Clone, Copy)]
pub struct CallbackEnv<'a> {
    /// Round that just finished
    pub iteration: usize,
    /// First round of this run
    pub begin_iteration: usize,
    /// One past the last round of this run
    pub end_iteration: usize,
    /// Watchlist results of this round, in watchlist then metric order
    pub evaluation: &'a [EvaluationEntry],
    /// Standard deviation of each result across folds, set by cross-validation
    pub stdv: Option<&'a [f64]>,
}

/// Hooks into the boosting loop.
///
/// Cross-validation calls only [`TrainingCallback::after_iteration`], with
/// fold-averaged results.
pub trait TrainingCallback {
    /// Called once before the first round.
    fn before_training(&mut self, _booster: &mut Booster) -> Result<()> {
        Ok(())
    }

    /// Called after every round; returning `true` stops training.
    fn after_iteration(&mut self, env: &CallbackEnv<'_>) -> Result<bool>;

    /// Called once after the last round.
    fn after_training(&mut self, _booster: &mut Booster) -> Result<()> {
        Ok(())
    }
}

/// Evaluation results per dataset name, then per metric name, one value per round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationHistory {
    results: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

impl EvaluationHistory {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one round of results.
    pub fn record(&mut self, entries: &[EvaluationEntry]) {
        for entry in entries {
            self.results
                .entry(entry.data.clone())
                .or_default()
                .entry(entry.metric.clone())
                .or_default()
                .push(entry.value);
        }
    }

    /// Values of `metric` on dataset `data`, one per round.
    pub fn get(&self, data: &str, metric: &str) -> Option<&[f64]> {
        self.results
            .get(data)
            .and_then(|metrics| metrics.get(metric))
            .map(Vec::as_slice)
    }

    /// All metrics recorded for dataset `data`.
    pub fn dataset(&self, data: &str) -> Option<&BTreeMap<String, Vec<f64>>> {
        self.results.get(data)
    }

    /// Dataset names
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Forget every result.
    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Keep only the first `num_rounds` values of every series.
    pub fn truncate(&mut self, num_rounds: usize) {
        for series in self.results.values_mut().flat_map(|metrics| metrics.values_mut()) {
            series.truncate(num_rounds);
        }
    }

    /// The underlying nested map
    pub fn as_map(&self) -> &BTreeMap<String, BTreeMap<String, Vec<f64>>> {
        &self.results
    }
}

/// Records every evaluation result.
#[derive(Debug, Clone, Default)]
pub struct RecordEvaluation {
    history: EvaluationHistory,
}

impl RecordEvaluation {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Results recorded so far
    pub fn history(&self) -> &EvaluationHistory {
        &self.history
    }

    /// Take the recorded results
    pub fn into_history(self) -> EvaluationHistory {
        self.history
    }
}

impl TrainingCallback for RecordEvaluation {
    fn before_training(&mut self, _booster: &mut Booster) -> Result<()> {
        self.history.clear();
        Ok(())
    }

    fn after_iteration(&mut self, env: &CallbackEnv<'_>) -> Result<bool> {
        self.history.record(env.evaluation);
        Ok(false)
    }
}

/// Logs an evaluation line every `period` rounds and after the last round.
#[derive(Debug, Clone)]
pub struct EvaluationMonitor {
    period: usize,
    show_stdv: bool,
}

impl EvaluationMonitor {
    /// Log every `period` rounds; a period of 0 is treated as 1.
    pub fn new(period: usize) -> Self {
        EvaluationMonitor {
            period: period.max(1),
            show_stdv: true,
        }
    }

    /// Whether cross-validation lines include `+stdv`.
    pub fn with_stdv(mut self, show_stdv: bool) -> Self {
        self.show_stdv = show_stdv;
        self
    }

    fn format(&self, env: &CallbackEnv<'_>) -> String {
        match env.stdv.filter(|_| self.show_stdv) {
            Some(stdv) => {
                let mut line = format!("[{}]", env.iteration);
                for (entry, std) in env.evaluation.iter().zip(stdv) {
                    let _ = write!(
                        line,
                        "\t{}-{}:{:.6}+{:.6}",
                        entry.data, entry.metric, entry.value, std
                    );
                }
                line
            }
            None => format_evaluation(env.iteration, env.evaluation),
        }
    }
}

impl Default for EvaluationMonitor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TrainingCallback for EvaluationMonitor {
    fn after_iteration(&mut self, env: &CallbackEnv<'_>) -> Result<bool> {
        if env.evaluation.is_empty() {
            return Ok(false);
        }
        let is_last = env.iteration + 1 == env.end_iteration;
        if (env.iteration - env.begin_iteration) % self.period == 0 || is_last {
            log::info!(target: CONSOLE_TARGET, "{}", self.format(env));
        }
        Ok(false)
    }
}

/// Stops training when the last metric on the last watchlist entry has not
/// improved for `rounds` consecutive rounds.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    rounds: usize,
    maximize: Option<bool>,
    best_score: Option<f64>,
    best_iteration: usize,
}

impl EarlyStopping {
    /// Stop after `rounds` rounds without improvement. Whether higher is
    /// better is taken from the monitored metric.
    pub fn new(rounds: usize) -> Self {
        EarlyStopping {
            rounds,
            maximize: None,
            best_score: None,
            best_iteration: 0,
        }
    }

    /// Force the improvement direction.
    pub fn with_maximize(mut self, maximize: bool) -> Self {
        self.maximize = Some(maximize);
        self
    }

    /// Best value seen so far
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Round of the best value
    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    /// Feed the monitored value of `iteration`; true once training should stop.
    pub fn update(&mut self, iteration: usize, value: f64, maximize: bool) -> bool {
        let improved = match self.best_score {
            None => true,
            Some(best) if maximize => value > best,
            Some(best) => value < best,
        };
        if improved {
            self.best_score = Some(value);
            self.best_iteration = iteration;
        }
        iteration - self.best_iteration >= self.rounds
    }
}

impl TrainingCallback for EarlyStopping {
    fn before_training(&mut self, _booster: &mut Booster) -> Result<()> {
        self.best_score = None;
        self.best_iteration = 0;
        Ok(())
    }

    fn after_iteration(&mut self, env: &CallbackEnv<'_>) -> Result<bool> {
        let entry = env.evaluation.last().ok_or_else(|| {
            XGBoostError::training("early stopping requires at least one watchlist entry")
        })?;
        let maximize = match self.maximize {
            Some(maximize) => maximize,
            None => {
                let maximize = create_metric(&entry.metric)?.higher_is_better();
                self.maximize = Some(maximize);
                maximize
            }
        };

        let stop = self.update(env.iteration, entry.value, maximize);
        if stop {
            log::info!(
                target: CONSOLE_TARGET,
                "Stopping. Best iteration: [{}] {}-{}:{:.6}",
                self.best_iteration,
                entry.data,
                entry.metric,
                self.best_score.unwrap_or(entry.value)
            );
        }
        Ok(stop)
    }

    fn after_training(&mut self, booster: &mut Booster) -> Result<()> {
        if let Some(score) = self.best_score {
            booster.set_best(self.best_iteration, score);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(data: &str, metric: &str, value: f64) -> EvaluationEntry {
        EvaluationEntry {
            data: data.to_string(),
            metric: metric.to_string(),
            value,
        }
    }

    fn env(iteration: usize, evaluation: &[EvaluationEntry]) -> CallbackEnv<'_> {
        CallbackEnv {
            iteration,
            begin_iteration: 0,
            end_iteration: 100,
            evaluation,
            stdv: None,
        }
    }

    #[test]
    fn test_history_records_rounds() {
        let mut record = RecordEvaluation::new();
        for (i, value) in [0.5, 0.25].into_iter().enumerate() {
            let round = [entry("train", "error", value), entry("eval", "error", value + 0.1)];
            assert!(!record.after_iteration(&env(i, &round)).unwrap());
        }
        let history = record.into_history();
        assert_eq!(history.get("train", "error"), Some(&[0.5, 0.25][..]));
        assert_eq!(history.get("eval", "error").map(|v| v.len()), Some(2));
        assert_eq!(history.datasets().collect::<Vec<_>>(), vec!["eval", "train"]);
        assert!(history.get("train", "auc").is_none());
    }

    #[test]
    fn test_early_stopping_lower_is_better() {
        let mut early = EarlyStopping::new(2);
        let values = [0.5, 0.4, 0.45, 0.41];
        let mut stopped_at = None;
        for (i, &value) in values.iter().enumerate() {
            let round = [entry("eval", "rmse", value)];
            if early.after_iteration(&env(i, &round)).unwrap() {
                stopped_at = Some(i);
                break;
            }
        }
        assert_eq!(stopped_at, Some(3));
        assert_eq!(early.best_iteration(), 1);
        assert_eq!(early.best_score(), Some(0.4));
    }

    #[test]
    fn test_early_stopping_infers_direction() {
        let mut early = EarlyStopping::new(1);
        assert!(!early.after_iteration(&env(0, &[entry("eval", "auc", 0.7)])).unwrap());
        assert!(!early.after_iteration(&env(1, &[entry("eval", "auc", 0.8)])).unwrap());
        assert!(early.after_iteration(&env(2, &[entry("eval", "auc", 0.75)])).unwrap());
        assert_eq!(early.best_iteration(), 1);

        assert!(EarlyStopping::new(1).after_iteration(&env(0, &[])).is_err());
    }

    #[test]
    fn test_monitor_formats_stdv() {
        let evaluation = [entry("train", "error", 0.5), entry("test", "error", 0.25)];
        let stdv = [0.1, 0.05];
        let cv_env = CallbackEnv {
            stdv: Some(&stdv),
            ..env(2, &evaluation)
        };
        let monitor = EvaluationMonitor::default();
        assert_eq!(
            monitor.format(&cv_env),
            "[2]\ttrain-error:0.500000+0.100000\ttest-error:0.250000+0.050000"
        );
        assert_eq!(
            monitor.with_stdv(false).format(&cv_env),
            "[2]\ttrain-error:0.500000\ttest-error:0.250000"
        );
    }
}
