//! The boosting loop.

use crate::boosting::{Booster, EvaluationEntry};
use crate::config::Params;
use crate::core::error::Result;
use crate::core::logging::Verbosity;
use crate::dataset::DMatrix;
use crate::training::callback::{
    CallbackEnv, EarlyStopping, EvaluationHistory, EvaluationMonitor, TrainingCallback,
};
use crate::training::session::{thread_pool, TrainingSession};
use std::fmt;

/// Options of [`train_with`].
pub struct TrainOptions<'a> {
    /// Number of boosting rounds
    pub num_boost_round: usize,
    /// Watchlist: datasets evaluated after every round, with their names
    pub evals: Vec<(&'a DMatrix, &'a str)>,
    /// Sink receiving every evaluation result
    pub evals_result: Option<&'a mut EvaluationHistory>,
    /// Caller callbacks, invoked in order
    pub callbacks: Vec<&'a mut dyn TrainingCallback>,
    /// Stop when the last watchlist metric has not improved for this many rounds
    pub early_stopping_rounds: Option<usize>,
    /// Log an evaluation line every this many rounds (0 = never)
    pub verbose_eval: usize,
}

impl<'a> TrainOptions<'a> {
    /// `num_boost_round` rounds, no watchlist, evaluation logged every round
    pub fn new(num_boost_round: usize) -> Self {
        TrainOptions {
            num_boost_round,
            evals: Vec::new(),
            evals_result: None,
            callbacks: Vec::new(),
            early_stopping_rounds: None,
            verbose_eval: 1,
        }
    }

    /// Set the watchlist
    pub fn evals(mut self, evals: &[(&'a DMatrix, &'a str)]) -> Self {
        self.evals = evals.to_vec();
        self
    }

    /// Record every evaluation result into `history`
    pub fn evals_result(mut self, history: &'a mut EvaluationHistory) -> Self {
        self.evals_result = Some(history);
        self
    }

    /// Add a callback
    pub fn callback(mut self, callback: &'a mut dyn TrainingCallback) -> Self {
        self.callbacks.push(callback);
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
}

impl fmt::Debug for TrainOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainOptions")
            .field("num_boost_round", &self.num_boost_round)
            .field(
                "evals",
                &self.evals.iter().map(|(_, name)| *name).collect::<Vec<_>>(),
            )
            .field("evals_result", &self.evals_result.is_some())
            .field("callbacks", &self.callbacks.len())
            .field("early_stopping_rounds", &self.early_stopping_rounds)
            .field("verbose_eval", &self.verbose_eval)
            .finish()
    }
}

/// Caller callbacks followed by the ones enabled through options.
pub(crate) struct CallbackList<'a> {
    user: Vec<&'a mut dyn TrainingCallback>,
    builtin: Vec<Box<dyn TrainingCallback>>,
}

impl<'a> CallbackList<'a> {
    pub(crate) fn new(user: Vec<&'a mut dyn TrainingCallback>) -> Self {
        CallbackList {
            user,
            builtin: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, callback: Box<dyn TrainingCallback>) {
        self.builtin.push(callback);
    }

    pub(crate) fn before_training(&mut self, booster: &mut Booster) -> Result<()> {
        for callback in self.user.iter_mut() {
            callback.before_training(booster)?;
        }
        for callback in self.builtin.iter_mut() {
            callback.before_training(booster)?;
        }
        Ok(())
    }

    /// Every callback sees the round even when an earlier one asks to stop.
    pub(crate) fn after_iteration(&mut self, env: &CallbackEnv<'_>) -> Result<bool> {
        let mut stop = false;
        for callback in self.user.iter_mut() {
            stop |= callback.after_iteration(env)?;
        }
        for callback in self.builtin.iter_mut() {
            stop |= callback.after_iteration(env)?;
        }
        Ok(stop)
    }

    pub(crate) fn after_training(&mut self, booster: &mut Booster) -> Result<()> {
        for callback in self.user.iter_mut() {
            callback.after_training(booster)?;
        }
        for callback in self.builtin.iter_mut() {
            callback.after_training(booster)?;
        }
        Ok(())
    }
}

/// Train a booster for `num_boost_round` rounds, reporting on `evals`.
///
/// ```
/// use ndarray::array;
/// use xgboost_rust::{train, DMatrix, Params};
///
/// let dtrain = DMatrix::builder()
///     .data(array![[0.0f32], [1.0], [2.0], [3.0]])
///     .label(vec![0.0f32, 0.0, 1.0, 1.0])
///     .build()
///     .unwrap();
/// let params = Params::from_pairs([("objective", "binary:logistic"), ("max_depth", "1")]).unwrap();
/// let booster = train(&params, &dtrain, 2, &[(&dtrain, "train")]).unwrap();
/// assert_eq!(booster.num_trees(), 2);
/// ```
pub fn train(
    params: &Params,
    dtrain: &DMatrix,
    num_boost_round: usize,
    evals: &[(&DMatrix, &str)],
) -> Result<Booster> {
    train_with(params, dtrain, TrainOptions::new(num_boost_round).evals(evals))
}

/// Train a booster with full control over the loop.
pub fn train_with(params: &Params, dtrain: &DMatrix, options: TrainOptions<'_>) -> Result<Booster> {
    let TrainOptions {
        num_boost_round,
        evals,
        mut evals_result,
        callbacks,
        early_stopping_rounds,
        verbose_eval,
    } = options;

    let mut booster = Booster::new(params.clone(), dtrain)?;
    let mut session = TrainingSession::new(&booster, dtrain, &evals)?
        .with_thread_pool(thread_pool(params.nthread)?);

    let mut callbacks = CallbackList::new(callbacks);
    if verbose_eval > 0 && params.verbosity_level() > Verbosity::Silent {
        callbacks.push(Box::new(EvaluationMonitor::new(verbose_eval)));
    }
    if let Some(rounds) = early_stopping_rounds {
        callbacks.push(Box::new(EarlyStopping::new(rounds)));
    }
    if let Some(history) = evals_result.as_deref_mut() {
        history.clear();
    }

    log::debug!(
        "Training {} rounds of {} on {} rows",
        num_boost_round,
        booster.objective().name(),
        dtrain.num_row()
    );

    callbacks.before_training(&mut booster)?;
    for iteration in 0..num_boost_round {
        session.update(&mut booster)?;

        let evaluation: Vec<EvaluationEntry> = if evals.is_empty() {
            Vec::new()
        } else {
            session.evaluate(&booster)?
        };
        if let Some(history) = evals_result.as_deref_mut() {
            history.record(&evaluation);
        }

        let env = CallbackEnv {
            iteration,
            begin_iteration: 0,
            end_iteration: num_boost_round,
            evaluation: &evaluation,
            stdv: None,
        };
        if callbacks.after_iteration(&env)? {
            log::debug!("Training stopped after round {}", iteration);
            break;
        }
    }
    callbacks.after_training(&mut booster)?;

    let stats = booster.model().statistics();
    log::debug!(
        "Trained {} trees with {} leaves in total, max depth {}",
        stats.num_trees,
        stats.total_leaves,
        stats.max_depth
    );
    Ok(booster)
}
