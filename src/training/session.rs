//! State carried across boosting rounds.
//!
//! A [`TrainingSession`] owns everything a round needs that is derived from the
//! training data: the quantized feature matrix, the row and column sampler, and
//! margin caches for the training set and every watchlist entry. The caches are
//! advanced by the trees of each new round instead of re-predicting from
//! scratch, and accumulate in the same order as [`Predictor`] so they agree
//! with a fresh prediction exactly.

use crate::boosting::{Booster, EvaluationEntry};
use crate::core::error::{Result, XGBoostError};
use crate::core::resolve_num_threads;
use crate::core::traits::Metric;
use crate::core::types::Score;
use crate::dataset::{BinnedMatrix, DMatrix};
use crate::prediction::Predictor;
use crate::tree::{Sampler, SamplingConfig, SerialTreeLearner, SerialTreeLearnerConfig};
use ndarray::Array2;
use rayon::ThreadPool;
use std::sync::Arc;

/// Worker pool of `nthread` threads, or one per core when `nthread` is 0.
pub fn thread_pool(nthread: usize) -> Result<Arc<ThreadPool>> {
    let num_threads = resolve_num_threads(nthread);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| XGBoostError::engine(format!("failed to create thread pool: {}", e)))?;
    log::debug!("Using {} worker threads", num_threads);
    Ok(Arc::new(pool))
}

#[derive(Debug)]
struct EvalCache<'a> {
    data: &'a DMatrix,
    name: String,
    margins: Array2<f64>,
}

/// Boosting state for one booster and one training set.
#[derive(Debug)]
pub struct TrainingSession<'a> {
    dtrain: &'a DMatrix,
    binned: BinnedMatrix,
    learner: SerialTreeLearner,
    sampler: Sampler,
    train_margins: Array2<f64>,
    evals: Vec<EvalCache<'a>>,
    metrics: Vec<Box<dyn Metric>>,
    pool: Option<Arc<ThreadPool>>,
}

impl<'a> TrainingSession<'a> {
    /// Prepare to boost `booster` on `dtrain`, reporting on `evals`.
    pub fn new(
        booster: &Booster,
        dtrain: &'a DMatrix,
        evals: &[(&'a DMatrix, &str)],
    ) -> Result<Self> {
        if dtrain.num_row() == 0 {
            return Err(XGBoostError::training("training data has no rows"));
        }
        if !dtrain.has_label() {
            return Err(XGBoostError::training("training data has no labels"));
        }
        booster.validate_features(dtrain)?;
        booster.objective().validate_labels(&dtrain.get_label())?;

        let params = booster.params();
        let predictor = Predictor::new(booster.model());
        let num_trees = booster.model().num_trees();

        let mut train_margins =
            predictor.initial_margins(dtrain.num_row(), &dtrain.get_base_margin())?;
        predictor.accumulate(&dtrain.features(), &mut train_margins, 0, num_trees);

        let mut caches = Vec::with_capacity(evals.len());
        for &(data, name) in evals {
            booster.validate_features(data)?;
            let mut margins = predictor.initial_margins(data.num_row(), &data.get_base_margin())?;
            predictor.accumulate(&data.features(), &mut margins, 0, num_trees);
            caches.push(EvalCache {
                data,
                name: name.to_string(),
                margins,
            });
        }

        let binned = BinnedMatrix::from_dmatrix(dtrain, params.max_bin);
        log::debug!(
            "Training session: {} rows, {} features, {} watchlist entries",
            dtrain.num_row(),
            binned.num_features(),
            caches.len()
        );

        Ok(TrainingSession {
            dtrain,
            binned,
            learner: SerialTreeLearner::new(SerialTreeLearnerConfig::from(params)),
            sampler: Sampler::new(SamplingConfig::from(params)),
            train_margins,
            evals: caches,
            metrics: booster.eval_metrics()?,
            pool: None,
        })
    }

    /// Run rounds on `pool` instead of the current rayon pool.
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Run one boosting round: one new tree per output group.
    pub fn update(&mut self, booster: &mut Booster) -> Result<()> {
        match self.pool.clone() {
            Some(pool) => pool.install(|| self.boost_round(booster)),
            None => self.boost_round(booster),
        }
    }

    fn boost_round(&mut self, booster: &mut Booster) -> Result<()> {
        let num_rows = self.dtrain.num_row();
        let groups = booster.model().num_output_group();
        let margins = self.train_margins.mapv(|m| m as Score);
        let mut gradients = Array2::<Score>::zeros((num_rows, groups));
        let mut hessians = Array2::<Score>::zeros((num_rows, groups));
        let weights = self.dtrain.weights();
        booster.objective().compute_gradients(
            &margins.view(),
            &self.dtrain.get_label(),
            weights.as_ref(),
            &mut gradients.view_mut(),
            &mut hessians.view_mut(),
        )?;

        let mut trees = Vec::with_capacity(groups);
        for group in 0..groups {
            let rows = self.sampler.sample_rows(num_rows);
            let features = self.sampler.sample_features(self.binned.num_features());
            let g = gradients.column(group).to_vec();
            let h = hessians.column(group).to_vec();
            let tree = self
                .learner
                .train(&self.binned, &g, &h, rows, &features)
                .map_err(|e| XGBoostError::training(e.to_string()))?;
            trees.push(tree);
        }

        let begin = booster.model().num_trees();
        booster
            .model_mut()
            .add_iteration_trees(trees)
            .map_err(|e| XGBoostError::training(e.to_string()))?;
        let end = booster.model().num_trees();

        let predictor = Predictor::new(booster.model());
        predictor.accumulate(&self.dtrain.features(), &mut self.train_margins, begin, end);
        for cache in &mut self.evals {
            predictor.accumulate(&cache.data.features(), &mut cache.margins, begin, end);
        }
        Ok(())
    }

    /// Metric values on every watchlist entry from the cached margins.
    pub fn evaluate(&self, booster: &Booster) -> Result<Vec<EvaluationEntry>> {
        let mut entries = Vec::with_capacity(self.evals.len() * self.metrics.len());
        for cache in &self.evals {
            let margins = cache.margins.mapv(|m| m as Score);
            entries.extend(booster.evaluate_margins(
                &self.metrics,
                margins,
                cache.data,
                &cache.name,
            )?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Params;
    use ndarray::array;

    fn data() -> DMatrix {
        DMatrix::builder()
            .data(array![[1.0f32], [2.0], [3.0], [4.0]])
            .label(vec![1.0f32, 1.0, 3.0, 3.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_cache_matches_prediction() {
        let dtrain = data();
        let params =
            Params::from_pairs([("max_depth", "1"), ("eta", "0.5"), ("min_child_weight", "0")])
                .unwrap();
        let mut booster = Booster::new(params, &dtrain).unwrap();
        let mut session = TrainingSession::new(&booster, &dtrain, &[(&dtrain, "train")])
            .unwrap()
            .with_thread_pool(thread_pool(2).unwrap());

        let before = session.evaluate(&booster).unwrap();
        for _ in 0..3 {
            session.update(&mut booster).unwrap();
        }
        let after = session.evaluate(&booster).unwrap();
        assert_eq!(booster.num_trees(), 3);
        assert!(after[0].value < before[0].value);
        assert_eq!(after, booster.evaluate(&[(&dtrain, "train")]).unwrap());
    }

    #[test]
    fn test_requires_labels() {
        let unlabeled = DMatrix::from_dense(array![[1.0f32], [2.0]]);
        let booster = Booster::new(Params::default(), &unlabeled).unwrap();
        let err = TrainingSession::new(&booster, &unlabeled, &[]).unwrap_err();
        assert!(err.is_engine_error());
    }
}
