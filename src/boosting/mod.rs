//! Gradient boosted tree models.
//!
//! [`GBTreeModel`] is the raw ensemble: trees in growth order, each with a
//! weight multiplier. [`Booster`] wraps it with the objective, parameters and
//! feature metadata needed to predict, introspect and persist.

pub mod booster;
pub mod model;

pub use booster::{format_evaluation, Booster, EvaluationEntry};
pub use model::{EnsembleStatistics, GBTreeModel, TreeInfo};
