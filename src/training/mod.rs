//! Training and cross-validation drivers.

pub mod callback;
pub mod cv;
pub mod session;
pub mod train;

pub use callback::{
    CallbackEnv, EarlyStopping, EvaluationHistory, EvaluationMonitor, RecordEvaluation,
    TrainingCallback,
};
pub use cv::{cv, cv_with, CvOptions, CvResult};
pub use session::{thread_pool, TrainingSession};
pub use train::{train, train_with, TrainOptions};
