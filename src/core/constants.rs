//! Default parameter values and engine constants.

/// Default learning rate (shrinkage) applied to every new tree.
pub const DEFAULT_ETA: f64 = 0.3;

/// Default maximum tree depth. Zero means no limit.
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// Default minimum sum of hessians required in a child.
pub const DEFAULT_MIN_CHILD_WEIGHT: f64 = 1.0;

/// Default L2 regularization on leaf weights.
pub const DEFAULT_LAMBDA: f64 = 1.0;

/// Default L1 regularization on leaf weights.
pub const DEFAULT_ALPHA: f64 = 0.0;

/// Default minimum loss reduction to make a split.
pub const DEFAULT_GAMMA: f64 = 0.0;

/// Default maximum number of histogram bins per feature.
pub const DEFAULT_MAX_BIN: usize = 256;

/// Default global bias, expressed in output space.
pub const DEFAULT_BASE_SCORE: f64 = 0.5;

/// Default fraction of rows sampled per tree.
pub const DEFAULT_SUBSAMPLE: f64 = 1.0;

/// Default fraction of columns sampled per tree.
pub const DEFAULT_COLSAMPLE_BYTREE: f64 = 1.0;

/// Weight assigned to every tree when it is appended to the ensemble.
pub const DEFAULT_TREE_WEIGHT: f64 = 1.0;

/// Smallest loss reduction treated as a real improvement.
pub const RT_EPS: f64 = 1e-6;

/// Floor applied to hessians so leaf weights stay finite.
pub const MIN_HESSIAN: f32 = 1e-16;

/// Probabilities are clipped to `[EPSILON, 1 - EPSILON]` inside log losses.
pub const PROB_EPSILON: f64 = 1e-16;

/// Largest column count a text input may declare. Rows are stored densely,
/// so a sparse index beyond this is rejected instead of allocated.
pub const MAX_FEATURE_COLUMNS: usize = 1 << 24;

/// Bin index used for missing values.
pub const MISSING_BIN: u32 = u32::MAX;

/// Magic header of the binary DMatrix cache.
pub const DMATRIX_MAGIC: &[u8; 8] = b"XGDMAT01";

/// Magic header of the binary model format.
pub const MODEL_MAGIC: &[u8; 8] = b"XGBMDL01";

/// Prefix of positional feature names.
pub const DEFAULT_FEATURE_PREFIX: &str = "f";

/// Characters that may not appear in feature names.
pub const RESERVED_FEATURE_SYMBOLS: [char; 3] = ['[', ']', '<'];
