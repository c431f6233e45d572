//! Error handling and error types for Pure Rust XGBoost.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors fall into
//! four families that callers can tell apart:
//!
//! * validation errors, raised while building or annotating a [`DMatrix`](crate::DMatrix)
//! * range errors, raised by tree-index introspection on a booster
//! * feature-mismatch errors, raised when a booster scores misaligned columns
//! * engine errors, raised by training, parameter parsing and model persistence

use std::io;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum XGBoostError {
    /// Malformed dataset construction or metadata assignment
    #[error("Validation error: {source}")]
    Validation {
        /// Underlying error
        #[from]
        source: DatasetError,
    },

    /// Prediction data does not carry the feature names the model was trained on
    #[error("feature_names mismatch: expected {expected:?}, got {actual:?}")]
    FeatureMismatch {
        /// Names the model was trained with
        expected: Vec<String>,
        /// Names carried by the data
        actual: Vec<String>,
    },

    /// Out of bounds access
    #[error("Index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of valid indices
        length: usize,
    },

    /// Failure reported by the boosting engine
    #[error("Engine error: {message}")]
    Engine {
        /// What went wrong
        message: String,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value, as given
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training {
        /// What went wrong
        message: String,
    },

    /// Prediction errors
    #[error("Prediction error: {message}")]
    Prediction {
        /// What went wrong
        message: String,
    },

    /// Model serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// What went wrong
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying error
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[error("CSV parsing error: {source}")]
    Csv {
        /// Underlying error
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },

    /// Bincode serialization errors
    #[error("Bincode error: {source}")]
    Bincode {
        /// Underlying error
        #[from]
        source: bincode::Error,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },
}

/// Dataset validation failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// No rows or no columns
    #[error("Empty dataset provided")]
    Empty,

    /// Input array is not 2-D
    #[error("Input data must be 2 dimensional, got {ndim} dimension(s)")]
    InvalidDimensions {
        /// Dimensions of the input
        ndim: usize,
    },

    /// Input array holds non-numeric elements
    #[error("Input data must be numeric, got element type {dtype}")]
    NonNumericData {
        /// Element type name
        dtype: String,
    },

    /// Feature name list length differs from the column count
    #[error("feature_names must have the same length as data: expected {expected}, got {actual}")]
    FeatureNameCount {
        /// Column count
        expected: usize,
        /// Names given
        actual: usize,
    },

    /// A feature name appears twice
    #[error("feature_names must be unique, '{name}' appears more than once")]
    DuplicateFeatureName {
        /// The repeated name
        name: String,
    },

    /// A feature name contains a reserved symbol
    #[error("feature_names may not contain [, ] or <: '{name}'")]
    InvalidFeatureName {
        /// The offending name
        name: String,
    },

    /// Feature type list length differs from the column count
    #[error("feature_types must have the same length as data: expected {expected}, got {actual}")]
    FeatureTypeCount {
        /// Column count
        expected: usize,
        /// Types given
        actual: usize,
    },

    /// A feature type outside the vocabulary
    #[error("All feature_types must be {{int, float, i, q}}, got '{value}'")]
    InvalidFeatureType {
        /// The offending type
        value: String,
    },

    /// Label length differs from the row count
    #[error("label length {actual} does not match number of rows {expected}")]
    LabelLength {
        /// Row count
        expected: usize,
        /// Labels given
        actual: usize,
    },

    /// Weight length differs from the row count
    #[error("weight length {actual} does not match number of rows {expected}")]
    WeightLength {
        /// Row count
        expected: usize,
        /// Weights given
        actual: usize,
    },

    /// Base margin length is not a multiple of the row count
    #[error("base_margin length {actual} is not a multiple of number of rows {rows}")]
    BaseMarginLength {
        /// Row count
        rows: usize,
        /// Margins given
        actual: usize,
    },

    /// Row index past the end of the matrix
    #[error("Row index {index} out of range for {rows} rows")]
    RowIndex {
        /// Requested row
        index: usize,
        /// Row count
        rows: usize,
    },

    /// Malformed text input
    #[error("Parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What could not be parsed
        reason: String,
    },
}

/// Type alias for Results using XGBoostError
pub type Result<T> = std::result::Result<T, XGBoostError>;

impl XGBoostError {
    /// Create an engine error
    pub fn engine<S: Into<String>>(message: S) -> Self {
        XGBoostError::Engine {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        XGBoostError::Training {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        XGBoostError::Prediction {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        XGBoostError::Serialization {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        XGBoostError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a feature mismatch error
    pub fn feature_mismatch(expected: &[String], actual: &[String]) -> Self {
        XGBoostError::FeatureMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        XGBoostError::IndexOutOfBounds { index, length }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        XGBoostError::Internal {
            message: message.into(),
        }
    }

    /// True for failures raised while validating a dataset.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, XGBoostError::Validation { .. })
    }

    /// True for failures that originate inside the boosting engine,
    /// including model file I/O.
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            XGBoostError::Engine { .. }
                | XGBoostError::InvalidParameter { .. }
                | XGBoostError::Training { .. }
                | XGBoostError::Serialization { .. }
                | XGBoostError::IO { .. }
                | XGBoostError::Csv { .. }
                | XGBoostError::Json { .. }
                | XGBoostError::Bincode { .. }
        )
    }

    /// Check if retrying the same call can succeed once the environment changes
    pub fn is_recoverable(&self) -> bool {
        match self {
            XGBoostError::Validation { .. } => false,
            XGBoostError::FeatureMismatch { .. } => false,
            XGBoostError::IndexOutOfBounds { .. } => false,
            XGBoostError::Engine { .. } => true,
            XGBoostError::InvalidParameter { .. } => false,
            XGBoostError::Training { .. } => true,
            XGBoostError::Prediction { .. } => true,
            XGBoostError::Serialization { .. } => false,
            XGBoostError::IO { .. } => true,
            XGBoostError::Csv { .. } => false,
            XGBoostError::Json { .. } => false,
            XGBoostError::Bincode { .. } => false,
            XGBoostError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            XGBoostError::Validation { .. } => "validation",
            XGBoostError::FeatureMismatch { .. } => "feature_mismatch",
            XGBoostError::IndexOutOfBounds { .. } => "index_out_of_bounds",
            XGBoostError::Engine { .. } => "engine",
            XGBoostError::InvalidParameter { .. } => "invalid_parameter",
            XGBoostError::Training { .. } => "training",
            XGBoostError::Prediction { .. } => "prediction",
            XGBoostError::Serialization { .. } => "serialization",
            XGBoostError::IO { .. } => "io",
            XGBoostError::Csv { .. } => "csv",
            XGBoostError::Json { .. } => "json",
            XGBoostError::Bincode { .. } => "bincode",
            XGBoostError::Internal { .. } => "internal",
        }
    }

    /// The dataset failure behind a validation error, if any.
    pub fn dataset_error(&self) -> Option<&DatasetError> {
        match self {
            XGBoostError::Validation { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience macros for error creation
/// Build an [`XGBoostError::Engine`] from a message or a format string.
#[macro_export]
macro_rules! engine_error {
    ($msg:expr) => {
        $crate::core::error::XGBoostError::engine($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::XGBoostError::engine(format!($fmt, $($arg)*))
    };
}

/// Build an [`XGBoostError::Training`] from a message or a format string.
#[macro_export]
macro_rules! training_error {
    ($msg:expr) => {
        $crate::core::error::XGBoostError::training($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::XGBoostError::training(format!($fmt, $($arg)*))
    };
}

/// Return early with `$err` converted into the caller's error type unless `$cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = XGBoostError::engine("failed to open model");
        assert_eq!(err.category(), "engine");
        assert!(err.is_engine_error());
        assert!(err.is_recoverable());

        let err: XGBoostError = DatasetError::InvalidDimensions { ndim: 3 }.into();
        assert_eq!(err.category(), "validation");
        assert!(err.is_validation_error());
        assert!(!err.is_engine_error());
    }

    #[test]
    fn test_error_macros() {
        let err = engine_error!("test error");
        assert!(matches!(err, XGBoostError::Engine { .. }));

        let err = training_error!("bad round: {}", 42);
        assert!(matches!(err, XGBoostError::Training { .. }));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_validation_errors_keep_their_kind() {
        let err: XGBoostError = DatasetError::DuplicateFeatureName {
            name: "a".to_string(),
        }
        .into();
        assert_eq!(
            err.dataset_error(),
            Some(&DatasetError::DuplicateFeatureName {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn test_range_and_mismatch_are_not_engine_errors() {
        let err = XGBoostError::index_out_of_bounds(10, 3);
        assert!(!err.is_engine_error());
        assert!(!err.is_validation_error());

        let err = XGBoostError::feature_mismatch(&["a".to_string()], &["b".to_string()]);
        assert_eq!(err.category(), "feature_mismatch");
        assert!(err.to_string().contains("feature_names mismatch"));
    }

    #[test]
    fn test_parameter_errors() {
        let err = XGBoostError::invalid_parameter("eta", "-0.5", "must be non-negative");
        assert_eq!(err.category(), "invalid_parameter");
        assert!(err.is_engine_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: XGBoostError = io_err.into();
        assert!(matches!(err, XGBoostError::IO { .. }));
        assert_eq!(err.category(), "io");
        assert!(err.is_engine_error());
    }
}
