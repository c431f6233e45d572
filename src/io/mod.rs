//! Model persistence.

pub mod model_file;

pub use model_file::{ModelDocument, ModelFormat, MODEL_FORMAT_VERSION};
