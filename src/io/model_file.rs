//! Model file operations for Pure Rust XGBoost.
//!
//! A saved model is a [`ModelDocument`] written in one of two encodings:
//!
//! * binary: the 8 byte magic `XGBMDL01` followed by a bincode payload
//! * JSON: a pretty-printed JSON object, selected by a `.json` extension
//!
//! Readers detect the encoding from the content, not the file name. Every read
//! failure (missing file, unreadable file, corrupt payload) surfaces as an
//! engine error.

use crate::boosting::model::GBTreeModel;
use crate::config::Params;
use crate::core::constants::MODEL_MAGIC;
use crate::core::error::{Result, XGBoostError};
use crate::core::types::FeatureType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Format version written into every document.
pub const MODEL_FORMAT_VERSION: &str = "1.0";

/// Serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Magic header plus bincode payload
    Binary,
    /// JSON document
    Json,
}

impl ModelFormat {
    /// Format implied by a file name: JSON for `.json`, binary otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
            _ => ModelFormat::Binary,
        }
    }
}

/// Everything persisted with a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// File format version
    pub version: String,
    /// Time the document was written
    pub created_at: DateTime<Utc>,
    /// Training parameters, including the objective
    pub params: Params,
    /// Trees and their weights
    pub model: GBTreeModel,
    /// Explicit feature names of the training data
    pub feature_names: Option<Vec<String>>,
    /// Feature types of the training data
    pub feature_types: Option<Vec<FeatureType>>,
    /// User attributes
    pub attributes: BTreeMap<String, String>,
}

impl ModelDocument {
    /// Encode in `format`.
    pub fn to_bytes(&self, format: ModelFormat) -> Result<Vec<u8>> {
        match format {
            ModelFormat::Binary => {
                let mut bytes = MODEL_MAGIC.to_vec();
                bincode::serialize_into(&mut bytes, self)?;
                Ok(bytes)
            }
            ModelFormat::Json => Ok(serde_json::to_vec_pretty(self)?),
        }
    }

    /// Decode either encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document: ModelDocument = if let Some(payload) = bytes.strip_prefix(MODEL_MAGIC.as_slice()) {
            bincode::deserialize(payload)
                .map_err(|e| XGBoostError::engine(format!("corrupt binary model: {}", e)))?
        } else if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
            serde_json::from_slice(bytes)
                .map_err(|e| XGBoostError::engine(format!("corrupt JSON model: {}", e)))?
        } else {
            return Err(XGBoostError::engine("unrecognized model format"));
        };

        if document.version != MODEL_FORMAT_VERSION {
            return Err(XGBoostError::engine(format!(
                "unsupported model version {}, expected {}",
                document.version, MODEL_FORMAT_VERSION
            )));
        }
        document
            .model
            .validate()
            .map_err(|e| XGBoostError::engine(format!("invalid model: {}", e)))?;
        Ok(document)
    }

    /// Write to `path`, JSON when the extension is `.json`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes(ModelFormat::from_path(path))?;
        fs::write(path, bytes).map_err(|e| {
            XGBoostError::engine(format!("failed to write model to {}: {}", path.display(), e))
        })?;
        log::debug!(
            "Saved model with {} trees to {}",
            self.model.num_trees(),
            path.display()
        );
        Ok(())
    }

    /// Read from `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            XGBoostError::engine(format!("failed to read model from {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
            .map_err(|e| XGBoostError::engine(format!("{}: {}", path.display(), e)))
    }
}
