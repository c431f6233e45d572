//! File loaders for [`DMatrix`].
//!
//! A path may carry a URI style suffix, `data.csv?format=csv&label_column=0`.
//! Files starting with the binary cache magic are read as caches; other files
//! are text, optionally gzip compressed (`.gz`), in LibSVM or CSV format.

pub mod csv;
pub mod libsvm;

use crate::core::constants::DMATRIX_MAGIC;
use crate::core::error::{DatasetError, Result, XGBoostError};
use crate::dataset::binary;
use crate::dataset::dmatrix::DMatrix;

use flate2::read::GzDecoder;
use ndarray::Array2;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Text formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// `label idx:value idx:value ...`
    LibSvm,
    /// Comma separated dense rows
    Csv,
}

/// A parsed data source specification.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    /// File path without the URI suffix
    pub path: PathBuf,
    /// Text format
    pub format: TextFormat,
    /// Column holding labels (CSV only)
    pub label_column: Option<usize>,
}

impl DataSource {
    /// Parse `path[?key=value&...]`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (path, query) = match spec.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (spec, None),
        };

        let mut options = HashMap::new();
        for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                XGBoostError::invalid_parameter("uri", spec, format!("malformed option '{}'", pair))
            })?;
            options.insert(key.to_string(), value.to_string());
        }

        let stem = path.strip_suffix(".gz").unwrap_or(path);
        let format = match options.get("format").map(String::as_str) {
            Some("csv") => TextFormat::Csv,
            Some("libsvm") => TextFormat::LibSvm,
            Some(other) => {
                return Err(XGBoostError::invalid_parameter(
                    "format",
                    other,
                    "must be libsvm or csv",
                ))
            }
            None if stem.ends_with(".csv") => TextFormat::Csv,
            None => TextFormat::LibSvm,
        };

        let label_column = options
            .get("label_column")
            .map(|v| {
                v.parse::<usize>().map_err(|_| {
                    XGBoostError::invalid_parameter("label_column", v.as_str(), "expected a column index")
                })
            })
            .transpose()?;

        Ok(DataSource {
            path: PathBuf::from(path),
            format,
            label_column,
        })
    }
}

/// Rows parsed from a text file.
#[derive(Debug, Clone)]
pub struct ParsedRows {
    /// Dense features, NaN where absent
    pub features: Array2<f32>,
    /// Labels, empty when the file has none
    pub labels: Vec<f32>,
    /// Weights, empty when the file has none
    pub weights: Vec<f32>,
}

impl ParsedRows {
    fn into_dmatrix(self) -> Result<DMatrix> {
        let mut matrix = DMatrix::from_dense(self.features);
        if !self.labels.is_empty() {
            matrix.set_label(&self.labels)?;
        }
        if !self.weights.is_empty() {
            matrix.set_weight(&self.weights)?;
        }
        Ok(matrix)
    }
}

/// Load a matrix from any supported file.
pub fn load_dmatrix(path: &Path) -> Result<DMatrix> {
    let spec = path.to_string_lossy();
    let source = DataSource::parse(&spec)?;

    let mut file = File::open(&source.path).map_err(|e| {
        XGBoostError::engine(format!("failed to open {}: {}", source.path.display(), e))
    })?;

    let mut magic = [0u8; 8];
    let is_cache = match file.read_exact(&mut magic) {
        Ok(()) => &magic == DMATRIX_MAGIC,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e.into()),
    };
    drop(file);

    if is_cache {
        let matrix = binary::load_binary(&source.path)?;
        log::info!(
            "{}x{} matrix loaded from buffer {}",
            matrix.num_row(),
            matrix.num_col(),
            source.path.display()
        );
        return Ok(matrix);
    }

    let reader = open_text(&source.path)?;
    let rows = match source.format {
        TextFormat::LibSvm => libsvm::parse(reader)?,
        TextFormat::Csv => csv::parse(reader, source.label_column)?,
    };

    if rows.features.nrows() == 0 {
        return Err(DatasetError::Empty.into());
    }

    log::info!(
        "{}x{} matrix with {} entries loaded from {}",
        rows.features.nrows(),
        rows.features.ncols(),
        rows.features.iter().filter(|v| !v.is_nan()).count(),
        source.path.display()
    );
    rows.into_dmatrix()
}

fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .map_err(|e| XGBoostError::engine(format!("failed to open {}: {}", path.display(), e)))?;

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
