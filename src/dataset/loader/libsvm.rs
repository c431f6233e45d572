//! LibSVM text parser.
//!
//! Each line is `label[:weight] [qid:n] index:value ...` with 0-based column
//! indices. Absent entries are missing values. Blank lines and `#` comments are
//! skipped.

use super::ParsedRows;
use crate::core::constants::MAX_FEATURE_COLUMNS;
use crate::core::error::{DatasetError, Result};
use ndarray::Array2;
use std::io::BufRead;

/// Parse LibSVM rows from a reader.
pub fn parse<R: BufRead>(reader: R) -> Result<ParsedRows> {
    let mut rows: Vec<Vec<(usize, f32)>> = Vec::new();
    let mut labels = Vec::new();
    let mut weights = Vec::new();
    let mut num_col = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let mut tokens = content.split_whitespace();
        let head = tokens.next().unwrap_or_default();
        let (label, weight) = parse_head(head, line_no + 1)?;
        labels.push(label);
        if let Some(w) = weight {
            weights.push(w);
        }

        let mut entries = Vec::new();
        for token in tokens {
            let (index, value) = token.split_once(':').ok_or_else(|| DatasetError::Parse {
                line: line_no + 1,
                reason: format!("expected index:value, got '{}'", token),
            })?;
            if index == "qid" {
                continue;
            }
            let index: usize = index.parse().map_err(|_| DatasetError::Parse {
                line: line_no + 1,
                reason: format!("invalid feature index '{}'", index),
            })?;
            let value: f32 = value.parse().map_err(|_| DatasetError::Parse {
                line: line_no + 1,
                reason: format!("invalid feature value '{}'", value),
            })?;
            if index >= MAX_FEATURE_COLUMNS {
                return Err(DatasetError::Parse {
                    line: line_no + 1,
                    reason: format!(
                        "feature index {} exceeds the limit of {} columns",
                        index, MAX_FEATURE_COLUMNS
                    ),
                }
                .into());
            }
            num_col = num_col.max(index + 1);
            entries.push((index, value));
        }
        rows.push(entries);
    }

    if !weights.is_empty() && weights.len() != labels.len() {
        return Err(DatasetError::WeightLength {
            expected: labels.len(),
            actual: weights.len(),
        }
        .into());
    }

    let mut features = Array2::from_elem((rows.len(), num_col), f32::NAN);
    for (i, entries) in rows.iter().enumerate() {
        for &(j, value) in entries {
            features[[i, j]] = value;
        }
    }

    Ok(ParsedRows {
        features,
        labels,
        weights,
    })
}

fn parse_head(head: &str, line: usize) -> Result<(f32, Option<f32>)> {
    let parse = |text: &str, what: &str| -> Result<f32> {
        text.parse::<f32>().map_err(|_| {
            DatasetError::Parse {
                line,
                reason: format!("invalid {} '{}'", what, text),
            }
            .into()
        })
    };

    match head.split_once(':') {
        Some((label, weight)) => Ok((parse(label, "label")?, Some(parse(weight, "weight")?))),
        None => Ok((parse(head, "label")?, None)),
    }
}
