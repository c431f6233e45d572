//! CSV text parser.
//!
//! Rows are dense and header-less. Empty fields are missing values. When a
//! label column is given it is removed from the features.

use super::ParsedRows;
use crate::core::error::{DatasetError, Result};
use csv::ReaderBuilder;
use ndarray::Array2;
use std::io::Read;

/// Parse CSV rows from a reader.
pub fn parse<R: Read>(reader: R, label_column: Option<usize>) -> Result<ParsedRows> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values: Vec<f32> = Vec::new();
    let mut labels = Vec::new();
    let mut num_col: Option<usize> = None;
    let mut num_row = 0usize;

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let width = record.len();
        let expected = label_column.map_or(width, |_| width.saturating_sub(1));

        match num_col {
            None => {
                if let Some(column) = label_column.filter(|&c| c >= width) {
                    return Err(DatasetError::Parse {
                        line: row + 1,
                        reason: format!("label_column {} out of range for {} fields", column, width),
                    }
                    .into());
                }
                num_col = Some(expected);
            }
            Some(n) if n != expected => {
                return Err(DatasetError::Parse {
                    line: row + 1,
                    reason: format!("expected {} feature fields, got {}", n, expected),
                }
                .into());
            }
            Some(_) => {}
        }

        for (column, field) in record.iter().enumerate() {
            let value = if field.is_empty() {
                f32::NAN
            } else {
                field.parse::<f32>().map_err(|_| DatasetError::Parse {
                    line: row + 1,
                    reason: format!("invalid value '{}' in column {}", field, column),
                })?
            };

            if Some(column) == label_column {
                labels.push(value);
            } else {
                values.push(value);
            }
        }
        num_row += 1;
    }

    let features = Array2::from_shape_vec((num_row, num_col.unwrap_or(0)), values)
        .map_err(|e| DatasetError::Parse {
            line: num_row,
            reason: e.to_string(),
        })?;

    Ok(ParsedRows {
        features,
        labels,
        weights: Vec::new(),
    })
}
