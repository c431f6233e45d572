//! Shared data generators for the integration tests.

#![allow(dead_code)]

use ndarray::Array2;
use rand::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use xgboost_rust::DMatrix;

/// Indicator features in the style of the mushroom data set.
///
/// The label is `f0 AND NOT f1`; every other column is noise.
pub fn mushroom_like(num_rows: usize, num_features: usize, seed: u64) -> (Array2<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = Array2::from_shape_fn((num_rows, num_features), |_| {
        if rng.gen_bool(0.5) {
            1.0
        } else {
            0.0
        }
    });
    let labels = features
        .rows()
        .into_iter()
        .map(|row| if row[0] == 1.0 && row[1] == 0.0 { 1.0 } else { 0.0 })
        .collect();
    (features, labels)
}

/// Train and test matrices drawn from the same mushroom-like distribution.
pub fn mushroom_split() -> (DMatrix, DMatrix) {
    let (train_x, train_y) = mushroom_like(400, 8, 7);
    let (test_x, test_y) = mushroom_like(200, 8, 8);
    let dtrain = DMatrix::builder().data(train_x).label(train_y).build().unwrap();
    let dtest = DMatrix::builder().data(test_x).label(test_y).build().unwrap();
    (dtrain, dtest)
}

/// Three classes separated along the first feature.
pub fn multiclass(num_rows: usize, seed: u64) -> DMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = Array2::from_shape_fn((num_rows, 3), |_| rng.gen_range(0.0f32..3.0));
    let labels: Vec<f32> = features.column(0).iter().map(|v| v.floor().min(2.0)).collect();
    DMatrix::builder().data(features).label(labels).build().unwrap()
}

/// Noisy linear target.
pub fn regression(num_rows: usize, seed: u64) -> DMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = Array2::from_shape_fn((num_rows, 4), |_| rng.gen_range(-5.0f32..5.0));
    let labels: Vec<f32> = features
        .rows()
        .into_iter()
        .map(|row| 0.5 * row[0] - 0.2 * row[1] + rng.gen_range(-0.1f32..0.1))
        .collect();
    DMatrix::builder().data(features).label(labels).build().unwrap()
}

/// Write rows as LibSVM text, listing only non-zero entries.
pub fn write_libsvm(path: &Path, features: &Array2<f32>, labels: &[f32]) {
    let mut file = fs::File::create(path).unwrap();
    for (row, label) in features.rows().into_iter().zip(labels) {
        let mut line = format!("{}", label);
        for (j, value) in row.iter().enumerate() {
            if *value != 0.0 {
                line.push_str(&format!(" {}:{}", j, value));
            }
        }
        writeln!(file, "{}", line).unwrap();
    }
}

/// Fraction of rows whose prediction falls on the wrong side of 0.5.
pub fn error_rate(predictions: &[f32], labels: &[f32]) -> f64 {
    let wrong = predictions
        .iter()
        .zip(labels)
        .filter(|(p, y)| (**p > 0.5) != (**y > 0.5))
        .count();
    wrong as f64 / labels.len() as f64
}

/// Sum of absolute differences.
pub fn total_abs_diff(a: &[f32], b: &[f32]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y).abs() as f64).sum()
}
