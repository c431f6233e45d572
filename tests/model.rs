//! Model handle introspection: tree weights, importance, feature checks.

mod common;

use common::*;
use ndarray::Array2;
use std::collections::BTreeMap;
use tempfile::TempDir;
use xgboost_rust::*;

fn trained() -> (Booster, DMatrix, DMatrix) {
    let (dtrain, dtest) = mushroom_split();
    let params = Params::from_pairs([
        ("max_depth", "2"),
        ("eta", "1"),
        ("silent", "1"),
        ("objective", "binary:logistic"),
    ])
    .unwrap();
    let booster = train(&params, &dtrain, 4, &[]).unwrap();
    (booster, dtrain, dtest)
}

#[test]
fn test_tree_weights() {
    let (mut booster, _, dtest) = trained();
    assert_eq!(booster.num_trees(), 4);
    for i in 0..4 {
        assert_eq!(booster.tree_weight(i).unwrap(), 1.0);
    }

    let before = booster.predict(&dtest).unwrap().to_vec();
    booster.set_tree_weight(2, 0.5).unwrap();
    assert_eq!(booster.tree_weight(2).unwrap(), 0.5);
    let after = booster.predict(&dtest).unwrap().to_vec();
    assert!(total_abs_diff(&before, &after) > 0.0);

    booster.set_tree_weight(2, 1.0).unwrap();
    let restored = booster.predict(&dtest).unwrap().to_vec();
    assert_eq!(total_abs_diff(&before, &restored), 0.0);
}

#[test]
fn test_zero_weights_are_idempotent() {
    let (mut booster, _, dtest) = trained();
    let weights = |w: f64| -> Vec<(usize, f64)> { (0..4).map(|i| (i, w)).collect() };
    let full = booster.predict(&dtest).unwrap().to_vec();

    booster.set_tree_weights(&weights(0.0)).unwrap();
    let first = booster.predict(&dtest).unwrap().to_vec();
    // Only the base score is left.
    assert!(first.iter().all(|&p| (p - 0.5).abs() < 1e-6));

    booster.set_tree_weights(&weights(1.0)).unwrap();
    assert_eq!(total_abs_diff(&full, &booster.predict(&dtest).unwrap().to_vec()), 0.0);

    booster.set_tree_weights(&weights(0.0)).unwrap();
    let second = booster.predict(&dtest).unwrap().to_vec();
    assert_eq!(total_abs_diff(&first, &second), 0.0);
}

#[test]
fn test_index_errors_leave_weights_untouched() {
    let (mut booster, _, _) = trained();
    assert!(matches!(
        booster.tree_weight(4),
        Err(XGBoostError::IndexOutOfBounds { index: 4, length: 4 })
    ));
    assert!(matches!(
        booster.set_tree_weight(10, 0.1),
        Err(XGBoostError::IndexOutOfBounds { .. })
    ));

    let err = booster.set_tree_weights(&[(0, 0.25), (7, 0.5)]).unwrap_err();
    assert!(matches!(err, XGBoostError::IndexOutOfBounds { index: 7, .. }));
    assert_eq!(booster.tree_weight(0).unwrap(), 1.0);
}

#[test]
fn test_weights_survive_save_and_load() {
    let dir = TempDir::new().unwrap();
    let (mut booster, _, dtest) = trained();
    booster.set_tree_weights(&[(0, 0.2), (3, 1.5)]).unwrap();
    let preds = booster.predict(&dtest).unwrap().to_vec();

    let path = dir.path().join("weighted.model");
    booster.save_model(&path).unwrap();
    let loaded = Booster::load_model(&path).unwrap();
    assert_eq!(loaded.tree_weight(0).unwrap(), 0.2);
    assert_eq!(loaded.tree_weight(3).unwrap(), 1.5);
    assert_eq!(total_abs_diff(&preds, &loaded.predict(&dtest).unwrap().to_vec()), 0.0);
}

#[test]
fn test_get_score_weight_equals_fscore() {
    let (booster, _, _) = trained();
    let scores = booster.get_score(ImportanceType::Weight);
    assert_eq!(scores, booster.get_fscore());
    assert!(scores.contains_key("f0"));
    assert!(scores.contains_key("f1"));
    assert!(scores.values().all(|&v| v >= 1.0));

    let gain = booster.get_score(ImportanceType::Gain);
    let average = booster.get_score(ImportanceType::AverageGain);
    for (feature, count) in &scores {
        let expected = gain[feature] / count;
        assert!((average[feature] - expected).abs() < 1e-9);
    }
    let keys = |m: &BTreeMap<String, f64>| m.keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys(&gain), keys(&scores));
    assert_eq!(keys(&booster.get_score(ImportanceType::Cover)), keys(&scores));
}

#[test]
fn test_importance_uses_feature_names() {
    let (features, labels) = mushroom_like(200, 3, 9);
    let dtrain = DMatrix::builder()
        .data(features)
        .label(labels)
        .feature_names(["bruises", "odor", "ring"])
        .build()
        .unwrap();
    let params = Params::from_pairs([("max_depth", "2"), ("silent", "1")]).unwrap();
    let booster = train(&params, &dtrain, 2, &[]).unwrap();

    let scores = booster.get_fscore();
    assert!(scores.keys().all(|k| ["bruises", "odor", "ring"].contains(&k.as_str())));
    let dump = booster.dump_model(false);
    assert_eq!(dump.len(), 2);
    assert!(dump[0].contains("[bruises<") || dump[0].contains("[odor<"));
}

#[test]
fn test_softprob_importance_reports_every_name() {
    // Every column moves the class: label = (a + b + c) mod 3.
    let combos: Vec<[f32; 3]> = (0..8)
        .map(|i| [(i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32])
        .collect();
    let rows: Vec<[f32; 3]> = combos.iter().cycle().take(160).copied().collect();
    let features = Array2::from_shape_fn((rows.len(), 3), |(i, j)| rows[i][j]);
    let labels: Vec<f32> = rows.iter().map(|r| r.iter().sum::<f32>() % 3.0).collect();
    let names = ["cap", "gill", "stalk"];
    let dtrain = DMatrix::builder()
        .data(features)
        .label(labels)
        .feature_names(names)
        .build()
        .unwrap();

    let params = Params::from_pairs([
        ("max_depth", "3"),
        ("eta", "0.5"),
        ("silent", "1"),
        ("objective", "multi:softprob"),
        ("num_class", "3"),
    ])
    .unwrap();
    let booster = train(&params, &dtrain, 5, &[]).unwrap();
    assert_eq!(booster.num_trees(), 15);
    assert_eq!(booster.predict(&dtrain).unwrap().len(), 160 * 3);

    let expected: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let keys = |m: &BTreeMap<String, f64>| m.keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys(&booster.get_fscore()), expected);
    assert_eq!(keys(&booster.get_score(ImportanceType::Cover)), expected);
    assert_eq!(keys(&booster.get_score(ImportanceType::Gain)), expected);
}

#[test]
fn test_infinite_feature_values_round_trip() {
    let dir = TempDir::new().unwrap();
    let column = [f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY];
    let features = Array2::from_shape_fn((4, 1), |(i, _)| column[i]);
    let dtrain = DMatrix::builder()
        .data(features)
        .label(vec![0.0f32, 1.0, 0.0, 1.0])
        .build()
        .unwrap();
    let params = Params::from_pairs([
        ("max_depth", "1"),
        ("eta", "1"),
        ("min_child_weight", "0"),
        ("silent", "1"),
        ("objective", "binary:logistic"),
    ])
    .unwrap();
    let booster = train(&params, &dtrain, 2, &[]).unwrap();
    let preds = booster.predict(&dtrain).unwrap().to_vec();
    assert_eq!(error_rate(&preds, &dtrain.get_label().to_vec()), 0.0);

    let path = dir.path().join("infinite.json");
    booster.save_model(&path).unwrap();
    let loaded = Booster::load_model(&path).unwrap();
    assert_eq!(total_abs_diff(&preds, &loaded.predict(&dtrain).unwrap().to_vec()), 0.0);
}

#[test]
fn test_feature_mismatch() {
    let (features, labels) = mushroom_like(100, 3, 2);
    let dtrain = DMatrix::builder()
        .data(features.clone())
        .label(labels)
        .feature_names(["a", "b", "c"])
        .build()
        .unwrap();
    let params = Params::from_pairs([("silent", "1")]).unwrap();
    let booster = train(&params, &dtrain, 1, &[]).unwrap();

    let renamed = DMatrix::builder()
        .data(features.clone())
        .feature_names(["a", "b", "d"])
        .build()
        .unwrap();
    assert!(matches!(
        booster.predict(&renamed),
        Err(XGBoostError::FeatureMismatch { .. })
    ));

    let unnamed = DMatrix::from_dense(features);
    assert!(matches!(
        booster.predict(&unnamed),
        Err(XGBoostError::FeatureMismatch { .. })
    ));
}

#[test]
fn test_positional_names_allow_extra_columns() {
    let (features, labels) = mushroom_like(100, 3, 4);
    let dtrain = DMatrix::builder().data(features).label(labels).build().unwrap();
    let params = Params::from_pairs([("silent", "1")]).unwrap();
    let booster = train(&params, &dtrain, 1, &[]).unwrap();

    let wider = DMatrix::from_dense(Array2::zeros((5, 4)));
    assert_eq!(booster.predict(&wider).unwrap().len(), 5);
}

#[test]
fn test_missing_model_file_is_engine_error() {
    let err = Booster::load_model("/nonexistent/dir/model.bin").unwrap_err();
    assert!(matches!(err, XGBoostError::Engine { .. }));
    assert!(err.is_engine_error());
    assert!(!err.is_validation_error());
}

#[test]
fn test_attributes_persist() {
    let dir = TempDir::new().unwrap();
    let (mut booster, _, _) = trained();
    booster.set_attr("owner", Some("tests"));
    booster.set_attr("scratch", Some("x"));
    booster.set_attr::<&str>("scratch", None);

    let path = dir.path().join("model.json");
    booster.save_model(&path).unwrap();
    let loaded = Booster::load_model(&path).unwrap();
    assert_eq!(loaded.attr("owner"), Some("tests"));
    assert_eq!(loaded.attr("scratch"), None);
}
