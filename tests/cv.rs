//! Cross-validation driver.

mod common;

use common::*;
use xgboost_rust::*;

fn params() -> Params {
    Params::from_pairs([
        ("max_depth", "2"),
        ("eta", "1"),
        ("silent", "1"),
        ("objective", "binary:logistic"),
    ])
    .unwrap()
}

#[test]
fn test_ten_folds_yield_four_series() {
    let (dtrain, _) = mushroom_split();
    let result = cv(&params(), &dtrain, 2, 10).unwrap();

    assert_eq!(result.len(), 4);
    for name in ["train-error-mean", "train-error-std", "test-error-mean", "test-error-std"] {
        assert_eq!(result.series(name).map(|s| s.len()), Some(2), "{}", name);
    }
    assert!(result.series("test-error-mean").unwrap()[1] < 0.1);
}

#[test]
fn test_stratified_and_metrics() {
    let (dtrain, _) = mushroom_split();
    let options = CvOptions::new(3, 5)
        .stratified(true)
        .seed(3)
        .metric("auc")
        .metric("logloss");
    let result = cv_with(&params(), &dtrain, options).unwrap();

    assert_eq!(result.len(), 8);
    assert_eq!(result.num_rounds(), 3);
    assert!(result.series("test-auc-mean").unwrap().iter().all(|&v| v > 0.5));
}

#[test]
fn test_callbacks_receive_fold_means() {
    let (dtrain, _) = mushroom_split();
    let mut recorder = RecordEvaluation::new();
    let result = cv_with(&params(), &dtrain, CvOptions::new(2, 4).callback(&mut recorder)).unwrap();

    let history = recorder.history();
    assert_eq!(
        history.get("test", "error").unwrap(),
        result.series("test-error-mean").unwrap()
    );
}

#[test]
fn test_early_stopping_truncates_series() {
    let (dtrain, _) = mushroom_split();
    let result = cv_with(
        &params(),
        &dtrain,
        CvOptions::new(30, 3).early_stopping_rounds(3),
    )
    .unwrap();

    let best = result.best_iteration().expect("separable data stops early");
    assert_eq!(result.num_rounds(), best + 1);
}

#[test]
fn test_fold_count_bounds() {
    let dtrain = regression(8, 1);
    for nfold in [1, 9] {
        assert!(matches!(
            cv(&params(), &dtrain, 1, nfold),
            Err(XGBoostError::InvalidParameter { .. })
        ));
    }
}
