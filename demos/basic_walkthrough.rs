//! Basic walkthrough: train, evaluate, re-weight trees, save and reload.
//!
//! Run with: `cargo run --example basic_walkthrough`

use ndarray::Array2;
use rand::prelude::*;
use xgboost_rust::*;

fn mushrooms(num_rows: usize, seed: u64) -> Result<DMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = Array2::from_shape_fn((num_rows, 6), |_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
    let labels: Vec<f32> = features
        .rows()
        .into_iter()
        .map(|row| if row[0] == 1.0 && row[1] == 0.0 { 1.0 } else { 0.0 })
        .collect();
    DMatrix::builder()
        .data(features)
        .label(labels)
        .feature_names(["bruises", "odor", "gill", "stalk", "ring", "spore"])
        .feature_types("i")
        .build()
}

fn main() -> Result<()> {
    xgboost_rust::init()?;

    println!("Pure Rust XGBoost - Basic Walkthrough");
    println!("=====================================");

    let dtrain = mushrooms(2000, 1)?;
    let dtest = mushrooms(500, 2)?;

    let params = Params::from_pairs([
        ("max_depth", "2"),
        ("eta", "1"),
        ("objective", "binary:logistic"),
    ])?;
    let watchlist = [(&dtest, "eval"), (&dtrain, "train")];
    let mut booster = train(&params, &dtrain, 2, &watchlist)?;

    let preds = booster.predict(&dtest)?;
    let labels = dtest.get_label();
    let wrong = preds
        .iter()
        .zip(labels.iter())
        .filter(|(p, y)| (**p > 0.5) != (**y > 0.5))
        .count();
    println!("error={:.6}", wrong as f64 / preds.len() as f64);

    println!("\nTrees:");
    for (i, dump) in booster.dump_model(true).iter().enumerate() {
        println!("booster[{}]:\n{}", i, dump);
    }

    println!("Feature importance (gain):");
    for (feature, gain) in booster.get_score(ImportanceType::Gain) {
        println!("  {}: {:.4}", feature, gain);
    }

    booster.set_tree_weight(1, 0.5)?;
    println!("\nAfter halving tree 1: {}", booster.eval_set(&watchlist, 1)?);

    let dir = std::env::temp_dir().join("xgboost_rust_walkthrough");
    std::fs::create_dir_all(&dir)?;
    let model_path = dir.join("0001.model");
    booster.save_model(&model_path)?;
    dtest.save_binary(dir.join("dtest.buffer"))?;

    let reloaded = Booster::load_model(&model_path)?;
    let dtest2 = DMatrix::from_file(dir.join("dtest.buffer"))?;
    let preds2 = reloaded.predict(&dtest2)?;
    let diff: f32 = preds
        .iter()
        .zip(preds2.iter())
        .map(|(a, b)| (a - b).abs())
        .sum();
    println!("Prediction difference after reload: {}", diff);

    let result = cv(&params, &dtrain, 2, 5)?;
    println!("\nCross-validation:");
    for (name, values) in result.as_map() {
        println!("  {}: {:?}", name, values);
    }

    Ok(())
}
