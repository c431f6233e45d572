use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ndarray::Array2;
use rand::prelude::*;
use xgboost_rust::{train, DMatrix, Params};

const NUM_ROWS: usize = 5_000;
const NUM_FEATURES: usize = 20;

fn dataset() -> DMatrix {
    let mut rng = StdRng::seed_from_u64(17);
    let features = Array2::from_shape_fn((NUM_ROWS, NUM_FEATURES), |_| rng.gen_range(-1.0f32..1.0));
    let labels: Vec<f32> = features
        .rows()
        .into_iter()
        .map(|row| if row[0] + 0.5 * row[1] - row[2] > 0.0 { 1.0 } else { 0.0 })
        .collect();
    DMatrix::builder()
        .data(features)
        .label(labels)
        .build()
        .expect("benchmark data")
}

fn bench_training(c: &mut Criterion) {
    let dtrain = dataset();
    let params = Params::from_pairs([
        ("objective", "binary:logistic"),
        ("max_depth", "6"),
        ("silent", "1"),
    ])
    .expect("benchmark params");

    c.bench_function("train_10_rounds", |b| {
        b.iter(|| train(black_box(&params), black_box(&dtrain), 10, &[]).expect("train"))
    });

    let booster = train(&params, &dtrain, 50, &[]).expect("train");
    c.bench_function("predict_50_trees", |b| {
        b.iter_batched(
            || dtrain.clone(),
            |data| booster.predict(black_box(&data)).expect("predict"),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_training);
criterion_main!(benches);
