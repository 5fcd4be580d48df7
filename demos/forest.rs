//! Time series forest regression example.
//!
//! Run with: cargo run --example forest

use anofox_tsml::regression::{
    DecisionTreeRegressor, ForestConfig, TimeSeriesForestRegressor, TreeConfig,
};

/// Noisy linear trends; the target is the trend slope.
fn make_dataset(n: usize, length: usize, offset: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let slopes: Vec<f64> = (0..n)
        .map(|i| ((i * 37 + offset) % 100) as f64 / 50.0 - 1.0)
        .collect();
    let batch = slopes
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            (0..length)
                .map(|t| 10.0 + s * t as f64 + 0.5 * ((i * 7 + t) as f64 * 1.3).sin())
                .collect()
        })
        .collect();
    (batch, slopes)
}

fn rmse(pred: &[f64], actual: &[f64]) -> f64 {
    let sse: f64 = pred
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    (sse / pred.len() as f64).sqrt()
}

fn main() {
    println!("=== Time Series Forest Regression Example ===\n");

    let (train, y_train) = make_dataset(150, 48, 0);
    let (test, y_test) = make_dataset(40, 48, 11);
    println!("Training series: {} x {}", train.len(), train[0].len());
    println!("Test series:     {} x {}", test.len(), test[0].len());
    println!(
        "Intervals per tree: {}\n",
        (train[0].len() as f64).sqrt() as usize
    );

    // 1. Default Trees
    println!("--- Fully Grown Trees ---");
    let config = ForestConfig::new(100).with_seed(42).with_n_jobs(-1);
    let mut forest = TimeSeriesForestRegressor::new(config);
    forest.fit(&train, &y_train).expect("fit forest");
    let pred = forest.predict(&test).expect("predict");
    println!("  trees: {}", forest.members().len());
    println!("  RMSE:  {:.4}", rmse(&pred, &y_test));

    // 2. Shallow Trees
    println!("\n--- Depth-Limited Trees ---");
    let base = DecisionTreeRegressor::with_config(TreeConfig::default().with_max_depth(3));
    let mut shallow =
        TimeSeriesForestRegressor::with_base_estimator(ForestConfig::new(100).with_seed(42), base);
    shallow.fit(&train, &y_train).expect("fit forest");
    let pred_shallow = shallow.predict(&test).expect("predict");
    println!("  RMSE:  {:.4}", rmse(&pred_shallow, &y_test));

    // 3. Baseline
    let mean = y_train.iter().sum::<f64>() / y_train.len() as f64;
    let baseline = vec![mean; y_test.len()];
    println!("\n--- Mean Predictor Baseline ---");
    println!("  RMSE:  {:.4}", rmse(&baseline, &y_test));

    println!("\nFirst predictions:");
    for (p, a) in pred.iter().zip(y_test.iter()).take(5) {
        println!("  predicted {:>7.4}  actual {:>7.4}", p, a);
    }

    println!("\n=== Forest Example Complete ===");
}
