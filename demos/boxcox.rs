//! Box-Cox lambda estimation example.
//!
//! Run with: cargo run --example boxcox

use anofox_tsml::transform::{
    boxcox, boxcox_auto, estimate_lambda, estimate_lambda_all, inv_boxcox, is_boxcox_suitable,
    Bounds, BoxCoxTransformer, LambdaMethod, LogTransformer,
};

fn main() {
    println!("=== Box-Cox Lambda Estimation Example ===\n");

    println!("Box-Cox transforms positive data to stabilize its variance.");
    println!("Formula: y = (x^lambda - 1) / lambda  (lambda != 0)");
    println!("         y = ln(x)                    (lambda = 0)\n");

    // Monthly series whose seasonal swing grows with its level
    let series: Vec<f64> = (0..72)
        .map(|i| {
            let level = 100.0 * 1.08_f64.powi(i / 12);
            level * (1.0 + 0.25 * (i as f64 * std::f64::consts::PI / 6.0).sin())
        })
        .collect();

    println!("Original series (first 12):");
    println!(
        "{:?}\n",
        series
            .iter()
            .take(12)
            .map(|x| format!("{:.2}", x))
            .collect::<Vec<_>>()
    );

    // 1. Check Suitability
    println!("--- Checking Box-Cox Suitability ---");
    println!("Series suitable: {}", is_boxcox_suitable(&series));
    println!(
        "Series with zero suitable: {}",
        is_boxcox_suitable(&[0.0, 1.0, 2.0])
    );

    // 2. Lambda per Method
    println!("\n--- Lambda per Estimation Method ---");

    match estimate_lambda_all(&series, None) {
        Ok((pearsonr, mle)) => {
            println!("  pearsonr: {:.4}", pearsonr);
            println!("  mle:      {:.4}", mle);
        }
        Err(e) => println!("  estimation failed: {}", e),
    }

    match LambdaMethod::guerrero(Some(12)) {
        Ok(method) => match estimate_lambda(&series, method, None) {
            Ok(lambda) => println!("  guerrero: {:.4}", lambda),
            Err(e) => println!("  guerrero failed: {}", e),
        },
        Err(e) => println!("  guerrero unavailable: {}", e),
    }

    // 3. Bounded Search
    println!("\n--- Bounded Search in [0.5, 1.0] ---");
    let bounds = Bounds::new(0.5, 1.0).expect("valid bounds");
    let lambda = estimate_lambda(&series, LambdaMethod::Mle, Some(bounds)).expect("estimable");
    println!("  mle within bounds: {:.4}", lambda);

    // 4. Confidence Interval
    println!("\n--- Maximum Likelihood with 95% Confidence Interval ---");
    let result = boxcox_auto(&series, None, Some(0.05)).expect("estimable");
    println!("  lambda: {:.4}", result.lambda);
    if let Some((low, high)) = result.conf_interval {
        println!("  95% CI: ({:.4}, {:.4})", low, high);
    }

    // 5. Fit on Training Data, Apply to New Data
    println!("\n--- Transformer Fit / Transform ---");
    let (train, test) = series.split_at(48);
    let fitted = BoxCoxTransformer::new()
        .with_method(LambdaMethod::Guerrero { seasonal_period: 12 })
        .fit(train)
        .expect("fit on training data");
    let transformed = fitted.transform(test).expect("positive test data");
    let restored = fitted.inverse_transform(&transformed);
    let max_error = restored
        .iter()
        .zip(test.iter())
        .map(|(r, x)| (r - x).abs())
        .fold(0.0_f64, f64::max);
    println!("  fitted lambda: {:.4}", fitted.lambda());
    println!("  round-trip max error: {:.2e}", max_error);

    // 6. Fixed Lambda Values
    println!("\n--- Effect of Different Lambda Values ---");
    for lambda in [-1.0, 0.0, 0.5, 1.0] {
        let y = boxcox(&series, lambda).expect("positive data");
        let back = inv_boxcox(&y, lambda);
        println!(
            "  lambda = {:>4}: first = {:>10.4}, restored = {:.4}",
            lambda, y[0], back[0]
        );
    }

    let logged = LogTransformer::new().transform(&series).expect("positive data");
    println!("  log transform: first = {:.4}", logged[0]);

    println!("\n=== Box-Cox Example Complete ===");
}
