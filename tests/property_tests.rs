//! Property-based tests for transforms and forest aggregation.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated series.

use anofox_tsml::features::{
    interval_features, sample_intervals, Interval, FEATURES_PER_INTERVAL,
};
use anofox_tsml::regression::{aggregate_predictions, EnsembleMember, TreeRegressor};
use anofox_tsml::transform::{boxcox, inv_boxcox, LogTransformer};
use anofox_tsml::utils::WorkerPool;
use anofox_tsml::Result;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Strategy for generating strictly positive, non-constant series.
fn positive_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(0.1..100.0_f64, len).prop_map(|mut v| {
            // Add small variation to rule out constant series
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.001;
            }
            v
        })
    })
}

/// Tree that ignores its features and always predicts the same value.
#[derive(Debug, Clone)]
struct ConstantTree(f64);

impl TreeRegressor for ConstantTree {
    fn fit(&mut self, _features: &[Vec<f64>], _targets: &[f64]) -> Result<()> {
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(vec![self.0; features.len()])
    }

    fn is_fitted(&self) -> bool {
        true
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// inv_boxcox undoes boxcox for any lambda in the usual search range.
    #[test]
    fn boxcox_round_trip(
        values in positive_values_strategy(2, 60),
        lambda in -2.0..2.0_f64,
    ) {
        let transformed = boxcox(&values, lambda).unwrap();
        let restored = inv_boxcox(&transformed, lambda);

        prop_assert_eq!(restored.len(), values.len());
        for (r, v) in restored.iter().zip(values.iter()) {
            prop_assert!((r - v).abs() <= 1e-6 * v.abs().max(1.0), "{} vs {}", r, v);
        }
    }

    /// Lambda zero is the natural log, matching the log transformer.
    #[test]
    fn boxcox_zero_is_log(values in positive_values_strategy(2, 60)) {
        let transformed = boxcox(&values, 0.0).unwrap();
        let logged = LogTransformer::new().transform(&values).unwrap();
        for ((t, l), v) in transformed.iter().zip(logged.iter()).zip(values.iter()) {
            prop_assert_eq!(*t, v.ln());
            prop_assert_eq!(*l, v.ln());
        }
    }

    /// The transform is strictly increasing, so it preserves order.
    #[test]
    fn boxcox_preserves_order(
        values in positive_values_strategy(2, 40),
        lambda in -2.0..2.0_f64,
    ) {
        let transformed = boxcox(&values, lambda).unwrap();
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] < values[j] {
                    prop_assert!(transformed[i] <= transformed[j]);
                }
            }
        }
    }

    /// Non-positive inputs are always rejected.
    #[test]
    fn boxcox_rejects_non_positive(
        mut values in positive_values_strategy(2, 30),
        idx in 0usize..30,
        bad in -10.0..=0.0_f64,
    ) {
        let idx = idx % values.len();
        values[idx] = bad;
        prop_assert!(boxcox(&values, 0.5).is_err());
    }

    /// Ensemble predictions do not depend on member order.
    #[test]
    fn aggregation_ignores_member_order(
        values in prop::collection::vec(-50.0..50.0_f64, 1..20),
        rotation in 0usize..20,
    ) {
        let batch = vec![vec![1.0, 2.0, 3.0, 4.0]; 3];
        let members: Vec<EnsembleMember<ConstantTree>> = values
            .iter()
            .map(|&v| EnsembleMember::new(ConstantTree(v), vec![Interval { start: 0, end: 4 }]))
            .collect();
        let mut shuffled = members.clone();
        shuffled.rotate_left(rotation % members.len());
        shuffled.reverse();

        let pool = WorkerPool::sequential();
        let a = aggregate_predictions(&batch, &members, 4, &pool).unwrap();
        let b = aggregate_predictions(&batch, &shuffled, 4, &pool).unwrap();
        let expected = values.iter().sum::<f64>() / values.len() as f64;

        for (x, y) in a.iter().zip(b.iter()) {
            prop_assert!((x - y).abs() < 1e-9);
            prop_assert!((x - expected).abs() < 1e-9);
        }
    }

    /// Sampled intervals always fit the series and honour the minimum width.
    #[test]
    fn sampled_intervals_fit(
        seed in any::<u64>(),
        series_length in 1usize..300,
        min_interval in 1usize..10,
    ) {
        let n_intervals = ((series_length as f64).sqrt() as usize).max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let intervals = sample_intervals(&mut rng, n_intervals, min_interval, series_length);

        prop_assert_eq!(intervals.len(), n_intervals);
        for interval in &intervals {
            prop_assert!(interval.end <= series_length);
            prop_assert!(interval.len() >= min_interval.min(series_length));
        }

        let batch = vec![vec![1.0; series_length]; 2];
        let features = interval_features(&batch, &intervals).unwrap();
        prop_assert_eq!(features[0].len(), FEATURES_PER_INTERVAL * n_intervals);
    }
}
