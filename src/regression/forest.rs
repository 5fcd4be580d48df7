//! Time series forest regression.
//!
//! A forest of regression trees, each trained on summary statistics (mean,
//! standard deviation, slope) of its own randomly drawn intervals. For
//! series of length `m`, every tree uses `floor(sqrt(m))` intervals. The
//! forest predicts the unweighted mean of its trees' predictions.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, TsmlError};
use crate::features::intervals::{check_batch, interval_features, sample_intervals, Interval};
use crate::regression::traits::TreeRegressor;
use crate::regression::tree::DecisionTreeRegressor;
use crate::utils::parallel::WorkerPool;

/// Configuration for the time series forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_estimators: usize,
    /// Minimum interval width.
    pub min_interval: usize,
    /// Worker count for fit and predict (`-1` for all execution units).
    pub n_jobs: isize,
    /// Random seed for reproducibility (None for random).
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            min_interval: 3,
            n_jobs: 1,
            seed: None,
        }
    }
}

impl ForestConfig {
    /// Create a config with the given number of trees.
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            ..Default::default()
        }
    }

    /// Set the minimum interval width.
    pub fn with_min_interval(mut self, min_interval: usize) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Set the worker count.
    pub fn with_n_jobs(mut self, n_jobs: isize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(TsmlError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.min_interval == 0 {
            return Err(TsmlError::InvalidParameter(
                "min_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One trained tree together with the intervals its features came from.
#[derive(Debug, Clone)]
pub struct EnsembleMember<T> {
    pub tree: T,
    pub intervals: Vec<Interval>,
}

impl<T: TreeRegressor> EnsembleMember<T> {
    pub fn new(tree: T, intervals: Vec<Interval>) -> Self {
        Self { tree, intervals }
    }

    /// Rebuild this member's features from raw series and predict.
    pub fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>> {
        let features = interval_features(batch, &self.intervals)?;
        let predictions = self.tree.predict(&features)?;
        if predictions.len() != batch.len() {
            return Err(TsmlError::DimensionMismatch {
                expected: batch.len(),
                got: predictions.len(),
            });
        }
        Ok(predictions)
    }
}

/// Average the predictions of every ensemble member.
///
/// Every series in `batch` must have length `series_length`. Members are
/// evaluated on `pool`; each contributes with equal weight and the first
/// failing member aborts the call.
///
/// # Errors
/// * [`TsmlError::EmptyData`] if there are no members or no series
/// * [`TsmlError::ShapeMismatch`] if a series length differs from `series_length`
pub fn aggregate_predictions<T: TreeRegressor>(
    batch: &[Vec<f64>],
    members: &[EnsembleMember<T>],
    series_length: usize,
    pool: &WorkerPool,
) -> Result<Vec<f64>> {
    if members.is_empty() {
        return Err(TsmlError::EmptyData);
    }
    let got = check_batch(batch)?;
    if got != series_length {
        return Err(TsmlError::ShapeMismatch {
            expected: series_length,
            got,
        });
    }

    let member_predictions = pool.map(members, |member| member.predict(batch))?;

    let mut sums = vec![0.0; batch.len()];
    for predictions in &member_predictions {
        for (sum, p) in sums.iter_mut().zip(predictions.iter()) {
            *sum += p;
        }
    }
    let n_members = members.len() as f64;
    Ok(sums.into_iter().map(|s| s / n_members).collect())
}

/// Time series forest regressor.
///
/// # Example
/// ```
/// use anofox_tsml::regression::{ForestConfig, TimeSeriesForestRegressor};
///
/// // Target is the level of each series
/// let batch: Vec<Vec<f64>> = (0..40)
///     .map(|i| (0..24).map(|t| i as f64 + (t as f64 * 0.5).sin()).collect())
///     .collect();
/// let targets: Vec<f64> = (0..40).map(|i| i as f64).collect();
///
/// let mut forest = TimeSeriesForestRegressor::new(ForestConfig::new(20).with_seed(3));
/// forest.fit(&batch, &targets).unwrap();
/// let predictions = forest.predict(&batch).unwrap();
/// assert_eq!(predictions.len(), 40);
/// ```
#[derive(Debug, Clone)]
pub struct TimeSeriesForestRegressor<T = DecisionTreeRegressor> {
    config: ForestConfig,
    base_estimator: Option<T>,
    members: Vec<EnsembleMember<T>>,
    series_length: Option<usize>,
}

impl TimeSeriesForestRegressor<DecisionTreeRegressor> {
    /// Create a forest of default regression trees.
    pub fn new(config: ForestConfig) -> Self {
        Self::with_base_estimator(config, DecisionTreeRegressor::new())
    }
}

impl<T: TreeRegressor> TimeSeriesForestRegressor<T> {
    /// Create a forest whose trees are clones of `base_estimator`.
    pub fn with_base_estimator(config: ForestConfig, base_estimator: T) -> Self {
        Self {
            config,
            base_estimator: Some(base_estimator),
            members: Vec::new(),
            series_length: None,
        }
    }

    /// Create a fitted forest from members trained elsewhere.
    ///
    /// Such a forest can predict but has no base estimator to refit with.
    pub fn from_population(
        config: ForestConfig,
        series_length: usize,
        members: Vec<EnsembleMember<T>>,
    ) -> Result<Self> {
        if members.is_empty() {
            return Err(TsmlError::EmptyData);
        }
        if series_length == 0 {
            return Err(TsmlError::InvalidParameter(
                "series_length must be positive".to_string(),
            ));
        }
        if let Some(interval) = members
            .iter()
            .flat_map(|m| m.intervals.iter())
            .find(|iv| iv.is_empty() || iv.end > series_length)
        {
            return Err(TsmlError::InvalidParameter(format!(
                "interval [{}, {}) does not fit series length {}",
                interval.start, interval.end, series_length
            )));
        }
        Ok(Self {
            config,
            base_estimator: None,
            members,
            series_length: Some(series_length),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// The fitted ensemble members.
    pub fn members(&self) -> &[EnsembleMember<T>] {
        &self.members
    }

    /// Series length seen during training.
    pub fn series_length(&self) -> Option<usize> {
        self.series_length
    }

    /// Check if the forest has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.series_length.is_some()
    }

    /// Predict one value per series: the mean of all tree predictions.
    ///
    /// # Errors
    /// * [`TsmlError::FitRequired`] before `fit`
    /// * [`TsmlError::ShapeMismatch`] if a series length differs from training
    pub fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>> {
        let series_length = self.series_length.ok_or(TsmlError::FitRequired)?;
        let pool = WorkerPool::new(self.config.n_jobs)?;
        aggregate_predictions(batch, &self.members, series_length, &pool)
    }
}

impl<T: TreeRegressor + Clone> TimeSeriesForestRegressor<T> {
    /// Fit the forest to a batch of equal-length series and their targets.
    ///
    /// On error the forest keeps its previous state.
    pub fn fit(&mut self, batch: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        self.config.validate()?;
        let base = self.base_estimator.as_ref().ok_or_else(|| {
            TsmlError::InvalidParameter(
                "forest built from a population has no base estimator to fit".to_string(),
            )
        })?;
        let series_length = check_batch(batch)?;
        if targets.len() != batch.len() {
            return Err(TsmlError::DimensionMismatch {
                expected: batch.len(),
                got: targets.len(),
            });
        }

        let n_intervals = ((series_length as f64).sqrt() as usize).max(1);
        let min_interval = self.config.min_interval.min(series_length);

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let plans: Vec<Vec<Interval>> = (0..self.config.n_estimators)
            .map(|_| sample_intervals(&mut rng, n_intervals, min_interval, series_length))
            .collect();

        let pool = WorkerPool::new(self.config.n_jobs)?;
        let members = pool.map(&plans, |intervals| {
            let features = interval_features(batch, intervals)?;
            let mut tree = base.clone();
            tree.fit(&features, targets)?;
            Ok(EnsembleMember::new(tree, intervals.clone()))
        })?;

        log::debug!(
            "fitted time series forest: {} trees, {} intervals each, series length {}, {} workers",
            members.len(),
            n_intervals,
            series_length,
            pool.n_jobs()
        );

        self.members = members;
        self.series_length = Some(series_length);
        Ok(())
    }
}
