//! Box-Cox lambda estimation.
//!
//! Lambda is found by minimizing one of three scalar objectives:
//!
//! * **PearsonR** - `1 - r`, where `r` correlates the sorted transformed
//!   sample with normal order-statistic quantiles
//! * **Mle** - the negated Box-Cox log-likelihood
//! * **Guerrero** - the coefficient of variation of per-season
//!   `std / mean^(1 - lambda)` ratios
//!
//! All objectives go through [`LambdaOptimizer`], which runs Brent's method
//! from the bracket `(-2, 2)` when no bounds are given and a bounded search
//! otherwise.

use std::str::FromStr;

use crate::error::{Result, TsmlError};
use crate::transform::boxcox::{boxcox_llf_unchecked, boxcox_unchecked, check_boxcox_input};
use crate::utils::optimization::{bounded_brent, brent, BoundedConfig, BrentConfig};
use crate::utils::stats::{
    coefficient_of_variation, mean, pearson_r, quantile_normal, std_dev,
    uniform_order_statistic_medians,
};

/// Initial bracket for the unconstrained lambda search.
pub const DEFAULT_BRACKET: (f64, f64) = (-2.0, 2.0);

/// Lambda estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LambdaMethod {
    /// Maximize the probability-plot correlation with the normal distribution.
    PearsonR,
    /// Maximize the Box-Cox log-likelihood.
    #[default]
    Mle,
    /// Guerrero's seasonal variance-stabilization criterion.
    Guerrero {
        /// Number of observations per season, at least 2.
        seasonal_period: usize,
    },
}

impl LambdaMethod {
    /// Guerrero method, validating the seasonal period.
    pub fn guerrero(seasonal_period: Option<usize>) -> Result<Self> {
        match seasonal_period {
            Some(sp) if sp >= 2 => Ok(Self::Guerrero {
                seasonal_period: sp,
            }),
            _ => Err(guerrero_period_error()),
        }
    }

    /// Look up a method by name.
    ///
    /// `seasonal_period` is only used by `"guerrero"`. The name `"all"` is
    /// rejected because it yields two estimates; use [`estimate_lambda_all`].
    pub fn from_name(name: &str, seasonal_period: Option<usize>) -> Result<Self> {
        match name {
            "pearsonr" => Ok(Self::PearsonR),
            "mle" => Ok(Self::Mle),
            "guerrero" => Self::guerrero(seasonal_period),
            "all" => Err(TsmlError::InvalidParameter(
                "method 'all' returns two estimates, use estimate_lambda_all".to_string(),
            )),
            other => Err(TsmlError::InvalidParameter(format!(
                "method '{}' not recognized",
                other
            ))),
        }
    }

    /// The method name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PearsonR => "pearsonr",
            Self::Mle => "mle",
            Self::Guerrero { .. } => "guerrero",
        }
    }
}

impl FromStr for LambdaMethod {
    type Err = TsmlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s, None)
    }
}

/// Closed search interval `[low, high]` for lambda.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    low: f64,
    high: f64,
}

impl Bounds {
    /// Create bounds, requiring finite endpoints with `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(TsmlError::InvalidParameter(format!(
                "bounds must be finite, got ({}, {})",
                low, high
            )));
        }
        if low >= high {
            return Err(TsmlError::InvalidParameter(format!(
                "lower bound must be below upper bound, got ({}, {})",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Create bounds from a slice that must hold exactly two values.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [low, high] => Self::new(*low, *high),
            _ => Err(TsmlError::InvalidParameter(format!(
                "bounds must have length 2, got {}",
                values.len()
            ))),
        }
    }

    /// Lower bound.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Whether `value` lies in `[low, high]`.
    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

impl TryFrom<(f64, f64)> for Bounds {
    type Error = TsmlError;

    fn try_from(value: (f64, f64)) -> Result<Self> {
        Self::new(value.0, value.1)
    }
}

/// Scalar minimizer used by every lambda objective.
#[derive(Debug, Clone)]
pub enum LambdaOptimizer {
    /// Brent's method started from a bracket.
    Unbounded {
        bracket: (f64, f64),
        config: BrentConfig,
    },
    /// Bounded Brent search.
    Bounded {
        bounds: Bounds,
        config: BoundedConfig,
    },
}

impl LambdaOptimizer {
    /// Pick the minimizer for the given bounds.
    pub fn new(bounds: Option<Bounds>) -> Self {
        match bounds {
            None => Self::Unbounded {
                bracket: DEFAULT_BRACKET,
                config: BrentConfig::default(),
            },
            Some(bounds) => Self::Bounded {
                bounds,
                config: BoundedConfig::default(),
            },
        }
    }

    /// Minimize `objective`, returning the minimizing lambda.
    pub fn minimize<F>(&self, objective: F) -> Result<f64>
    where
        F: Fn(f64) -> f64,
    {
        let result = match self {
            Self::Unbounded { bracket, config } => brent(objective, *bracket, config)?,
            Self::Bounded { bounds, config } => {
                bounded_brent(objective, bounds.low(), bounds.high(), config)?
            }
        };
        Ok(result.x)
    }
}

/// Estimate the Box-Cox lambda for a series.
///
/// # Errors
/// * [`TsmlError::EmptyData`] for an empty series
/// * [`TsmlError::ConstantData`] / [`TsmlError::NonPositiveData`] when the
///   series cannot be transformed
/// * [`TsmlError::InvalidParameter`] for a Guerrero period below 2
/// * [`TsmlError::InsufficientData`] for Guerrero with fewer than two seasons
///
/// # Example
/// ```
/// use anofox_tsml::transform::{estimate_lambda, LambdaMethod};
///
/// let series: Vec<f64> = (1..=50).map(|i| (i as f64 * 0.1).exp()).collect();
/// let lambda = estimate_lambda(&series, LambdaMethod::Mle, None).unwrap();
/// assert!(lambda.abs() < 0.5);
/// ```
pub fn estimate_lambda(
    series: &[f64],
    method: LambdaMethod,
    bounds: Option<Bounds>,
) -> Result<f64> {
    let optimizer = LambdaOptimizer::new(bounds);
    let lambda = match method {
        LambdaMethod::PearsonR => pearsonr_lambda(series, &optimizer)?,
        LambdaMethod::Mle => mle_lambda(series, &optimizer)?,
        LambdaMethod::Guerrero { seasonal_period } => {
            guerrero_lambda(series, seasonal_period, &optimizer)?
        }
    };
    log::debug!(
        "box-cox lambda estimated by {} on {} observations: {}",
        method.name(),
        series.len(),
        lambda
    );
    Ok(lambda)
}

/// Estimate lambda with both the PearsonR and the Mle methods.
///
/// Returns `(pearsonr_lambda, mle_lambda)`.
pub fn estimate_lambda_all(series: &[f64], bounds: Option<Bounds>) -> Result<(f64, f64)> {
    let pearsonr = estimate_lambda(series, LambdaMethod::PearsonR, bounds)?;
    let mle = estimate_lambda(series, LambdaMethod::Mle, bounds)?;
    Ok((pearsonr, mle))
}

fn pearsonr_lambda(series: &[f64], optimizer: &LambdaOptimizer) -> Result<f64> {
    check_estimation_input(series)?;

    let xvals: Vec<f64> = uniform_order_statistic_medians(series.len())
        .into_iter()
        .map(quantile_normal)
        .collect();

    optimizer.minimize(|lambda| {
        let mut yvals = boxcox_unchecked(series, lambda);
        yvals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        finite_or_max(1.0 - pearson_r(&xvals, &yvals))
    })
}

fn mle_lambda(series: &[f64], optimizer: &LambdaOptimizer) -> Result<f64> {
    check_estimation_input(series)?;
    optimizer.minimize(|lambda| finite_or_max(-boxcox_llf_unchecked(series, lambda)))
}

fn guerrero_lambda(
    series: &[f64],
    seasonal_period: usize,
    optimizer: &LambdaOptimizer,
) -> Result<f64> {
    if seasonal_period < 2 {
        return Err(guerrero_period_error());
    }
    if series.is_empty() {
        return Err(TsmlError::EmptyData);
    }
    let n_seasons = series.len() / seasonal_period;
    if n_seasons < 2 {
        return Err(TsmlError::InsufficientData {
            needed: 2 * seasonal_period,
            got: series.len(),
        });
    }

    // Drop the leading partial season
    let trimmed = &series[series.len() % seasonal_period..];
    check_boxcox_input(trimmed)?;

    let (means, stds): (Vec<f64>, Vec<f64>) = trimmed
        .chunks_exact(seasonal_period)
        .map(|season| (mean(season), std_dev(season)))
        .unzip();

    if stds.iter().all(|&s| s == 0.0) {
        return Err(TsmlError::ComputationError(
            "every season has zero variance".to_string(),
        ));
    }

    optimizer.minimize(|lambda| {
        let ratios: Vec<f64> = stds
            .iter()
            .zip(means.iter())
            .map(|(s, m)| s / m.powf(1.0 - lambda))
            .collect();
        finite_or_max(coefficient_of_variation(&ratios))
    })
}

fn check_estimation_input(series: &[f64]) -> Result<()> {
    if series.is_empty() {
        return Err(TsmlError::EmptyData);
    }
    check_boxcox_input(series)
}

fn guerrero_period_error() -> TsmlError {
    TsmlError::InvalidParameter(
        "Guerrero method requires an integer seasonal period >= 2".to_string(),
    )
}

/// Map NaN and infinite objective values to `f64::MAX` so the minimizers
/// treat them as uphill.
#[inline]
fn finite_or_max(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn normal_scores(n: usize) -> Vec<f64> {
        uniform_order_statistic_medians(n)
            .into_iter()
            .map(quantile_normal)
            .collect()
    }

    fn multiplicative_seasonal(n_seasons: usize, period: usize) -> Vec<f64> {
        // Seasonal amplitude proportional to the season level
        (0..n_seasons)
            .flat_map(|k| {
                let level = 10.0 * 1.25_f64.powi(k as i32);
                (0..period).map(move |j| {
                    let phase = 2.0 * std::f64::consts::PI * j as f64 / period as f64;
                    level * (1.0 + 0.3 * phase.sin())
                })
            })
            .collect()
    }

    fn additive_seasonal(n_seasons: usize, period: usize) -> Vec<f64> {
        // Same seasonal amplitude at every level
        (0..n_seasons)
            .flat_map(|k| {
                let level = 50.0 + 15.0 * k as f64;
                (0..period).map(move |j| {
                    let phase = 2.0 * std::f64::consts::PI * j as f64 / period as f64;
                    level + 5.0 * phase.sin()
                })
            })
            .collect()
    }

    // ==================== LambdaMethod ====================

    #[test]
    fn method_from_name() {
        assert_eq!("pearsonr".parse::<LambdaMethod>().unwrap(), LambdaMethod::PearsonR);
        assert_eq!("mle".parse::<LambdaMethod>().unwrap(), LambdaMethod::Mle);
        assert_eq!(
            LambdaMethod::from_name("guerrero", Some(12)).unwrap(),
            LambdaMethod::Guerrero {
                seasonal_period: 12
            }
        );
    }

    #[test]
    fn method_unknown_name_rejected() {
        assert!(matches!(
            "yeo-johnson".parse::<LambdaMethod>(),
            Err(TsmlError::InvalidParameter(_))
        ));
        assert!(matches!(
            "all".parse::<LambdaMethod>(),
            Err(TsmlError::InvalidParameter(_))
        ));
    }

    #[test]
    fn guerrero_requires_seasonal_period() {
        assert!(matches!(
            LambdaMethod::from_name("guerrero", None),
            Err(TsmlError::InvalidParameter(_))
        ));
        assert!(matches!(
            "guerrero".parse::<LambdaMethod>(),
            Err(TsmlError::InvalidParameter(_))
        ));
        assert!(matches!(
            LambdaMethod::guerrero(Some(1)),
            Err(TsmlError::InvalidParameter(_))
        ));
    }

    // ==================== Bounds ====================

    #[test]
    fn bounds_wrong_arity_rejected() {
        assert!(matches!(
            Bounds::from_slice(&[1.0, 2.0, 3.0]),
            Err(TsmlError::InvalidParameter(_))
        ));
        assert!(matches!(
            Bounds::from_slice(&[1.0]),
            Err(TsmlError::InvalidParameter(_))
        ));
        let bounds = Bounds::from_slice(&[-1.0, 2.0]).unwrap();
        assert_eq!(bounds.low(), -1.0);
        assert_eq!(bounds.high(), 2.0);
    }

    #[test]
    fn bounds_reversed_rejected() {
        assert!(matches!(
            Bounds::new(2.0, -2.0),
            Err(TsmlError::InvalidParameter(_))
        ));
        assert!(matches!(
            Bounds::try_from((1.0, 1.0)),
            Err(TsmlError::InvalidParameter(_))
        ));
        assert!(Bounds::new(f64::NEG_INFINITY, 1.0).is_err());
    }

    // ==================== LambdaOptimizer ====================

    #[test]
    fn optimizer_selection() {
        assert!(matches!(
            LambdaOptimizer::new(None),
            LambdaOptimizer::Unbounded { bracket, .. } if bracket == DEFAULT_BRACKET
        ));
        let bounds = Bounds::new(-1.0, 1.0).unwrap();
        assert!(matches!(
            LambdaOptimizer::new(Some(bounds)),
            LambdaOptimizer::Bounded { .. }
        ));
    }

    #[test]
    fn optimizer_bounded_clips_to_interval() {
        let bounds = Bounds::new(-1.0, 1.0).unwrap();
        let x = LambdaOptimizer::new(Some(bounds))
            .minimize(|l| (l - 3.0).powi(2))
            .unwrap();
        assert!(bounds.contains(x));
        assert_relative_eq!(x, 1.0, epsilon = 1e-4);

        let x = LambdaOptimizer::new(None)
            .minimize(|l| (l - 3.0).powi(2))
            .unwrap();
        assert_relative_eq!(x, 3.0, epsilon = 1e-6);
    }

    // ==================== PearsonR ====================

    #[test]
    fn pearsonr_recovers_log_transform() {
        // ln(x) matches the normal scores exactly, so lambda = 0 gives r = 1
        let series: Vec<f64> = normal_scores(40).into_iter().map(f64::exp).collect();
        let lambda = estimate_lambda(&series, LambdaMethod::PearsonR, None).unwrap();
        assert!(lambda.abs() < 1e-3, "got {}", lambda);
    }

    #[test]
    fn pearsonr_recovers_square_root() {
        // sqrt(x) is linear in the normal scores, so lambda = 0.5
        let series: Vec<f64> = normal_scores(40)
            .into_iter()
            .map(|z| (10.0 + z).powi(2))
            .collect();
        let lambda = estimate_lambda(&series, LambdaMethod::PearsonR, None).unwrap();
        assert_relative_eq!(lambda, 0.5, epsilon = 1e-3);
    }

    // ==================== Mle ====================

    #[test]
    fn mle_prefers_log_for_lognormal_scores() {
        let series: Vec<f64> = normal_scores(60).into_iter().map(f64::exp).collect();
        let lambda = estimate_lambda(&series, LambdaMethod::Mle, None).unwrap();
        assert!(lambda.abs() < 0.2, "got {}", lambda);
    }

    #[test]
    fn mle_is_likelihood_maximum() {
        let series: Vec<f64> = (1..=50).map(|i| 3.0 + (i as f64).powf(1.4)).collect();
        let lambda = estimate_lambda(&series, LambdaMethod::Mle, None).unwrap();
        let best = boxcox_llf_unchecked(&series, lambda);
        for delta in [-0.05, 0.05] {
            assert!(boxcox_llf_unchecked(&series, lambda + delta) < best);
        }
    }

    #[test]
    fn mle_with_bounds_stays_inside() {
        let series: Vec<f64> = normal_scores(60).into_iter().map(f64::exp).collect();
        let bounds = Bounds::new(0.5, 2.0).unwrap();
        let lambda = estimate_lambda(&series, LambdaMethod::Mle, Some(bounds)).unwrap();
        assert!(bounds.contains(lambda));
        assert_relative_eq!(lambda, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn estimation_rejects_bad_data() {
        assert_eq!(
            estimate_lambda(&[1.0, -2.0, 3.0], LambdaMethod::Mle, None),
            Err(TsmlError::NonPositiveData)
        );
        assert_eq!(
            estimate_lambda(&[5.0, 5.0, 5.0, 5.0], LambdaMethod::PearsonR, None),
            Err(TsmlError::ConstantData)
        );
        assert_eq!(
            estimate_lambda(&[], LambdaMethod::Mle, None),
            Err(TsmlError::EmptyData)
        );
    }

    // ==================== all ====================

    #[test]
    fn all_matches_individual_methods() {
        let series: Vec<f64> = (1..=40).map(|i| 1.0 + (i as f64).powf(1.8)).collect();
        let (pearsonr, mle) = estimate_lambda_all(&series, None).unwrap();
        let p = estimate_lambda(&series, LambdaMethod::PearsonR, None).unwrap();
        let m = estimate_lambda(&series, LambdaMethod::Mle, None).unwrap();
        assert_relative_eq!(pearsonr, p, epsilon = 1e-12);
        assert_relative_eq!(mle, m, epsilon = 1e-12);
    }

    // ==================== Guerrero ====================

    #[test]
    fn guerrero_multiplicative_seasonality_gives_log() {
        let series = multiplicative_seasonal(8, 12);
        let method = LambdaMethod::guerrero(Some(12)).unwrap();
        let lambda = estimate_lambda(&series, method, None).unwrap();
        assert!(lambda.abs() < 0.05, "got {}", lambda);
    }

    #[test]
    fn guerrero_additive_seasonality_gives_identity() {
        let series = additive_seasonal(8, 4);
        let method = LambdaMethod::guerrero(Some(4)).unwrap();
        let lambda = estimate_lambda(&series, method, None).unwrap();
        assert_relative_eq!(lambda, 1.0, epsilon = 0.05);
    }

    #[test]
    fn guerrero_trims_leading_partial_season() {
        let mut series = vec![3.0, 700.0, 0.5];
        series.extend(multiplicative_seasonal(6, 12));
        let method = LambdaMethod::Guerrero {
            seasonal_period: 12,
        };
        let with_prefix = estimate_lambda(&series, method, None).unwrap();
        let without_prefix = estimate_lambda(&series[3..], method, None).unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn guerrero_with_bounds() {
        let series = multiplicative_seasonal(8, 12);
        let method = LambdaMethod::Guerrero {
            seasonal_period: 12,
        };
        let bounds = Bounds::new(0.2, 1.0).unwrap();
        let lambda = estimate_lambda(&series, method, Some(bounds)).unwrap();
        assert!(bounds.contains(lambda));
        assert_relative_eq!(lambda, 0.2, epsilon = 1e-3);
    }

    #[test]
    fn guerrero_rejects_invalid_period() {
        let series = multiplicative_seasonal(4, 12);
        let result = estimate_lambda(
            &series,
            LambdaMethod::Guerrero { seasonal_period: 1 },
            None,
        );
        assert!(matches!(result, Err(TsmlError::InvalidParameter(_))));
    }

    #[test]
    fn guerrero_needs_two_seasons() {
        let series = multiplicative_seasonal(1, 12);
        let result = estimate_lambda(
            &series,
            LambdaMethod::Guerrero {
                seasonal_period: 12,
            },
            None,
        );
        assert_eq!(
            result,
            Err(TsmlError::InsufficientData {
                needed: 24,
                got: 12
            })
        );
    }

    #[test]
    fn guerrero_rejects_non_positive() {
        let mut series = multiplicative_seasonal(4, 4);
        series[7] = -1.0;
        let result = estimate_lambda(
            &series,
            LambdaMethod::Guerrero { seasonal_period: 4 },
            None,
        );
        assert_eq!(result, Err(TsmlError::NonPositiveData));
    }
}
