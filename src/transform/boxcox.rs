//! Box-Cox power transformation.
//!
//! Transforms strictly positive data to be more normally distributed and
//! stabilizes its variance.

use crate::error::{Result, TsmlError};
use crate::transform::lambda::{estimate_lambda, Bounds, LambdaMethod};
use crate::utils::optimization::{brentq, RootConfig};
use crate::utils::stats::{quantile_chi2_1df, variance_ddof};

/// Maximum number of 0.1 steps taken when searching for a confidence limit.
const CI_MAX_STEPS: usize = 500;

/// Result of a self-fitting Box-Cox transformation.
#[derive(Debug, Clone)]
pub struct BoxCoxResult {
    /// Transformed data
    pub data: Vec<f64>,
    /// Lambda parameter used
    pub lambda: f64,
    /// Confidence interval for lambda, when a significance level was given
    pub conf_interval: Option<(f64, f64)>,
}

impl BoxCoxResult {
    /// Inverse transform to recover original scale.
    pub fn inverse(&self) -> Vec<f64> {
        inv_boxcox(&self.data, self.lambda)
    }
}

/// Check that data can be Box-Cox transformed.
///
/// Empty input passes. Constant input fails with [`TsmlError::ConstantData`],
/// any non-positive value with [`TsmlError::NonPositiveData`].
pub fn check_boxcox_input(series: &[f64]) -> Result<()> {
    let Some(&first) = series.first() else {
        return Ok(());
    };
    if series.iter().all(|&x| x == first) {
        return Err(TsmlError::ConstantData);
    }
    if series.iter().any(|&x| x <= 0.0) {
        return Err(TsmlError::NonPositiveData);
    }
    Ok(())
}

/// Check if data is suitable for Box-Cox transformation.
///
/// Returns true if the data is non-empty, all values are positive and not
/// all values are equal.
pub fn is_boxcox_suitable(series: &[f64]) -> bool {
    !series.is_empty() && check_boxcox_input(series).is_ok()
}

/// Apply Box-Cox transformation with a given lambda.
///
/// For lambda != 0: y = (x^lambda - 1) / lambda
/// For lambda == 0: y = ln(x)
///
/// # Errors
/// * [`TsmlError::ConstantData`] if all values are equal
/// * [`TsmlError::NonPositiveData`] if any value is zero or negative
///
/// Empty input is returned unchanged.
pub fn boxcox(series: &[f64], lambda: f64) -> Result<Vec<f64>> {
    check_boxcox_input(series)?;
    Ok(boxcox_unchecked(series, lambda))
}

/// Box-Cox without input validation, used inside objective functions.
pub(crate) fn boxcox_unchecked(series: &[f64], lambda: f64) -> Vec<f64> {
    series.iter().map(|&x| boxcox_value(x, lambda)).collect()
}

#[inline]
fn boxcox_value(x: f64, lambda: f64) -> f64 {
    if lambda == 0.0 {
        x.ln()
    } else {
        // expm1 keeps precision when lambda * ln(x) is small
        (lambda * x.ln()).exp_m1() / lambda
    }
}

/// Inverse Box-Cox transformation.
///
/// For lambda != 0: x = (lambda * y + 1)^(1/lambda)
/// For lambda == 0: x = exp(y)
///
/// Values with `lambda * y + 1 <= 0` are outside the image of the forward
/// transform and map to NaN.
pub fn inv_boxcox(transformed: &[f64], lambda: f64) -> Vec<f64> {
    transformed
        .iter()
        .map(|&y| {
            if lambda == 0.0 {
                y.exp()
            } else {
                let val = lambda * y;
                if val <= -1.0 {
                    f64::NAN
                } else {
                    (val.ln_1p() / lambda).exp()
                }
            }
        })
        .collect()
}

/// Box-Cox log-likelihood of the data for a given lambda.
///
/// `llf = (lambda - 1) * sum(ln x) - n/2 * ln(var(y))`, where `var` is the
/// population variance of the transformed data.
pub fn boxcox_llf(series: &[f64], lambda: f64) -> Result<f64> {
    if series.is_empty() {
        return Err(TsmlError::EmptyData);
    }
    check_boxcox_input(series)?;
    Ok(boxcox_llf_unchecked(series, lambda))
}

pub(crate) fn boxcox_llf_unchecked(series: &[f64], lambda: f64) -> f64 {
    let n = series.len() as f64;
    let transformed = boxcox_unchecked(series, lambda);
    let variance = variance_ddof(&transformed, 0);
    if variance.is_nan() || variance <= 0.0 || variance.is_infinite() {
        return f64::NEG_INFINITY;
    }
    let log_sum: f64 = series.iter().map(|x| x.ln()).sum();

    (lambda - 1.0) * log_sum - 0.5 * n * variance.ln()
}

/// Apply Box-Cox transformation with automatic lambda selection.
///
/// Lambda maximizes the log-likelihood, searched within `bounds` when given.
/// When `alpha` is given, also returns the `100 * (1 - alpha)%` confidence
/// interval for lambda.
///
/// # Example
/// ```
/// use anofox_tsml::transform::boxcox_auto;
///
/// let series: Vec<f64> = (1..=30).map(|i| (i as f64 * 0.2).exp()).collect();
/// let result = boxcox_auto(&series, None, Some(0.05)).unwrap();
/// let (low, high) = result.conf_interval.unwrap();
/// assert!(low < result.lambda && result.lambda < high);
/// ```
pub fn boxcox_auto(
    series: &[f64],
    bounds: Option<Bounds>,
    alpha: Option<f64>,
) -> Result<BoxCoxResult> {
    if let Some(alpha) = alpha {
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(TsmlError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                alpha
            )));
        }
    }

    let lambda = estimate_lambda(series, LambdaMethod::Mle, bounds)?;
    let data = boxcox(series, lambda)?;
    let conf_interval = match alpha {
        Some(alpha) => Some(boxcox_conf_interval(series, lambda, alpha)?),
        None => None,
    };

    Ok(BoxCoxResult {
        data,
        lambda,
        conf_interval,
    })
}

/// Confidence interval for the maximum likelihood lambda `lmax`.
///
/// The interval holds every lambda with
/// `llf(lmax) - llf(lambda) < chi2(1 - alpha, 1) / 2`.
pub fn boxcox_conf_interval(series: &[f64], lmax: f64, alpha: f64) -> Result<(f64, f64)> {
    if series.is_empty() {
        return Err(TsmlError::EmptyData);
    }
    check_boxcox_input(series)?;

    let fac = 0.5 * quantile_chi2_1df(1.0 - alpha);
    let target = boxcox_llf_unchecked(series, lmax) - fac;
    let rootfunc = |lambda: f64| boxcox_llf_unchecked(series, lambda) - target;
    let config = RootConfig::default();

    let upper_end = find_endpoint(&rootfunc, lmax + 0.5, 0.1)?;
    let upper = brentq(&rootfunc, lmax, upper_end, &config)?;

    let lower_end = find_endpoint(&rootfunc, lmax - 0.5, -0.1)?;
    let lower = brentq(&rootfunc, lower_end, lmax, &config)?;

    log::debug!(
        "box-cox lambda {:.6} confidence interval ({:.6}, {:.6}) at alpha {}",
        lmax,
        lower,
        upper,
        alpha
    );
    Ok((lower, upper))
}

fn find_endpoint<F>(rootfunc: F, start: f64, step: f64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut lambda = start;
    let mut steps = 0;
    while rootfunc(lambda) > 0.0 && steps < CI_MAX_STEPS {
        lambda += step;
        steps += 1;
    }
    if steps == CI_MAX_STEPS {
        return Err(TsmlError::ComputationError(
            "could not find confidence interval endpoint".to_string(),
        ));
    }
    Ok(lambda)
}

/// Box-Cox transformer configuration: how lambda is estimated.
///
/// Fitting produces a [`FittedBoxCox`] holding the estimated lambda, so a
/// transformer can never be used for transformation before it is fitted.
///
/// # Example
/// ```
/// use anofox_tsml::transform::{BoxCoxTransformer, Bounds, LambdaMethod};
///
/// let series: Vec<f64> = (1..=48).map(|i| 10.0 + (i as f64).powf(1.5)).collect();
/// let transformer = BoxCoxTransformer::new()
///     .with_method(LambdaMethod::PearsonR)
///     .with_bounds(Bounds::new(-1.0, 2.0).unwrap());
///
/// let fitted = transformer.fit(&series).unwrap();
/// let transformed = fitted.transform(&series).unwrap();
/// let restored = fitted.inverse_transform(&transformed);
/// assert!((restored[10] - series[10]).abs() < 1e-8);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxCoxTransformer {
    method: LambdaMethod,
    bounds: Option<Bounds>,
}

impl BoxCoxTransformer {
    /// Create a transformer using maximum likelihood without bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lambda estimation method.
    pub fn with_method(mut self, method: LambdaMethod) -> Self {
        self.method = method;
        self
    }

    /// Restrict the lambda search to the given bounds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Get the estimation method.
    pub fn method(&self) -> LambdaMethod {
        self.method
    }

    /// Get the search bounds, if any.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Estimate lambda from the series.
    pub fn fit(&self, series: &[f64]) -> Result<FittedBoxCox> {
        let lambda = estimate_lambda(series, self.method, self.bounds)?;
        Ok(FittedBoxCox { lambda })
    }

    /// Estimate lambda and transform the same series.
    pub fn fit_transform(&self, series: &[f64]) -> Result<(FittedBoxCox, Vec<f64>)> {
        let fitted = self.fit(series)?;
        let transformed = fitted.transform(series)?;
        Ok((fitted, transformed))
    }
}

/// A Box-Cox transform with a fixed lambda.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedBoxCox {
    lambda: f64,
}

impl FittedBoxCox {
    /// Use a known lambda.
    pub fn from_lambda(lambda: f64) -> Result<Self> {
        if !lambda.is_finite() {
            return Err(TsmlError::InvalidParameter(format!(
                "lambda must be finite, got {}",
                lambda
            )));
        }
        Ok(Self { lambda })
    }

    /// The fitted lambda.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Apply the forward transform.
    pub fn transform(&self, series: &[f64]) -> Result<Vec<f64>> {
        boxcox(series, self.lambda)
    }

    /// Apply the inverse transform.
    pub fn inverse_transform(&self, transformed: &[f64]) -> Vec<f64> {
        inv_boxcox(transformed, self.lambda)
    }
}
