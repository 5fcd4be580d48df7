//! Statistical utility functions.

use statrs::function::erf::erfc_inv;

/// Quantile function of the standard normal distribution.
///
/// # Arguments
/// * `p` - Probability value (0.0 to 1.0)
///
/// # Returns
/// The z-score corresponding to the given probability.
///
/// # Example
/// ```
/// use anofox_tsml::utils::quantile_normal;
///
/// // 95% confidence level -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.959964).abs() < 1e-6);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    -std::f64::consts::SQRT_2 * erfc_inv(2.0 * p)
}

/// Quantile function of the chi-square distribution with one degree of freedom.
///
/// Uses the identity `chi2_1(q) = z((1 + q) / 2)^2`.
pub fn quantile_chi2_1df(q: f64) -> f64 {
    if q <= 0.0 {
        return 0.0;
    }
    quantile_normal(0.5 * (1.0 + q)).powi(2)
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (denominator `n - ddof`).
pub fn variance_ddof(values: &[f64], ddof: usize) -> f64 {
    if values.len() <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - ddof) as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    variance_ddof(values, 1)
}

/// Calculate the standard deviation of a slice (n-1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Population standard deviation (n denominator).
pub fn population_std(values: &[f64]) -> f64 {
    variance_ddof(values, 0).sqrt()
}

/// Coefficient of variation: population standard deviation over the mean.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    population_std(values) / mean(values)
}

/// Pearson product-moment correlation of two equally sized slices.
///
/// Returns NaN when the lengths differ, fewer than two points are given,
/// or either input has zero variance.
pub fn pearson_r(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Approximate medians of the uniform order statistics for a sample of size `n`
/// (Filliben's estimate).
pub fn uniform_order_statistic_medians(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let last = 0.5_f64.powf(1.0 / n as f64);
    if n == 1 {
        return vec![last];
    }

    let mut medians = Vec::with_capacity(n);
    medians.push(1.0 - last);
    for i in 2..n {
        medians.push((i as f64 - 0.3175) / (n as f64 + 0.365));
    }
    medians.push(last);
    medians
}

/// Least-squares slope of the values against their (1-based) positions.
///
/// Returns 0.0 for fewer than two points.
pub fn slope(values: &[f64]) -> f64 {
    let m = values.len();
    if m < 2 {
        return 0.0;
    }
    let n = m as f64;
    let x_mean = (n + 1.0) / 2.0;
    let xy_mean = values
        .iter()
        .enumerate()
        .map(|(i, &y)| (i + 1) as f64 * y)
        .sum::<f64>()
        / n;
    let x2_mean = (1..=m).map(|i| (i * i) as f64).sum::<f64>() / n;

    (xy_mean - x_mean * mean(values)) / (x2_mean - x_mean * x_mean)
}
