//! Scalar optimization utilities for parameter estimation.
//!
//! Provides derivative-free 1-D minimizers (Brent's method with automatic
//! bracketing, and a bounded variant) and Brent's root finder.

use crate::error::{Result, TsmlError};

const GOLDEN: f64 = 1.618034;
const CGOLD: f64 = 0.381_966_0;
const VERY_SMALL: f64 = 1e-21;

/// Result of a scalar minimization.
#[derive(Debug, Clone, Copy)]
pub struct ScalarMinimum {
    /// The minimizing abscissa.
    pub x: f64,
    /// The objective function value at `x`.
    pub fun: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the tolerance was met before the iteration budget ran out.
    pub converged: bool,
}

/// Configuration for unconstrained Brent minimization.
#[derive(Debug, Clone)]
pub struct BrentConfig {
    /// Relative tolerance on the abscissa.
    pub tol: f64,
    /// Maximum number of Brent iterations.
    pub max_iter: usize,
    /// Maximum number of bracket expansion steps.
    pub max_bracket_iter: usize,
    /// Maximum parabolic step, as a multiple of the current bracket width.
    pub grow_limit: f64,
}

impl Default for BrentConfig {
    fn default() -> Self {
        Self {
            tol: 1.48e-8,
            max_iter: 500,
            max_bracket_iter: 1000,
            grow_limit: 110.0,
        }
    }
}

/// Configuration for bounded Brent minimization.
#[derive(Debug, Clone)]
pub struct BoundedConfig {
    /// Absolute tolerance on the abscissa.
    pub xatol: f64,
    /// Maximum number of function evaluations.
    pub max_fun: usize,
}

impl Default for BoundedConfig {
    fn default() -> Self {
        Self {
            xatol: 1e-5,
            max_fun: 500,
        }
    }
}

/// Configuration for Brent root finding.
#[derive(Debug, Clone)]
pub struct RootConfig {
    /// Absolute tolerance.
    pub xtol: f64,
    /// Relative tolerance.
    pub rtol: f64,
    /// Maximum number of iterations.
    pub max_iter: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

/// Three points `xa, xb, xc` with `f(xb) <= f(xa)` and `f(xb) <= f(xc)`.
#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    pub xa: f64,
    pub xb: f64,
    pub xc: f64,
    pub fa: f64,
    pub fb: f64,
    pub fc: f64,
}

/// Search downhill from `(xa, xb)` for a triple bracketing a minimum.
///
/// Steps grow by the golden ratio with parabolic extrapolation, each
/// parabolic step limited to `grow_limit` times the current width.
pub fn bracket<F>(objective: F, xa: f64, xb: f64, config: &BrentConfig) -> Result<Bracket>
where
    F: Fn(f64) -> f64,
{
    let (mut xa, mut xb) = (xa, xb);
    let mut fa = objective(xa);
    let mut fb = objective(xb);
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut xc = xb + GOLDEN * (xb - xa);
    let mut fc = objective(xc);

    let mut iter = 0;
    while fc < fb {
        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < VERY_SMALL {
            2.0 * VERY_SMALL
        } else {
            2.0 * val
        };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + config.grow_limit * (xc - xb);

        if iter > config.max_bracket_iter {
            return Err(TsmlError::ComputationError(
                "bracket search exceeded maximum iterations".to_string(),
            ));
        }
        iter += 1;

        let mut fw;
        if (w - xc) * (xb - w) > 0.0 {
            fw = objective(w);
            if fw < fc {
                return Ok(Bracket {
                    xa: xb,
                    xb: w,
                    xc,
                    fa: fb,
                    fb: fw,
                    fc,
                });
            } else if fw > fb {
                return Ok(Bracket {
                    xa,
                    xb,
                    xc: w,
                    fa,
                    fb,
                    fc: fw,
                });
            }
            w = xc + GOLDEN * (xc - xb);
            fw = objective(w);
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = objective(w);
        } else if (w - wlim) * (xc - w) > 0.0 {
            fw = objective(w);
            if fw < fc {
                xb = xc;
                xc = w;
                w = xc + GOLDEN * (xc - xb);
                fb = fc;
                fc = fw;
                fw = objective(w);
            }
        } else {
            w = xc + GOLDEN * (xc - xb);
            fw = objective(w);
        }

        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }

    Ok(Bracket {
        xa,
        xb,
        xc,
        fa,
        fb,
        fc,
    })
}

/// Minimize a scalar function with Brent's method, bracketing from `brack`.
///
/// # Example
/// ```
/// use anofox_tsml::utils::optimization::{brent, BrentConfig};
///
/// let result = brent(|x| (x - 0.7).powi(2), (-2.0, 2.0), &BrentConfig::default()).unwrap();
/// assert!((result.x - 0.7).abs() < 1e-6);
/// ```
pub fn brent<F>(objective: F, brack: (f64, f64), config: &BrentConfig) -> Result<ScalarMinimum>
where
    F: Fn(f64) -> f64,
{
    const MIN_TOL: f64 = 1.0e-11;

    let br = bracket(&objective, brack.0, brack.1, config)?;
    log::debug!(
        "brent bracket: ({:.6}, {:.6}, {:.6})",
        br.xa,
        br.xb,
        br.xc
    );

    let (mut a, mut b) = if br.xa < br.xc {
        (br.xa, br.xc)
    } else {
        (br.xc, br.xa)
    };
    let (mut x, mut w, mut v) = (br.xb, br.xb, br.xb);
    let (mut fx, mut fw, mut fv) = (br.fb, br.fb, br.fb);
    let mut deltax: f64 = 0.0;
    let mut rat: f64 = 0.0;

    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.max_iter {
        let tol1 = config.tol * x.abs() + MIN_TOL;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);
        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            converged = true;
            break;
        }

        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = CGOLD * deltax;
        } else {
            // Parabolic step through (v, w, x)
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let dx_temp = deltax;
            deltax = rat;
            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * dx_temp).abs()
            {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = CGOLD * deltax;
            }
        }

        let u = if rat.abs() < tol1 {
            if rat >= 0.0 {
                x + tol1
            } else {
                x - tol1
            }
        } else {
            x + rat
        };
        let fu = objective(u);

        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
        iterations += 1;
    }

    if !converged {
        log::warn!(
            "brent reached {} iterations without converging, returning x = {}",
            config.max_iter,
            x
        );
    }

    Ok(ScalarMinimum {
        x,
        fun: fx,
        iterations,
        converged,
    })
}

/// Minimize a scalar function on the closed interval `[low, high]`.
///
/// Combines golden-section search with parabolic interpolation and never
/// evaluates the objective outside the bounds.
pub fn bounded_brent<F>(
    objective: F,
    low: f64,
    high: f64,
    config: &BoundedConfig,
) -> Result<ScalarMinimum>
where
    F: Fn(f64) -> f64,
{
    if !(low.is_finite() && high.is_finite()) {
        return Err(TsmlError::InvalidParameter(
            "bounds must be finite".to_string(),
        ));
    }
    if low > high {
        return Err(TsmlError::InvalidParameter(format!(
            "lower bound {} exceeds upper bound {}",
            low, high
        )));
    }

    let sqrt_eps = 2.2e-16_f64.sqrt();
    let golden_mean = 0.5 * (3.0 - 5.0_f64.sqrt());
    let sign = |v: f64| if v >= 0.0 { 1.0 } else { -1.0 };

    let (mut a, mut b) = (low, high);
    let mut fulc = a + golden_mean * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat: f64 = 0.0;
    let mut e: f64 = 0.0;
    let mut fx = objective(xf);
    let mut num = 1;
    let mut ffulc = fx;
    let mut fnfc = fx;
    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + config.xatol / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut converged = true;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;

        if e.abs() > tol1 {
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * sign(xm - xf);
                }
                golden = false;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden_mean * e;
        }

        let x = xf + sign(rat) * rat.abs().max(tol1);
        let fu = objective(x);
        num += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + config.xatol / 3.0;
        tol2 = 2.0 * tol1;

        if num >= config.max_fun {
            converged = false;
            break;
        }
    }

    if !converged {
        log::warn!(
            "bounded minimizer used {} evaluations without converging, returning x = {}",
            config.max_fun,
            xf
        );
    }

    Ok(ScalarMinimum {
        x: xf,
        fun: fx,
        iterations: num,
        converged,
    })
}

/// Find a root of `f` in `[a, b]` using Brent's method.
///
/// `f(a)` and `f(b)` must have opposite signs.
pub fn brentq<F>(f: F, a: f64, b: f64, config: &RootConfig) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut xpre = a;
    let mut xcur = b;
    let mut xblk = 0.0;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    if fpre * fcur > 0.0 {
        return Err(TsmlError::InvalidParameter(
            "f(a) and f(b) must have different signs".to_string(),
        ));
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    for _ in 0..config.max_iter {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (config.xtol + config.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // Secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // Inverse quadratic interpolation
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    Err(TsmlError::ComputationError(format!(
        "root finding did not converge in {} iterations",
        config.max_iter
    )))
}
