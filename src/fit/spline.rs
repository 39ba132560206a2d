use thiserror::Error;

// ---------------------------------------------------------------------------
// Smoothing configuration
// ---------------------------------------------------------------------------

/// Residual budget contributed by each sample: the fit is allowed a total
/// squared deviation of `n * SMOOTHING_PER_POINT` from the measurements.
///
/// The value is empirical, chosen small against the data scale so the fit
/// stays within the reported uncertainties while still damping noise.
pub const SMOOTHING_PER_POINT: f64 = 5e-12;

/// Fewest points a cubic fit accepts.
const MIN_POINTS: usize = 4;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Construction failures for [`SmoothingSpline`].
#[derive(Debug, Error)]
pub enum FitError {
    #[error("need at least {MIN_POINTS} points for a cubic smoothing spline, got {0}")]
    TooFewPoints(usize),
    #[error("abscissa and ordinate lengths differ: {x} vs {y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("abscissae must be strictly increasing (violated at index {0})")]
    NotIncreasing(usize),
    #[error("non-finite input at index {0}")]
    NonFinite(usize),
    #[error("residual budget must be non-negative, got {0}")]
    NegativeBudget(f64),
}

// ---------------------------------------------------------------------------
// Evaluation result
// ---------------------------------------------------------------------------

/// The fitted value at one wavelength.
///
/// `extrapolated` is set when the wavelength lies strictly outside the
/// fitted range; the value is then the boundary segment's polynomial
/// extension and should be treated as advisory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub responsivity_a_per_w: f64,
    pub extrapolated: bool,
}

// ---------------------------------------------------------------------------
// SmoothingSpline
// ---------------------------------------------------------------------------

/// Natural cubic smoothing spline in the Reinsch formulation.
///
/// Minimizes `sum (y_i - g_i)^2 + alpha * integral g''^2` over natural
/// cubic splines with knots at the data abscissae, with `alpha` chosen so
/// the achieved residual comes as close as possible to the budget `s`
/// without exceeding it. `s = 0` reduces to the natural interpolating
/// spline. Weights are unity: the reported measurement uncertainties are
/// displayed but do not enter the criterion.
///
/// Evaluation is a pure function of the stored knots, fitted values, and
/// second derivatives; repeated calls with the same input return
/// bit-identical results.
#[derive(Debug, Clone)]
pub struct SmoothingSpline {
    /// Knot abscissae (the measured wavelengths), strictly increasing.
    x: Vec<f64>,
    /// Fitted ordinates at the knots.
    g: Vec<f64>,
    /// Second derivatives at the knots; natural ends are zero.
    m: Vec<f64>,
    /// Requested residual budget `s`.
    budget: f64,
    /// Achieved `sum (y_i - g_i)^2`, at most `budget`.
    residual: f64,
}

impl SmoothingSpline {
    /// Fit with the default budget `s = n * SMOOTHING_PER_POINT`.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, FitError> {
        Self::fit_with_budget(x, y, x.len() as f64 * SMOOTHING_PER_POINT)
    }

    /// Fit with an explicit residual budget `s >= 0`.
    pub fn fit_with_budget(x: &[f64], y: &[f64], s: f64) -> Result<Self, FitError> {
        validate(x, y, s)?;

        let system = ReinschSystem::new(x, y);
        let (gamma, fitted, residual) = if s == 0.0 {
            let gamma = system.solve(0.0);
            (gamma, y.to_vec(), 0.0)
        } else {
            system.solve_for_budget(s)
        };

        let n = x.len();
        let mut m = vec![0.0; n];
        m[1..n - 1].copy_from_slice(&gamma);

        Ok(SmoothingSpline {
            x: x.to_vec(),
            g: fitted,
            m,
            budget: s,
            residual,
        })
    }

    /// Fitted wavelength span `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Residual budget the fit was asked to honor.
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Achieved sum of squared residuals at the knots.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Evaluate the spline at one wavelength.
    ///
    /// Inputs beyond the fitted range evaluate the boundary segment's
    /// cubic, flagged via [`Evaluation::extrapolated`]; the value itself
    /// is never clamped or altered.
    pub fn evaluate(&self, wavelength_nm: f64) -> Evaluation {
        let n = self.x.len();

        // Bracket by binary search; out-of-range inputs clamp to the end
        // segments, which extends their polynomials.
        let hi = match self.x.partition_point(|&v| v < wavelength_nm) {
            0 => 1,
            i if i >= n => n - 1,
            i => i,
        };
        let lo = hi - 1;

        let h = self.x[hi] - self.x[lo];
        let a = (self.x[hi] - wavelength_nm) / h;
        let b = (wavelength_nm - self.x[lo]) / h;
        let value = a * self.g[lo]
            + b * self.g[hi]
            + (h * h / 6.0)
                * ((a * a - 1.0) * a * self.m[lo] + (b * b - 1.0) * b * self.m[hi]);

        let (x_min, x_max) = self.range();
        Evaluation {
            responsivity_a_per_w: value,
            extrapolated: wavelength_nm < x_min || wavelength_nm > x_max,
        }
    }

    /// Sample the fitted curve at `count` evenly spaced wavelengths
    /// spanning the fitted range (inclusive of both ends).
    pub fn sample(&self, count: usize) -> Vec<(f64, f64)> {
        debug_assert!(count >= 2);
        let (x_min, x_max) = self.range();
        let step = (x_max - x_min) / (count - 1) as f64;
        (0..count)
            .map(|i| {
                let wl = x_min + step * i as f64;
                (wl, self.evaluate(wl).responsivity_a_per_w)
            })
            .collect()
    }
}

fn validate(x: &[f64], y: &[f64], s: f64) -> Result<(), FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < MIN_POINTS {
        return Err(FitError::TooFewPoints(x.len()));
    }
    for (i, (&xi, &yi)) in x.iter().zip(y.iter()).enumerate() {
        if !xi.is_finite() || !yi.is_finite() {
            return Err(FitError::NonFinite(i));
        }
    }
    for (i, pair) in x.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(FitError::NotIncreasing(i + 1));
        }
    }
    if s < 0.0 {
        return Err(FitError::NegativeBudget(s));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reinsch system: (R + alpha QtQ) gamma = Qt y
// ---------------------------------------------------------------------------

/// Precomputed band matrices of the smoothing system.
///
/// `R` is the (n-2) tridiagonal Gram matrix of the curvature inner
/// product; `Q` the n x (n-2) second-difference operator. For a given
/// `alpha` the penalized criterion is solved by the pentadiagonal system
/// `(R + alpha * QtQ) gamma = Qt y`, after which the fitted ordinates are
/// `g = y - alpha * Q gamma` and `gamma` holds the interior second
/// derivatives.
struct ReinschSystem {
    y: Vec<f64>,
    /// Knot spacings h_i = x_{i+1} - x_i.
    h: Vec<f64>,
    /// Right-hand side Qt y (second divided differences of y).
    qty: Vec<f64>,
    /// R diagonals.
    r0: Vec<f64>,
    r1: Vec<f64>,
    /// QtQ diagonals.
    q0: Vec<f64>,
    q1: Vec<f64>,
    q2: Vec<f64>,
}

impl ReinschSystem {
    fn new(x: &[f64], y: &[f64]) -> Self {
        let n = x.len();
        let dim = n - 2;
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let p: Vec<f64> = h.iter().map(|&hi| 1.0 / hi).collect();

        let qty: Vec<f64> = (1..n - 1)
            .map(|i| (y[i + 1] - y[i]) * p[i] - (y[i] - y[i - 1]) * p[i - 1])
            .collect();

        let r0: Vec<f64> = (0..dim).map(|j| (h[j] + h[j + 1]) / 3.0).collect();
        let r1: Vec<f64> = (0..dim.saturating_sub(1)).map(|j| h[j + 1] / 6.0).collect();

        let q0: Vec<f64> = (0..dim)
            .map(|j| {
                let a = p[j];
                let b = p[j] + p[j + 1];
                let c = p[j + 1];
                a * a + b * b + c * c
            })
            .collect();
        let q1: Vec<f64> = (0..dim.saturating_sub(1))
            .map(|j| -p[j + 1] * (p[j] + p[j + 1]) - p[j + 1] * (p[j + 1] + p[j + 2]))
            .collect();
        let q2: Vec<f64> = (0..dim.saturating_sub(2))
            .map(|j| p[j + 1] * p[j + 2])
            .collect();

        ReinschSystem {
            y: y.to_vec(),
            h,
            qty,
            r0,
            r1,
            q0,
            q1,
            q2,
        }
    }

    /// Solve the pentadiagonal system for a fixed `alpha` via banded LDLt.
    ///
    /// The matrix is symmetric positive definite for every `alpha >= 0`
    /// (R alone already is), so the factorization needs no pivoting.
    fn solve(&self, alpha: f64) -> Vec<f64> {
        let dim = self.r0.len();
        let d0: Vec<f64> = (0..dim).map(|j| self.r0[j] + alpha * self.q0[j]).collect();
        let d1: Vec<f64> = (0..dim.saturating_sub(1))
            .map(|j| self.r1[j] + alpha * self.q1[j])
            .collect();
        let d2: Vec<f64> = (0..dim.saturating_sub(2))
            .map(|j| alpha * self.q2[j])
            .collect();

        // LDLt with unit lower band (e1, e2).
        let mut d = vec![0.0; dim];
        let mut e1 = vec![0.0; dim];
        let mut e2 = vec![0.0; dim];
        for i in 0..dim {
            if i >= 2 {
                e2[i] = d2[i - 2] / d[i - 2];
            }
            if i >= 1 {
                let mut v = d1[i - 1];
                if i >= 2 {
                    v -= e2[i] * d[i - 2] * e1[i - 1];
                }
                e1[i] = v / d[i - 1];
            }
            let mut v = d0[i];
            if i >= 1 {
                v -= e1[i] * e1[i] * d[i - 1];
            }
            if i >= 2 {
                v -= e2[i] * e2[i] * d[i - 2];
            }
            d[i] = v;
        }

        // Forward substitution L z = Qt y.
        let mut z = vec![0.0; dim];
        for i in 0..dim {
            let mut v = self.qty[i];
            if i >= 1 {
                v -= e1[i] * z[i - 1];
            }
            if i >= 2 {
                v -= e2[i] * z[i - 2];
            }
            z[i] = v;
        }

        // Diagonal scale, then back substitution Lt gamma = z.
        let mut gamma = vec![0.0; dim];
        for i in (0..dim).rev() {
            let mut v = z[i] / d[i];
            if i + 1 < dim {
                v -= e1[i + 1] * gamma[i + 1];
            }
            if i + 2 < dim {
                v -= e2[i + 2] * gamma[i + 2];
            }
            gamma[i] = v;
        }
        gamma
    }

    /// Fitted ordinates `g = y - alpha * Q gamma` for interior second
    /// derivatives `gamma`.
    fn fitted(&self, alpha: f64, gamma: &[f64]) -> Vec<f64> {
        let n = self.y.len();
        let full = |i: usize| -> f64 {
            if i == 0 || i == n - 1 {
                0.0
            } else {
                gamma[i - 1]
            }
        };
        (0..n)
            .map(|i| {
                let mut qg = 0.0;
                if i >= 1 {
                    qg += (full(i - 1) - full(i)) / self.h[i - 1];
                }
                if i + 1 < n {
                    qg += (full(i + 1) - full(i)) / self.h[i];
                }
                self.y[i] - alpha * qg
            })
            .collect()
    }

    fn residual(&self, fitted: &[f64]) -> f64 {
        self.y
            .iter()
            .zip(fitted.iter())
            .map(|(&yi, &gi)| (yi - gi) * (yi - gi))
            .sum()
    }

    /// Pick `alpha` so the residual meets the budget `s` from below.
    ///
    /// The residual is zero at `alpha = 0` and increases monotonically
    /// with `alpha`, so bracket-and-bisect converges unconditionally.
    /// When even heavy smoothing cannot spend the budget (data with no
    /// curvature), the heaviest bracket endpoint is used; the fit is then
    /// smoother than requested, never rougher.
    fn solve_for_budget(&self, s: f64) -> (Vec<f64>, Vec<f64>, f64) {
        let eval = |alpha: f64| -> (Vec<f64>, Vec<f64>, f64) {
            let gamma = self.solve(alpha);
            let fitted = self.fitted(alpha, &gamma);
            let residual = self.residual(&fitted);
            (gamma, fitted, residual)
        };

        let mut hi = 1.0;
        let mut at_hi = eval(hi);
        let mut decades = 0;
        while at_hi.2 < s && decades < 60 {
            hi *= 10.0;
            at_hi = eval(hi);
            decades += 1;
        }
        if at_hi.2 < s {
            log::debug!(
                "residual budget {s:.3e} unreachable (max achievable {:.3e}); keeping heaviest smoothing",
                at_hi.2
            );
            return at_hi;
        }

        let mut lo = 0.0;
        let mut at_lo = eval(lo);
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            let at_mid = eval(mid);
            if at_mid.2 <= s {
                lo = mid;
                at_lo = at_mid;
            } else {
                hi = mid;
            }
            if s - at_lo.2 <= 1e-6 * s {
                break;
            }
        }
        at_lo
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::data::loader::nist_dataset;

    #[test]
    fn zero_budget_interpolates_knots() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|&v| v * v).collect();
        let spline = SmoothingSpline::fit_with_budget(&x, &y, 0.0).unwrap();

        for (&xi, &yi) in x.iter().zip(y.iter()) {
            let eval = spline.evaluate(xi);
            assert_relative_eq!(eval.responsivity_a_per_w, yi, max_relative = 1e-12);
            assert!(!eval.extrapolated);
        }
    }

    #[test]
    fn linear_data_is_reproduced_exactly() {
        // A straight line has no curvature to trade away, so the fit must
        // return it unchanged even though the budget cannot be spent.
        let x = [1.0, 2.0, 4.0, 7.0, 11.0];
        let y: Vec<f64> = x.iter().map(|&v| 3.0 - 0.5 * v).collect();
        let spline = SmoothingSpline::fit_with_budget(&x, &y, 1e-3).unwrap();

        for (&xi, &yi) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(
                spline.evaluate(xi).responsivity_a_per_w,
                yi,
                epsilon = 1e-9
            );
        }
        assert_abs_diff_eq!(
            spline.evaluate(5.5).responsivity_a_per_w,
            3.0 - 0.5 * 5.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn nist_fit_stays_within_budget() {
        let ds = nist_dataset().unwrap();
        let spline =
            SmoothingSpline::fit(ds.wavelengths_nm(), ds.responsivities_a_per_w()).unwrap();

        assert_relative_eq!(
            spline.budget(),
            ds.len() as f64 * SMOOTHING_PER_POINT,
            max_relative = 1e-12
        );
        assert!(spline.residual() <= spline.budget() * (1.0 + 1e-9));

        // Residual budget caps every pointwise deviation at sqrt(s).
        let cap = spline.budget().sqrt() * (1.0 + 1e-6);
        for (&wl, &r) in ds
            .wavelengths_nm()
            .iter()
            .zip(ds.responsivities_a_per_w().iter())
        {
            let eval = spline.evaluate(wl);
            assert!(!eval.extrapolated);
            assert!(
                (eval.responsivity_a_per_w - r).abs() <= cap,
                "fit deviates {} at {wl} nm",
                (eval.responsivity_a_per_w - r).abs()
            );
        }
    }

    #[test]
    fn out_of_range_evaluation_is_flagged() {
        let ds = nist_dataset().unwrap();
        let spline =
            SmoothingSpline::fit(ds.wavelengths_nm(), ds.responsivities_a_per_w()).unwrap();

        assert!(spline.evaluate(51.8).extrapolated);
        assert!(spline.evaluate(255.2).extrapolated);
        assert!(!spline.evaluate(100.0).extrapolated);
        assert!(!spline.evaluate(51.9).extrapolated);
        assert!(!spline.evaluate(255.1).extrapolated);

        // Flag only: the value is still the polynomial extension.
        assert!(spline.evaluate(51.8).responsivity_a_per_w.is_finite());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let ds = nist_dataset().unwrap();
        let spline =
            SmoothingSpline::fit(ds.wavelengths_nm(), ds.responsivities_a_per_w()).unwrap();

        for wl in [51.9, 100.0, 147.857142, 255.1, 300.0] {
            let first = spline.evaluate(wl);
            let second = spline.evaluate(wl);
            assert_eq!(
                first.responsivity_a_per_w.to_bits(),
                second.responsivity_a_per_w.to_bits()
            );
            assert_eq!(first.extrapolated, second.extrapolated);
        }
    }

    #[test]
    fn sample_spans_the_fitted_range() {
        let ds = nist_dataset().unwrap();
        let spline =
            SmoothingSpline::fit(ds.wavelengths_nm(), ds.responsivities_a_per_w()).unwrap();

        let samples = spline.sample(1000);
        assert_eq!(samples.len(), 1000);
        assert_relative_eq!(samples[0].0, 51.9);
        assert_relative_eq!(samples[999].0, 255.1, max_relative = 1e-12);
        assert!(samples.windows(2).all(|w| w[1].0 > w[0].0));
    }

    #[test]
    fn rejects_bad_input() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];
        assert!(matches!(
            SmoothingSpline::fit(&x[..3], &y[..3]),
            Err(FitError::TooFewPoints(3))
        ));
        assert!(matches!(
            SmoothingSpline::fit(&x, &y[..3]),
            Err(FitError::LengthMismatch { .. })
        ));
        assert!(matches!(
            SmoothingSpline::fit(&[0.0, 1.0, 1.0, 2.0], &y),
            Err(FitError::NotIncreasing(2))
        ));
        assert!(matches!(
            SmoothingSpline::fit(&[0.0, 1.0, f64::NAN, 2.0], &y),
            Err(FitError::NonFinite(2))
        ));
        assert!(matches!(
            SmoothingSpline::fit_with_budget(&x, &y, -1.0),
            Err(FitError::NegativeBudget(_))
        ));
    }
}
