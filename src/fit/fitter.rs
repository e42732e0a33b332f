//! Least-squares fitting of growth models to measured series.
//!
//! Given:
//! - input sizes `n_i`
//! - observed cost counts `y_i`
//! - a growth family (`n log n` or quadratic)
//!
//! we minimize the sum of squared residuals over the family's coefficients
//! with a damped Gauss–Newton (Levenberg–Marquardt) iteration:
//!
//! - start from an all-ones coefficient vector
//! - at each step solve the damping-augmented least-squares system for the
//!   coefficient update via [`crate::math::solve_least_squares`]
//! - shrink the damping factor on improvement, grow it on rejection
//!
//! Both families happen to be linear in their coefficients, so the iteration
//! converges in a handful of steps; it is written against the generic
//! predict/Jacobian interface so the loop does not depend on that.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{FitResult, GrowthKind, LoadedDataset, Quantity, SortKey};
use crate::models::{fill_jacobian_row, predict};

/// Iteration cap for the damped Gauss–Newton loop.
const MAX_ITERS: usize = 100;
/// Initial damping factor.
const LAMBDA_INIT: f64 = 1e-3;
/// Damping cap; escalating past this means the step search is stuck.
const LAMBDA_MAX: f64 = 1e12;
/// Relative SSE improvement below which the fit is considered converged.
const SSE_TOL: f64 = 1e-12;
/// Relative step norm below which the fit is considered converged.
const STEP_TOL: f64 = 1e-10;
/// Relative singular-value threshold for the Jacobian rank check.
const RANK_EPS: f64 = 1e-12;

/// Why a single series could not be fitted.
///
/// Both conditions are recoverable at the series level: the pipeline renders
/// the series points-only and reports the skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitError {
    /// Fewer samples than the model has free coefficients.
    InsufficientData { needed: usize, got: usize },
    /// The optimizer could not make progress (rank-deficient Jacobian,
    /// non-finite observations, or damping escalated past its cap).
    DidNotConverge,
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::InsufficientData { needed, got } => {
                write!(f, "not enough samples (need {needed}, got {got})")
            }
            FitError::DidNotConverge => write!(f, "fit did not converge"),
        }
    }
}

impl std::error::Error for FitError {}

/// Fit one growth family to one `(n, observed)` series.
///
/// `n_values` and `observed` must have the same length; the measurement types
/// guarantee this for loader-produced data.
pub fn fit_series(
    kind: GrowthKind,
    n_values: &[f64],
    observed: &[f64],
) -> Result<FitResult, FitError> {
    debug_assert_eq!(n_values.len(), observed.len());

    let p = kind.param_len();
    let n = n_values.len().min(observed.len());
    if n < p {
        return Err(FitError::InsufficientData { needed: p, got: n });
    }
    if n_values.iter().chain(observed.iter()).any(|v| !v.is_finite()) {
        return Err(FitError::DidNotConverge);
    }

    // Jacobian and residual at the current coefficients. The families are
    // linear, so the Jacobian is constant; we still rebuild the residual each
    // iteration from the generic predict interface.
    let mut jacobian = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for i in 0..n {
        fill_jacobian_row(kind, n_values[i], &mut row);
        for j in 0..p {
            jacobian[(i, j)] = row[j];
        }
    }

    // Degenerate designs (e.g. all-equal n) cannot identify the coefficients;
    // surface that as a convergence failure rather than returning garbage.
    let svd = jacobian.clone().svd(false, false);
    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let rank = svd
        .singular_values
        .iter()
        .filter(|s| **s > s_max * RANK_EPS)
        .count();
    if s_max == 0.0 || rank < p {
        return Err(FitError::DidNotConverge);
    }

    // Marquardt scaling: damping rows proportional to the column norms keep
    // the step well-behaved when n² columns dwarf the intercept column.
    let col_scale: Vec<f64> = (0..p)
        .map(|j| jacobian.column(j).norm().max(1e-12))
        .collect();

    let mut coeffs = DVector::<f64>::from_element(p, 1.0);
    let mut sse = sum_squared_residuals(kind, n_values, observed, coeffs.as_slice());
    let mut lambda = LAMBDA_INIT;

    for _ in 0..MAX_ITERS {
        let mut residual = DVector::<f64>::zeros(n);
        for i in 0..n {
            residual[i] = observed[i] - predict(kind, n_values[i], coeffs.as_slice());
        }

        // Inner step search: retry with stronger damping until SSE improves.
        loop {
            let mut augmented = DMatrix::<f64>::zeros(n + p, p);
            let mut rhs = DVector::<f64>::zeros(n + p);
            augmented.view_mut((0, 0), (n, p)).copy_from(&jacobian);
            rhs.rows_mut(0, n).copy_from(&residual);
            for j in 0..p {
                augmented[(n + j, j)] = lambda.sqrt() * col_scale[j];
            }

            let Some(delta) = crate::math::solve_least_squares(&augmented, &rhs) else {
                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    return Err(FitError::DidNotConverge);
                }
                continue;
            };

            let candidate = &coeffs + &delta;
            let new_sse = sum_squared_residuals(kind, n_values, observed, candidate.as_slice());

            if new_sse.is_finite() && new_sse <= sse {
                let improvement = sse - new_sse;
                let step_small = delta.norm() <= STEP_TOL * (1.0 + coeffs.norm());
                coeffs = candidate;
                lambda = (lambda * 0.1).max(1e-15);

                if improvement <= SSE_TOL * sse.max(f64::MIN_POSITIVE) || step_small {
                    return Ok(build_result(kind, coeffs.as_slice().to_vec(), new_sse, n));
                }
                sse = new_sse;
                break;
            }

            // A rejected step this small means the iterate is already at the
            // minimum; stronger damping can only shrink it further.
            if delta.norm() <= STEP_TOL * (1.0 + coeffs.norm()) {
                return Ok(build_result(kind, coeffs.as_slice().to_vec(), sse, n));
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                return Err(FitError::DidNotConverge);
            }
        }
    }

    Err(FitError::DidNotConverge)
}

fn build_result(kind: GrowthKind, coeffs: Vec<f64>, sse: f64, n: usize) -> FitResult {
    let rmse = (sse / n as f64).sqrt();
    FitResult {
        kind,
        coeffs,
        sse,
        rmse,
    }
}

fn sum_squared_residuals(kind: GrowthKind, n_values: &[f64], observed: &[f64], coeffs: &[f64]) -> f64 {
    n_values
        .iter()
        .zip(observed.iter())
        .map(|(&x, &y)| {
            let r = y - predict(kind, x, coeffs);
            r * r
        })
        .sum()
}

/// The fit outcome for one (dataset, sort key, quantity) series.
#[derive(Debug, Clone)]
pub struct SeriesFit {
    pub dataset: String,
    pub key: SortKey,
    pub quantity: Quantity,
    pub kind: GrowthKind,
    pub outcome: Result<FitResult, FitError>,
}

/// Fit every metric series of every loaded dataset.
///
/// Series share no mutable state, so the fits run in parallel; the output
/// order is deterministic (dataset order, then quantity, then sort key).
pub fn fit_datasets(datasets: &[LoadedDataset]) -> Vec<SeriesFit> {
    let jobs: Vec<(&LoadedDataset, Quantity, SortKey)> = datasets
        .iter()
        .flat_map(|d| {
            Quantity::ALL
                .into_iter()
                .flat_map(move |q| SortKey::ALL.into_iter().map(move |k| (d, q, k)))
        })
        .collect();

    jobs.par_iter()
        .filter_map(|&(dataset, quantity, key)| {
            let observed = dataset.set.metric(key, quantity)?;
            Some(SeriesFit {
                dataset: dataset.source.label.clone(),
                key,
                quantity,
                kind: dataset.source.growth,
                outcome: fit_series(dataset.source.growth, dataset.set.sizes(), observed),
            })
        })
        .collect()
}

/// Look up a successful fit for one series, if any.
pub fn find_fit<'a>(
    fits: &'a [SeriesFit],
    dataset: &str,
    key: SortKey,
    quantity: Quantity,
) -> Option<&'a FitResult> {
    fits.iter()
        .find(|f| f.dataset == dataset && f.key == key && f.quantity == quantity)
        .and_then(|f| f.outcome.as_ref().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    #[test]
    fn quadratic_fit_recovers_exact_coefficients() {
        let n: Vec<f64> = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
        let y: Vec<f64> = n.iter().map(|&x| 0.5 * x * x + 2.0 * x + 1.0).collect();

        let fit = fit_series(GrowthKind::Quadratic, &n, &y).unwrap();
        assert!((fit.coeffs[0] - 0.5).abs() < 1e-6, "a = {}", fit.coeffs[0]);
        assert!((fit.coeffs[1] - 2.0).abs() < 1e-4, "b = {}", fit.coeffs[1]);
        assert!((fit.coeffs[2] - 1.0).abs() < 1e-3, "c = {}", fit.coeffs[2]);
        assert!(fit.sse < 1e-6, "sse = {}", fit.sse);
    }

    #[test]
    fn nlogn_fit_recovers_exact_coefficients() {
        let n: Vec<f64> = (1..=10).map(|i| (i * 100) as f64).collect();
        let y: Vec<f64> = n.iter().map(|&x| 2.0 * x * x.ln() + 5.0).collect();

        let fit = fit_series(GrowthKind::NLogN, &n, &y).unwrap();
        assert!((fit.coeffs[0] - 2.0).abs() < 1e-6, "a = {}", fit.coeffs[0]);
        assert!((fit.coeffs[1] - 5.0).abs() < 1e-3, "b = {}", fit.coeffs[1]);
    }

    #[test]
    fn quadratic_fit_on_rounded_benchmark_counts_is_near_exact() {
        // Generated by 0.1·n² + n + 3 (integral at these sizes, so rounding
        // leaves the values unchanged); the fit must land within SSE < 1.
        let n = [10.0, 20.0, 30.0, 40.0, 50.0];
        let y = [23.0, 63.0, 123.0, 203.0, 303.0];

        let fit = fit_series(GrowthKind::Quadratic, &n, &y).unwrap();
        let sse: f64 = n
            .iter()
            .zip(y.iter())
            .map(|(&x, &obs)| {
                let r = fit.coeffs[0] * x * x + fit.coeffs[1] * x + fit.coeffs[2] - obs;
                r * r
            })
            .sum();
        assert!(sse < 1.0, "sse = {sse}");
    }

    #[test]
    fn exactly_as_many_samples_as_coefficients_fits_exactly() {
        let n = [10.0, 20.0, 30.0];
        let y: Vec<f64> = n.iter().map(|&x| 0.3 * x * x + 1.5 * x + 7.0).collect();

        let fit = fit_series(GrowthKind::Quadratic, &n, &y).unwrap();
        assert!(fit.sse < 1e-6, "exact-fit sse = {}", fit.sse);
    }

    #[test]
    fn fewer_samples_than_coefficients_is_insufficient_data() {
        let err = fit_series(GrowthKind::Quadratic, &[10.0, 20.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, FitError::InsufficientData { needed: 3, got: 2 });

        let err = fit_series(GrowthKind::NLogN, &[10.0], &[1.0]).unwrap_err();
        assert_eq!(err, FitError::InsufficientData { needed: 2, got: 1 });
    }

    #[test]
    fn all_equal_sizes_do_not_converge() {
        let n = [25.0, 25.0, 25.0, 25.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        let err = fit_series(GrowthKind::Quadratic, &n, &y).unwrap_err();
        assert_eq!(err, FitError::DidNotConverge);
    }

    #[test]
    fn fitting_is_deterministic_across_runs() {
        let n: Vec<f64> = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let y = vec![23.0, 63.0, 123.0, 203.0, 303.0];

        let a = fit_series(GrowthKind::Quadratic, &n, &y).unwrap();
        let b = fit_series(GrowthKind::Quadratic, &n, &y).unwrap();
        assert_eq!(a.coeffs, b.coeffs);
        assert_eq!(a.sse, b.sse);
    }

    #[test]
    fn noisy_nlogn_data_recovers_generating_coefficients() {
        let mut rng = StdRng::seed_from_u64(42);
        let noise = Normal::new(0.0, 0.5).unwrap();

        let n: Vec<f64> = (1..=40).map(|i| (i * 25) as f64).collect();
        let y: Vec<f64> = n
            .iter()
            .map(|&x| 2.0 * x * x.ln() + 5.0 + noise.sample(&mut rng))
            .collect();

        let fit = fit_series(GrowthKind::NLogN, &n, &y).unwrap();
        assert!((fit.coeffs[0] - 2.0).abs() < 0.05, "a = {}", fit.coeffs[0]);
        assert!((fit.coeffs[1] - 5.0).abs() < 2.0, "b = {}", fit.coeffs[1]);
    }

    #[test]
    fn fitted_model_reproduces_observations_within_bounded_residual() {
        let n: Vec<f64> = (1..=12).map(|i| (i * 10) as f64).collect();
        let y: Vec<f64> = n.iter().map(|&x| 0.25 * x * x + 3.0 * x + 2.0).collect();

        let fit = fit_series(GrowthKind::Quadratic, &n, &y).unwrap();
        let magnitude: f64 = y.iter().map(|v| v * v).sum();
        assert!(fit.sse < 1e-9 * magnitude, "sse = {} vs magnitude {}", fit.sse, magnitude);
    }
}
