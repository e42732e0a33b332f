//! Growth-model evaluation.
//!
//! The fitter relies on two primitive operations:
//! - fill a Jacobian row `∂f/∂coeff` at a given input size (for the damped
//!   least-squares step)
//! - predict `f(n)` given coefficients (for residuals/plots)
//!
//! These are implemented here for each growth family.

use crate::domain::GrowthKind;

/// Floor applied to the logarithm argument in the `n log n` family.
///
/// Input sizes are positive by construction, but fitted curves are evaluated
/// on dense grids that may start at or below zero; the clamp keeps every
/// evaluation finite.
pub const LOG_FLOOR: f64 = 1e-9;

/// Predict `f(n)` for the given growth family.
///
/// # Panics
/// Panics if `coeffs` is shorter than `kind.param_len()`. Callers should size
/// the vector via [`GrowthKind::param_len`].
pub fn predict(kind: GrowthKind, n: f64, coeffs: &[f64]) -> f64 {
    match kind {
        GrowthKind::NLogN => {
            let x = n.max(LOG_FLOOR);
            coeffs[0] * x * x.ln() + coeffs[1]
        }
        GrowthKind::Quadratic => coeffs[0] * n * n + coeffs[1] * n + coeffs[2],
    }
}

/// Fill a Jacobian row `∂f/∂coeff_j` at input size `n`.
///
/// Both families are linear in their coefficients, so the row does not depend
/// on the current coefficient values.
///
/// # Panics
/// Panics if `out` does not have length `kind.param_len()`.
pub fn fill_jacobian_row(kind: GrowthKind, n: f64, out: &mut [f64]) {
    match kind {
        GrowthKind::NLogN => {
            let x = n.max(LOG_FLOOR);
            out[0] = x * x.ln();
            out[1] = 1.0;
        }
        GrowthKind::Quadratic => {
            out[0] = n * n;
            out[1] = n;
            out[2] = 1.0;
        }
    }
}

/// Closed-form equation with fitted coefficients, for legends and reports.
///
/// Examples: `0.4921·n·log(n) + 1.25`, `0.1000·n² + 1.00·n + 3.00`.
pub fn equation(kind: GrowthKind, coeffs: &[f64]) -> String {
    match kind {
        GrowthKind::NLogN => format!("{:.4}·n·log(n) {}", coeffs[0], signed(coeffs[1])),
        GrowthKind::Quadratic => format!(
            "{:.4}·n² {}·n {}",
            coeffs[0],
            signed(coeffs[1]),
            signed(coeffs[2])
        ),
    }
}

/// Format a trailing coefficient with an explicit sign ("+ 3.00" / "- 3.00").
fn signed(v: f64) -> String {
    if v < 0.0 {
        format!("- {:.2}", -v)
    } else {
        format!("+ {v:.2}")
    }
}
