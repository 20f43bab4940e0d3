//! Maximum likelihood estimate of the negative binomial shape θ.
//!
//! Alternates between IRLS for the coefficients at fixed θ and a one
//! dimensional Nelder-Mead search for θ at fixed means, the scheme R's
//! `MASS::glm.nb` uses. The search runs over ln θ so the simplex never
//! leaves the positive axis.

use crate::data::Design;
use crate::family::{Family, Link};
use crate::fit::{Glm, GlmFit};
use crate::{GlmError, Result};
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::neldermead::NelderMead;
use tracing::{debug, info};

/// Outer alternation cap.
pub const MAX_THETA_ITER: usize = 25;

/// Relative change in θ that ends the alternation.
pub const THETA_TOLERANCE: f64 = 1e-5;

/// Bounds on θ; beyond the upper one the data are effectively Poisson.
const THETA_MIN: f64 = 1e-4;
const THETA_MAX: f64 = 1e6;

/// Negative log-likelihood in ln θ for fixed means.
struct ThetaCost {
    y: Vec<f64>,
    mu: Vec<f64>,
}

impl CostFunction for ThetaCost {
    type Param = Vec<f64>; // [ln theta]
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, Error> {
        let theta = p[0].exp().clamp(THETA_MIN, THETA_MAX);
        let family = Family::NegativeBinomial { alpha: 1.0 / theta };
        let ll = family.log_likelihood(&self.y, &self.mu, 1.0);
        if ll.is_finite() {
            Ok(-ll)
        } else {
            Ok(f64::INFINITY)
        }
    }
}

/// Result of the joint (β, θ) fit.
#[derive(Debug, Clone)]
pub struct ThetaEstimate {
    /// ML estimate of θ.
    pub theta: f64,
    /// Negative binomial fit at that θ.
    pub fit: GlmFit,
    /// Outer alternations performed.
    pub iterations: usize,
    /// Whether θ settled within tolerance.
    pub converged: bool,
}

/// Method-of-moments starting value from Var(Y) = μ + μ²/θ.
fn moment_theta(y: &[f64], mu: &[f64]) -> f64 {
    let excess: f64 = y
        .iter()
        .zip(mu)
        .map(|(yi, mi)| (yi - mi).powi(2) - mi)
        .sum();
    let mu_sq: f64 = mu.iter().map(|m| m * m).sum();
    if excess > 0.0 {
        (mu_sq / excess).clamp(THETA_MIN, THETA_MAX)
    } else {
        THETA_MAX
    }
}

/// θ maximising the likelihood for fixed means, starting from `start`.
pub fn theta_ml(y: &[f64], mu: &[f64], start: f64) -> Result<f64> {
    if y.is_empty() {
        return Err(GlmError::EmptyData);
    }
    let log_start = start.clamp(THETA_MIN, THETA_MAX).ln();
    let cost_fn = ThetaCost {
        y: y.to_vec(),
        mu: mu.to_vec(),
    };

    let solver = NelderMead::new(vec![vec![log_start], vec![log_start + 0.5]])
        .with_sd_tolerance(1e-14)
        .map_err(|e| GlmError::OptimizationFailed(e.to_string()))?;

    let res = Executor::new(cost_fn, solver)
        .configure(|state| state.max_iters(500))
        .run()
        .map_err(|e| GlmError::OptimizationFailed(e.to_string()))?;

    let best_param = res
        .state()
        .get_best_param()
        .ok_or_else(|| GlmError::OptimizationFailed("No solution found".to_string()))?;

    Ok(best_param[0].exp().clamp(THETA_MIN, THETA_MAX))
}

/// Fit a log-link negative binomial model with θ estimated jointly.
pub fn fit_negative_binomial(design: &Design, y: &[f64]) -> Result<ThetaEstimate> {
    let poisson = Glm::new(Family::Poisson, Link::Log).fit(design, y)?;
    let mut theta = theta_ml(y, &poisson.fitted, moment_theta(y, &poisson.fitted))?;
    debug!(theta, "initial theta from Poisson means");

    let mut converged = false;
    let mut iterations = 0;
    let mut fit = poisson;
    while iterations < MAX_THETA_ITER {
        iterations += 1;
        fit = Glm::new(Family::negative_binomial_theta(theta)?, Link::Log).fit(design, y)?;
        let next = theta_ml(y, &fit.fitted, theta)?;
        let change = (next - theta).abs() / theta;
        debug!(iteration = iterations, theta = next, change, "theta step");
        theta = next;
        if change < THETA_TOLERANCE {
            converged = true;
            break;
        }
    }

    // Coefficients consistent with the reported θ
    let fit = if converged {
        Glm::new(Family::negative_binomial_theta(theta)?, Link::Log).fit(design, y)?
    } else {
        fit
    };
    info!(theta, iterations, converged, "negative binomial theta estimated");

    Ok(ThetaEstimate {
        theta,
        fit,
        iterations,
        converged,
    })
}
