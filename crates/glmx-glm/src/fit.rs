//! Iteratively reweighted least squares.
//!
//! The reported statistics follow statsmodels' `GLMResults`: the dispersion
//! is Pearson χ² / df_resid for families that estimate it, standard errors
//! come from (XᵀWX)⁻¹ at the final weights, and AIC/BIC use the same
//! definitions, so the numbers can be checked against the tutorial text.

use crate::data::{Design, ModelFrame};
use crate::family::{Family, Link};
use crate::linalg::{inverse_spd, solve_spd, weighted_normal_equations};
use crate::{GlmError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use tracing::{debug, warn};

/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Default convergence tolerance on the relative deviance change.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// A model specification: family, link and IRLS controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glm {
    family: Family,
    link: Link,
    max_iter: usize,
    tolerance: f64,
}

impl Glm {
    /// Model with an explicit link.
    pub fn new(family: Family, link: Link) -> Self {
        Self {
            family,
            link,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Model with the family's default link.
    pub fn with_default_link(family: Family) -> Self {
        Self::new(family, family.default_link())
    }

    /// Set the iteration cap.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn link(&self) -> Link {
        self.link
    }

    /// Fit the response and design of a model frame.
    pub fn fit_frame(&self, frame: &ModelFrame) -> Result<GlmFit> {
        let mut fit = self.fit(&frame.design, &frame.y)?;
        fit.response = frame.response.clone();
        Ok(fit)
    }

    /// Fit by IRLS.
    pub fn fit(&self, design: &Design, y: &[f64]) -> Result<GlmFit> {
        let n = design.n_rows();
        let p = design.n_cols();
        if n == 0 {
            return Err(GlmError::EmptyData);
        }
        if y.len() != n {
            return Err(GlmError::DimensionMismatch {
                expected: n,
                got: y.len(),
            });
        }
        if n < p {
            return Err(GlmError::Underdetermined { rows: n, params: p });
        }
        self.family.check_response(y)?;

        let family = self.family;
        let link = self.link;
        let rows = design.rows();

        let mut mu: Vec<f64> = family
            .start_mu(y)
            .into_iter()
            .map(|m| family.clamp_mu(m))
            .collect();
        let mut eta: Vec<f64> = mu.iter().map(|&m| link.link(m)).collect();
        let mut deviance = family.deviance(y, &mu);
        let mut params = vec![0.0; p];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            let (w, z) = self.working_values(y, &mu, &eta);
            let (xtwx, xtwz) = weighted_normal_equations(rows, &w, &z, p);
            params = solve_spd(xtwx, &xtwz)?;

            eta = rows.iter().map(|row| dot(row, &params)).collect();
            mu = eta
                .iter()
                .map(|&e| family.clamp_mu(link.inverse(e)))
                .collect();

            let new_deviance = family.deviance(y, &mu);
            if !new_deviance.is_finite() {
                return Err(GlmError::OptimizationFailed(format!(
                    "deviance became {} at iteration {}",
                    new_deviance, iterations
                )));
            }
            let change = (deviance - new_deviance).abs() / (new_deviance.abs() + 0.1);
            debug!(iteration = iterations, deviance = new_deviance, change, "IRLS step");
            deviance = new_deviance;
            if change < self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                family = family.name(),
                iterations, "IRLS did not converge; results may be unreliable"
            );
        }

        // Covariance at the final weights
        let (w, _) = self.working_values(y, &mu, &eta);
        let (xtwx, _) = weighted_normal_equations(rows, &w, &vec![0.0; n], p);
        let cov_unscaled = inverse_spd(xtwx)?;

        let df_resid = (n - p) as f64;
        let df_model = if design.has_intercept() { p - 1 } else { p };
        let pearson_chi2 = family.pearson_chi2(y, &mu);
        let scale = if family.estimates_scale() {
            pearson_chi2 / df_resid
        } else {
            1.0
        };
        let bse = cov_unscaled
            .diagonal()
            .iter()
            .map(|v| (v * scale).sqrt())
            .collect();

        let y_mean = y.iter().sum::<f64>() / n as f64;
        let null_mu = vec![family.clamp_mu(y_mean); n];
        let null_deviance = family.deviance(y, &null_mu);

        let llf_scale = if family == Family::Gaussian && link == Link::Identity {
            y.iter().zip(&mu).map(|(yi, mi)| (yi - mi).powi(2)).sum::<f64>() / n as f64
        } else {
            scale
        };
        let llf = family.log_likelihood(y, &mu, llf_scale);
        let aic = -2.0 * llf + 2.0 * p as f64;
        let bic = deviance - df_resid * (n as f64).ln();

        Ok(GlmFit {
            response: "y".to_string(),
            family,
            link,
            names: design.names().to_vec(),
            params,
            bse,
            fitted: mu,
            n_obs: n,
            df_model,
            df_resid: n - p,
            deviance,
            null_deviance,
            pearson_chi2,
            scale,
            llf,
            aic,
            bic,
            iterations,
            converged,
        })
    }

    /// IRLS weights and working response at the current means.
    fn working_values(&self, y: &[f64], mu: &[f64], eta: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut w = Vec::with_capacity(mu.len());
        let mut z = Vec::with_capacity(mu.len());
        for ((&yi, &mi), &ei) in y.iter().zip(mu).zip(eta) {
            let d = self.link.derivative(mi);
            w.push(1.0 / (d * d * self.family.variance(mi)));
            z.push(ei + (yi - mi) * d);
        }
        (w, z)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// A fitted model.
#[derive(Debug, Clone, Serialize)]
pub struct GlmFit {
    /// Response name, `y` unless fitted from a model frame.
    pub response: String,
    pub family: Family,
    pub link: Link,
    /// Parameter names, intercept first.
    pub names: Vec<String>,
    /// Coefficient estimates.
    pub params: Vec<f64>,
    /// Standard errors.
    pub bse: Vec<f64>,
    /// Fitted means.
    #[serde(skip)]
    pub fitted: Vec<f64>,
    pub n_obs: usize,
    /// Parameters excluding the intercept.
    pub df_model: usize,
    pub df_resid: usize,
    pub deviance: f64,
    /// Deviance of the constant-mean model.
    pub null_deviance: f64,
    pub pearson_chi2: f64,
    /// Dispersion: Pearson χ² / df_resid, or 1 for fixed-scale families.
    pub scale: f64,
    /// Log-likelihood.
    pub llf: f64,
    pub aic: f64,
    /// Deviance-based BIC: deviance - df_resid · ln n.
    pub bic: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl GlmFit {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Coefficient by name.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|i| self.params[i])
    }

    /// Standard error by name.
    pub fn std_err(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|i| self.bse[i])
    }

    /// Wald statistics β / se.
    pub fn z_values(&self) -> Vec<f64> {
        self.params.iter().zip(&self.bse).map(|(b, s)| b / s).collect()
    }

    /// Two-sided p-values of the Wald statistics under the standard normal.
    pub fn p_values(&self) -> Vec<f64> {
        let normal = Normal::standard();
        self.z_values()
            .into_iter()
            .map(|z| 2.0 * (1.0 - normal.cdf(z.abs())))
            .collect()
    }

    /// Wald confidence intervals at level `1 - alpha`.
    pub fn conf_int(&self, alpha: f64) -> Vec<(f64, f64)> {
        let q = Normal::standard().inverse_cdf(1.0 - alpha / 2.0);
        self.params
            .iter()
            .zip(&self.bse)
            .map(|(b, s)| (b - q * s, b + q * s))
            .collect()
    }

    /// Deviance per residual degree of freedom; about 1 for a well specified
    /// count model.
    pub fn dispersion_ratio(&self) -> f64 {
        self.deviance / self.df_resid as f64
    }
}

const RULE_WIDTH: usize = 78;

impl fmt::Display for GlmFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{:^width$}", "Generalized Linear Model Regression Results", width = RULE_WIDTH)?;
        writeln!(f, "{}", heavy)?;
        writeln!(f, "{:<16}{:>22}   {:<18}{:>19}", "Dep. Variable:", self.response, "No. Observations:", self.n_obs)?;
        writeln!(f, "{:<16}{:>22}   {:<18}{:>19}", "Model Family:", self.family.name(), "Df Residuals:", self.df_resid)?;
        writeln!(f, "{:<16}{:>22}   {:<18}{:>19}", "Link Function:", self.link.name(), "Df Model:", self.df_model)?;
        writeln!(f, "{:<16}{:>22.4}   {:<18}{:>19.2}", "Scale:", self.scale, "Log-Likelihood:", self.llf)?;
        writeln!(f, "{:<16}{:>22}   {:<18}{:>19.2}", "No. Iterations:", self.iterations, "Deviance:", self.deviance)?;
        writeln!(f, "{:<16}{:>22}   {:<18}{:>19.4}", "Converged:", self.converged, "Pearson chi2:", self.pearson_chi2)?;
        writeln!(f, "{}", heavy)?;
        writeln!(
            f,
            "{:<16}{:>10}{:>11}{:>10}{:>10}{:>11}{:>10}",
            "", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]"
        )?;
        writeln!(f, "{}", light)?;

        let z = self.z_values();
        let p = self.p_values();
        let ci = self.conf_int(0.05);
        for i in 0..self.params.len() {
            writeln!(
                f,
                "{:<16}{:>10.4}{:>11.4}{:>10.3}{:>10.3}{:>11.3}{:>10.3}",
                self.names[i], self.params[i], self.bse[i], z[i], p[i], ci[i].0, ci[i].1
            )?;
        }
        write!(f, "{}", heavy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn design(xs: &[f64]) -> Design {
        Design::new(
            vec!["Intercept".to_string(), "x".to_string()],
            xs.iter().map(|&x| vec![1.0, x]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_gaussian_recovers_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = xs.iter().map(|x| 3.0 - 2.0 * x).collect();
        let fit = Glm::with_default_link(Family::Gaussian)
            .fit(&design(&xs), &y)
            .unwrap();
        assert!(fit.converged);
        assert_relative_eq!(fit.params[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(fit.params[1], -2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.deviance, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gaussian_matches_least_squares_statistics() {
        // y = 1 + x with residuals (+1, -1, -1, +1)
        let xs = [0.0, 1.0, 2.0, 3.0];
        let y = [2.0, 1.0, 2.0, 5.0];
        let fit = Glm::with_default_link(Family::Gaussian)
            .fit(&design(&xs), &y)
            .unwrap();

        assert_relative_eq!(fit.params[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(fit.params[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(fit.deviance, 4.0, epsilon = 1e-9);
        assert_relative_eq!(fit.scale, 2.0, epsilon = 1e-9);
        // Var(slope) = scale / Σ(x - x̄)² = 2 / 5
        assert_relative_eq!(fit.bse[1], 0.4f64.sqrt(), epsilon = 1e-9);

        // llf with scale = SSR / n = 1
        let llf = -2.0 * (2.0 * std::f64::consts::PI).ln() - 2.0;
        assert_relative_eq!(fit.llf, llf, epsilon = 1e-9);
        assert_relative_eq!(fit.aic, -2.0 * llf + 4.0, epsilon = 1e-9);
        assert_eq!(fit.df_model, 1);
        assert_eq!(fit.df_resid, 2);
    }

    #[test]
    fn test_poisson_two_groups_exact_mle() {
        // Group means 2 and 6: β0 = ln 2, β1 = ln 3
        let xs = [0.0, 0.0, 1.0, 1.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = Glm::with_default_link(Family::Poisson)
            .fit(&design(&xs), &y)
            .unwrap();
        assert!(fit.converged);
        assert_relative_eq!(fit.params[0], 2f64.ln(), epsilon = 1e-7);
        assert_relative_eq!(fit.params[1], 3f64.ln(), epsilon = 1e-7);
        assert_eq!(fit.scale, 1.0);
        // Var(β0) = 1 / (n0 μ0)
        assert_relative_eq!(fit.bse[0], (1.0f64 / 4.0).sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_binomial_two_groups_exact_mle() {
        // Group proportions 1/4 and 3/4
        let xs = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let y = [1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let fit = Glm::with_default_link(Family::Binomial)
            .fit(&design(&xs), &y)
            .unwrap();
        assert_relative_eq!(fit.params[0], -(3f64.ln()), epsilon = 1e-7);
        assert_relative_eq!(fit.params[1], 2.0 * 3f64.ln(), epsilon = 1e-7);
        assert!(fit.deviance < fit.null_deviance);
        assert_relative_eq!(fit.null_deviance, 8.0 * 2f64.ln() * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gamma_log_link_group_means() {
        let xs = [0.0, 0.0, 1.0, 1.0];
        let y = [1.0, 3.0, 4.0, 8.0];
        let fit = Glm::new(Family::Gamma, Link::Log)
            .fit(&design(&xs), &y)
            .unwrap();
        assert_relative_eq!(fit.params[0], 2f64.ln(), epsilon = 1e-7);
        assert_relative_eq!(fit.params[1], 3f64.ln(), epsilon = 1e-7);
        // Pearson χ² = (1/4 + 1/4 + 1/9 + 1/9) over 2 df
        assert_relative_eq!(fit.scale, (0.5 + 2.0 / 9.0) / 2.0, epsilon = 1e-7);
    }

    #[test]
    fn test_input_errors() {
        let glm = Glm::with_default_link(Family::Poisson);
        assert!(matches!(
            glm.fit(&design(&[0.0, 1.0]), &[1.0]),
            Err(GlmError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            glm.fit(&design(&[]), &[]),
            Err(GlmError::EmptyData)
        ));
        assert!(matches!(
            glm.fit(&design(&[1.0, 1.0, 1.0]), &[1.0, 2.0, 3.0]),
            Err(GlmError::Singular)
        ));
        assert!(matches!(
            glm.fit(&design(&[0.0, 1.0]), &[1.0, -2.0]),
            Err(GlmError::InvalidResponse { row: 1, .. })
        ));
    }

    #[test]
    fn test_summary_lists_every_parameter() {
        let xs = [0.0, 0.0, 1.0, 1.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = Glm::with_default_link(Family::Poisson)
            .fit(&design(&xs), &y)
            .unwrap();
        let text = fit.to_string();
        assert!(text.contains("Generalized Linear Model Regression Results"));
        assert!(text.contains("Poisson"));
        assert!(text.lines().any(|l| l.starts_with("Intercept")));
        assert!(text.lines().any(|l| l.starts_with("x ")));

        let (lo, hi) = fit.conf_int(0.05)[1];
        assert!(lo < fit.params[1] && fit.params[1] < hi);
        assert!(fit.p_values().iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
