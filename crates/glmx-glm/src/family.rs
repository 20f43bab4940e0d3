//! Link functions and exponential-family distributions.

use crate::{GlmError, Result};
use serde::Serialize;
use statrs::function::gamma::ln_gamma;
use std::f64::consts::PI;
use std::fmt;

/// Smallest mean kept away from a boundary of the family's support.
const MU_EPS: f64 = 1e-10;

/// Link function g, with η = g(μ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Link {
    /// η = μ
    Identity,
    /// η = ln(μ / (1 - μ))
    Logit,
    /// η = ln μ
    Log,
    /// η = 1 / μ
    InversePower,
}

impl Link {
    /// η = g(μ).
    pub fn link(self, mu: f64) -> f64 {
        match self {
            Link::Identity => mu,
            Link::Logit => (mu / (1.0 - mu)).ln(),
            Link::Log => mu.ln(),
            Link::InversePower => 1.0 / mu,
        }
    }

    /// μ = g⁻¹(η).
    pub fn inverse(self, eta: f64) -> f64 {
        match self {
            Link::Identity => eta,
            Link::Logit => 1.0 / (1.0 + (-eta).exp()),
            Link::Log => eta.exp(),
            Link::InversePower => 1.0 / eta,
        }
    }

    /// g'(μ).
    pub fn derivative(self, mu: f64) -> f64 {
        match self {
            Link::Identity => 1.0,
            Link::Logit => 1.0 / (mu * (1.0 - mu)),
            Link::Log => 1.0 / mu,
            Link::InversePower => -1.0 / (mu * mu),
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Link::Identity => "Identity",
            Link::Logit => "Logit",
            Link::Log => "Log",
            Link::InversePower => "InversePower",
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Response distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Family {
    Gaussian,
    Binomial,
    Poisson,
    /// Negative binomial with fixed dispersion `alpha` = 1/θ.
    NegativeBinomial { alpha: f64 },
    Gamma,
}

/// `y ln(y / μ)`, taken as 0 at y = 0.
fn xlogy_ratio(y: f64, mu: f64) -> f64 {
    if y == 0.0 {
        0.0
    } else {
        y * (y / mu).ln()
    }
}

impl Family {
    /// Negative binomial with shape θ.
    pub fn negative_binomial_theta(theta: f64) -> Result<Self> {
        if !(theta.is_finite() && theta > 0.0) {
            return Err(GlmError::InvalidParameter(format!(
                "negative binomial theta must be positive, got {}",
                theta
            )));
        }
        Ok(Family::NegativeBinomial { alpha: 1.0 / theta })
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Gaussian => "Gaussian",
            Family::Binomial => "Binomial",
            Family::Poisson => "Poisson",
            Family::NegativeBinomial { .. } => "NegativeBinomial",
            Family::Gamma => "Gamma",
        }
    }

    /// Canonical link, except the negative binomial's conventional log link.
    pub fn default_link(&self) -> Link {
        match self {
            Family::Gaussian => Link::Identity,
            Family::Binomial => Link::Logit,
            Family::Poisson | Family::NegativeBinomial { .. } => Link::Log,
            Family::Gamma => Link::InversePower,
        }
    }

    /// Whether the dispersion is estimated from the data rather than fixed at 1.
    pub fn estimates_scale(&self) -> bool {
        matches!(self, Family::Gaussian | Family::Gamma)
    }

    /// V(μ).
    pub fn variance(&self, mu: f64) -> f64 {
        match self {
            Family::Gaussian => 1.0,
            Family::Binomial => mu * (1.0 - mu),
            Family::Poisson => mu,
            Family::NegativeBinomial { alpha } => mu + alpha * mu * mu,
            Family::Gamma => mu * mu,
        }
    }

    /// Keep μ inside the open support so the variance and deviance stay finite.
    pub fn clamp_mu(&self, mu: f64) -> f64 {
        match self {
            Family::Gaussian => mu,
            Family::Binomial => mu.clamp(MU_EPS, 1.0 - MU_EPS),
            Family::Poisson | Family::NegativeBinomial { .. } | Family::Gamma => mu.max(MU_EPS),
        }
    }

    /// Check every response lies in the family's support.
    pub fn check_response(&self, y: &[f64]) -> Result<()> {
        let valid = |v: f64| match self {
            Family::Gaussian => v.is_finite(),
            Family::Binomial => (0.0..=1.0).contains(&v),
            Family::Poisson | Family::NegativeBinomial { .. } => v.is_finite() && v >= 0.0,
            Family::Gamma => v.is_finite() && v > 0.0,
        };
        match y.iter().position(|&v| !valid(v)) {
            Some(row) => Err(GlmError::InvalidResponse {
                family: self.name(),
                row,
                value: y[row],
            }),
            None => Ok(()),
        }
    }

    /// Starting means for IRLS.
    pub fn start_mu(&self, y: &[f64]) -> Vec<f64> {
        match self {
            Family::Binomial => y.iter().map(|&v| (v + 0.5) / 2.0).collect(),
            _ => {
                let mean = y.iter().sum::<f64>() / y.len() as f64;
                y.iter().map(|&v| (v + mean) / 2.0).collect()
            }
        }
    }

    /// Contribution of one observation to the deviance.
    pub fn unit_deviance(&self, y: f64, mu: f64) -> f64 {
        match self {
            Family::Gaussian => (y - mu).powi(2),
            Family::Binomial => {
                2.0 * (xlogy_ratio(y, mu) + xlogy_ratio(1.0 - y, 1.0 - mu))
            }
            Family::Poisson => 2.0 * (xlogy_ratio(y, mu) - (y - mu)),
            Family::NegativeBinomial { alpha } => {
                2.0 * (xlogy_ratio(y, mu)
                    - (y + 1.0 / alpha) * ((1.0 + alpha * y) / (1.0 + alpha * mu)).ln())
            }
            Family::Gamma => 2.0 * (-(y / mu).ln() + (y - mu) / mu),
        }
    }

    /// Deviance Σ d(y, μ).
    pub fn deviance(&self, y: &[f64], mu: &[f64]) -> f64 {
        y.iter()
            .zip(mu)
            .map(|(&yi, &mi)| self.unit_deviance(yi, mi))
            .sum()
    }

    /// Pearson χ² = Σ (y - μ)² / V(μ).
    pub fn pearson_chi2(&self, y: &[f64], mu: &[f64]) -> f64 {
        y.iter()
            .zip(mu)
            .map(|(&yi, &mi)| (yi - mi).powi(2) / self.variance(mi))
            .sum()
    }

    /// Full log-likelihood at dispersion `scale`.
    ///
    /// `scale` is ignored for the families whose dispersion is fixed.
    pub fn log_likelihood(&self, y: &[f64], mu: &[f64], scale: f64) -> f64 {
        let pairs = y.iter().zip(mu).map(|(&yi, &mi)| (yi, mi));
        match self {
            Family::Gaussian => pairs
                .map(|(yi, mi)| -(yi - mi).powi(2) / (2.0 * scale) - 0.5 * (2.0 * PI * scale).ln())
                .sum(),
            Family::Binomial => pairs
                .map(|(yi, mi)| yi * mi.ln() + (1.0 - yi) * (1.0 - mi).ln())
                .sum(),
            Family::Poisson => pairs
                .map(|(yi, mi)| yi * mi.ln() - mi - ln_gamma(yi + 1.0))
                .sum(),
            Family::NegativeBinomial { alpha } => {
                let inv = 1.0 / alpha;
                pairs
                    .map(|(yi, mi)| {
                        yi * (alpha * mi / (1.0 + alpha * mi)).ln() - inv * (1.0 + alpha * mi).ln()
                            + ln_gamma(yi + inv)
                            - ln_gamma(yi + 1.0)
                            - ln_gamma(inv)
                    })
                    .sum()
            }
            Family::Gamma => {
                let shape = 1.0 / scale;
                pairs
                    .map(|(yi, mi)| {
                        shape * (shape * yi / mi).ln() - shape * yi / mi - ln_gamma(shape) - yi.ln()
                    })
                    .sum()
            }
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::NegativeBinomial { alpha } => write!(f, "NegativeBinomial(alpha={:.4})", alpha),
            other => f.write_str(other.name()),
        }
    }
}
