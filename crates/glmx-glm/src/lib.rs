//! # glmx-glm
//!
//! Generalized linear models fitted by iteratively reweighted least squares,
//! and the validators that re-derive the coefficients quoted in each GLM
//! tutorial.
//!
//! ## Features
//!
//! - **Families**: Gaussian, Binomial, Poisson, Negative Binomial (fixed or
//!   estimated θ) and Gamma, with identity, logit, log and inverse links
//! - **Statistics**: standard errors, Wald tests, deviance, null deviance,
//!   Pearson χ², log-likelihood, AIC and BIC computed as statsmodels does
//! - **Validation**: the five tutorial models with their quoted coefficients
//!   and tolerances
//!
//! ## Example
//!
//! ```no_run
//! use glmx_glm::{DataSources, Tutorial};
//!
//! let report = Tutorial::Poisson.case().run(&DataSources::new("data"))?;
//! println!("{}", report);
//! assert!(report.all_passed());
//! # Ok::<(), glmx_glm::GlmError>(())
//! ```

mod data;
mod error;
mod family;
mod fit;
mod linalg;
mod source;
mod theta;
mod validate;

pub use data::{Dataset, Design, ModelFrame, Summary};
pub use error::GlmError;
pub use family::{Family, Link};
pub use fit::{Glm, GlmFit, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE};
pub use source::{fetch_text, load_cleveland, DataSource, DataSources, CLEVELAND_COLUMNS, CLEVELAND_URL};
pub use theta::{fit_negative_binomial, theta_ml, ThetaEstimate, MAX_THETA_ITER, THETA_TOLERANCE};
pub use validate::{
    compare, Check, CheckStatus, DatasetKind, Preprocess, Section, Tutorial, ValidationCase,
    ValidationReport, OVERDISPERSION_THRESHOLD, TUTORIAL_GAMMA_SHAPE, TUTORIAL_THETA,
};

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, GlmError>;
