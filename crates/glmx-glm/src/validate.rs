//! Checks that the coefficients quoted in each tutorial match a fresh fit.

use crate::data::{Dataset, ModelFrame, Summary};
use crate::family::{Family, Link};
use crate::fit::{Glm, GlmFit};
use crate::source::{load_cleveland, DataSources};
use crate::theta::fit_negative_binomial;
use crate::Result;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// θ quoted by the negative binomial tutorial.
pub const TUTORIAL_THETA: f64 = 6.773;

/// Gamma shape (1 / scale) quoted by the gamma tutorial.
pub const TUTORIAL_GAMMA_SHAPE: f64 = 61.75;

/// Deviance per degree of freedom above which Poisson counts are overdispersed.
pub const OVERDISPERSION_THRESHOLD: f64 = 2.0;

/// The five tutorials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tutorial {
    Gaussian,
    Binomial,
    Poisson,
    NegBin,
    Gamma,
}

impl Tutorial {
    /// Tutorials in reading order.
    pub const ALL: [Tutorial; 5] = [
        Tutorial::Gaussian,
        Tutorial::Binomial,
        Tutorial::Poisson,
        Tutorial::NegBin,
        Tutorial::Gamma,
    ];

    /// Validation case of this tutorial.
    pub fn case(self) -> ValidationCase {
        match self {
            Tutorial::Gaussian => ValidationCase {
                tutorial: self,
                title: "Gaussian GLM Validation",
                dataset: DatasetKind::HeartJson,
                preprocess: Preprocess::None,
                response: "MaxHR",
                predictors: &["Age", "ExerciseAngina", "Oldpeak"],
                intercept: "const",
                family: Family::Gaussian,
                link: Link::Identity,
                expected: &[
                    ("const", 203.37),
                    ("Age", -0.83),
                    ("ExerciseAngina", -14.25),
                    ("Oldpeak", -3.78),
                ],
                digits: 2,
                tolerance: 0.1,
            },
            Tutorial::Binomial => ValidationCase {
                tutorial: self,
                title: "Binomial GLM (Logistic Regression) Validation",
                dataset: DatasetKind::Cleveland,
                preprocess: Preprocess::BinariseTarget,
                response: "target",
                predictors: &["age", "sex", "cp", "thalach", "oldpeak"],
                intercept: "Intercept",
                family: Family::Binomial,
                link: Link::Logit,
                expected: &[
                    ("Intercept", -3.1655),
                    ("age", 0.0359),
                    ("sex", 1.6745),
                    ("cp", 0.8963),
                    ("thalach", -0.0247),
                    ("oldpeak", 0.6829),
                ],
                digits: 4,
                tolerance: 0.01,
            },
            Tutorial::Poisson => ValidationCase {
                tutorial: self,
                title: "Poisson GLM Validation",
                dataset: DatasetKind::BikeDay,
                preprocess: Preprocess::None,
                response: "cnt",
                predictors: BIKE_PREDICTORS,
                intercept: "Intercept",
                family: Family::Poisson,
                link: Link::Log,
                expected: &[
                    ("Intercept", 8.2391),
                    ("temp", 1.3971),
                    ("hum", -0.3568),
                    ("windspeed", -0.9673),
                    ("workingday", 0.0389),
                    ("weathersit", -0.1298),
                ],
                digits: 4,
                tolerance: 0.01,
            },
            Tutorial::NegBin => ValidationCase {
                tutorial: self,
                title: "Negative Binomial GLM Validation",
                dataset: DatasetKind::BikeDay,
                preprocess: Preprocess::None,
                response: "cnt",
                predictors: BIKE_PREDICTORS,
                intercept: "Intercept",
                family: Family::NegativeBinomial {
                    alpha: 1.0 / TUTORIAL_THETA,
                },
                link: Link::Log,
                expected: &[
                    ("Intercept", 8.1969),
                    ("temp", 1.7005),
                    ("hum", -0.4825),
                    ("windspeed", -1.1239),
                    ("workingday", 0.0519),
                    ("weathersit", -0.1421),
                ],
                digits: 4,
                tolerance: 0.01,
            },
            Tutorial::Gamma => ValidationCase {
                tutorial: self,
                title: "Gamma GLM Validation",
                dataset: DatasetKind::Cleveland,
                preprocess: Preprocess::DropIncomplete,
                response: "trestbps",
                predictors: &["age", "exang", "oldpeak"],
                intercept: "Intercept",
                family: Family::Gamma,
                link: Link::Log,
                expected: &[
                    ("Intercept", 4.6460),
                    ("age", 0.0040),
                    ("exang", 0.0012),
                    ("oldpeak", 0.0155),
                ],
                digits: 4,
                tolerance: 0.001,
            },
        }
    }

    /// Lower-case name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Tutorial::Gaussian => "gaussian",
            Tutorial::Binomial => "binomial",
            Tutorial::Poisson => "poisson",
            Tutorial::NegBin => "negbin",
            Tutorial::Gamma => "gamma",
        }
    }
}

const BIKE_PREDICTORS: &[&str] = &["temp", "hum", "windspeed", "workingday", "weathersit"];

/// Dataset a case is fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatasetKind {
    /// `heart.json` records.
    HeartJson,
    /// UCI processed Cleveland file.
    Cleveland,
    /// UCI bike sharing `day.csv`.
    BikeDay,
}

impl DatasetKind {
    /// Load the raw dataset.
    pub fn load(self, sources: &DataSources) -> Result<Dataset> {
        match self {
            DatasetKind::HeartJson => Dataset::read_json_records(sources.heart_json()),
            DatasetKind::Cleveland => load_cleveland(&sources.cleveland),
            DatasetKind::BikeDay => Dataset::read_csv(sources.bike_day_csv()),
        }
    }
}

/// Row filtering and recoding applied before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Preprocess {
    None,
    /// `target > 0` becomes 1, otherwise 0.
    BinariseTarget,
    /// Drop every row with any missing cell, used or not.
    DropIncomplete,
}

impl Preprocess {
    fn apply(self, data: Dataset) -> Result<Dataset> {
        match self {
            Preprocess::None => Ok(data),
            Preprocess::BinariseTarget => {
                let mut data = data;
                data.map_column("target", |v| if v > 0.0 { 1.0 } else { 0.0 })?;
                Ok(data)
            }
            Preprocess::DropIncomplete => Ok(data.drop_missing()),
        }
    }
}

/// One tutorial's model and the coefficients its text quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCase {
    pub tutorial: Tutorial,
    pub title: &'static str,
    pub dataset: DatasetKind,
    pub preprocess: Preprocess,
    pub response: &'static str,
    pub predictors: &'static [&'static str],
    /// Name of the intercept parameter.
    pub intercept: &'static str,
    pub family: Family,
    pub link: Link,
    /// Coefficients quoted in the tutorial, by parameter name.
    pub expected: &'static [(&'static str, f64)],
    /// Decimal places the fitted values are rounded to before comparing.
    pub digits: i32,
    /// Largest absolute difference that still passes.
    pub tolerance: f64,
}

/// Pass or fail of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Ok,
    Mismatch,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Ok => f.write_str("OK"),
            CheckStatus::Mismatch => f.write_str("MISMATCH"),
        }
    }
}

/// An expected value compared with a fitted one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub name: String,
    pub expected: f64,
    /// Rounded fitted value; NaN when the fit has no such parameter.
    pub actual: f64,
    pub digits: i32,
    pub status: CheckStatus,
}

impl Check {
    /// Round `actual` to `digits` places and compare within `tolerance`.
    pub fn new(name: impl Into<String>, expected: f64, actual: f64, digits: i32, tolerance: f64) -> Self {
        let actual = round_to(actual, digits);
        // NaN never compares below the tolerance, so a missing value fails
        let status = if (expected - actual).abs() < tolerance {
            CheckStatus::Ok
        } else {
            CheckStatus::Mismatch
        };
        Self {
            name: name.into(),
            expected,
            actual,
            digits,
            status,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.digits.max(0) as usize;
        write!(
            f,
            "{}: expected {:.d$}, got {:.d$} [{}]",
            self.name,
            self.expected,
            self.actual,
            self.status,
            d = d
        )
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Compare quoted coefficients with a fit.
pub fn compare(expected: &[(&str, f64)], fit: &GlmFit, digits: i32, tolerance: f64) -> Vec<Check> {
    expected
        .iter()
        .map(|&(name, value)| {
            let actual = fit.param(name).unwrap_or(f64::NAN);
            Check::new(name, value, actual, digits, tolerance)
        })
        .collect()
}

/// A titled block of extra statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

/// Everything one validation run found.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub tutorial: Tutorial,
    pub title: String,
    /// Rows and columns of the dataset after preprocessing.
    pub shape: (usize, usize),
    /// Summary of the response column.
    pub response_summary: Summary,
    pub fit: GlmFit,
    pub checks: Vec<Check>,
    pub sections: Vec<Section>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether every check passed.
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    /// Checks that failed.
    pub fn mismatches(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title)?;
        writeln!(f)?;
        writeln!(f, "Dataset dimensions: ({}, {})", self.shape.0, self.shape.1)?;
        writeln!(f)?;
        writeln!(f, "{} summary:", self.fit.response)?;
        writeln!(f, "{}", self.response_summary)?;
        writeln!(f)?;
        writeln!(f, "Model Summary:")?;
        writeln!(f, "{}", self.fit)?;
        writeln!(f)?;
        writeln!(f, "Validation Check:")?;
        writeln!(f, "Expected vs Actual:")?;
        for check in &self.checks {
            writeln!(f, "  {}", check)?;
        }
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}:", section.title)?;
            for line in &section.lines {
                writeln!(f, "  {}", line)?;
            }
        }
        for warning in &self.warnings {
            writeln!(f, "  WARNING: {}", warning)?;
        }
        Ok(())
    }
}

impl ValidationCase {
    /// Load this case's dataset and validate it.
    pub fn run(&self, sources: &DataSources) -> Result<ValidationReport> {
        info!(tutorial = self.tutorial.name(), "running validation");
        let data = self.dataset.load(sources)?;
        self.run_on(data)
    }

    /// Validate against an already loaded dataset.
    pub fn run_on(&self, data: Dataset) -> Result<ValidationReport> {
        let data = self.preprocess.apply(data)?;
        let frame = data.model_frame(self.response, self.predictors, self.intercept)?;
        let fit = Glm::new(self.family, self.link).fit_frame(&frame)?;
        let checks = compare(self.expected, &fit, self.digits, self.tolerance);

        let mut report = ValidationReport {
            tutorial: self.tutorial,
            title: self.title.to_string(),
            shape: (data.n_rows(), data.n_cols()),
            response_summary: data.describe(self.response)?,
            fit,
            checks,
            sections: Vec::new(),
            warnings: Vec::new(),
        };

        match self.tutorial {
            Tutorial::Gaussian => {}
            Tutorial::Binomial => report.sections.push(fit_statistics(&report.fit)),
            Tutorial::Poisson => self.poisson_extras(&mut report),
            Tutorial::NegBin => self.negbin_extras(&frame, &mut report)?,
            Tutorial::Gamma => self.gamma_extras(&frame, &mut report)?,
        }

        for check in report.mismatches() {
            warn!(tutorial = self.tutorial.name(), check = %check, "validation mismatch");
        }
        Ok(report)
    }

    fn poisson_extras(&self, report: &mut ValidationReport) {
        let fit = &report.fit;
        let ratio = fit.dispersion_ratio();
        report.sections.push(
            Section::new("Overdispersion Check")
                .line(format!("Residual deviance: {:.2}", fit.deviance))
                .line(format!("Degrees of freedom: {}", fit.df_resid))
                .line(format!("Dispersion ratio: {:.2} (should be ~1 for Poisson)", ratio)),
        );
        if ratio > OVERDISPERSION_THRESHOLD {
            report
                .warnings
                .push("Severe overdispersion detected! Consider Negative Binomial.".to_string());
        }
        report.sections.push(fit_statistics(&report.fit));
    }

    fn negbin_extras(&self, frame: &ModelFrame, report: &mut ValidationReport) -> Result<()> {
        let alpha = match self.family {
            Family::NegativeBinomial { alpha } => alpha,
            _ => 1.0 / TUTORIAL_THETA,
        };
        report.sections.push(
            Section::new("Dispersion")
                .line(format!("Alpha (1/theta) used: {:.4}", alpha))
                .line(format!("Equivalent theta: {:.3}", 1.0 / alpha)),
        );

        let poisson = Glm::new(Family::Poisson, Link::Log).fit_frame(frame)?;
        let mut ratios = Section::new("Comparison with Poisson (SE ratios)");
        for &(name, _) in self.expected {
            let se_pois = poisson.std_err(name).unwrap_or(f64::NAN);
            let se_nb = report.fit.std_err(name).unwrap_or(f64::NAN);
            ratios = ratios.line(format!(
                "{}: Poisson SE={:.4}, NegBin SE={:.4}, Ratio={:.1}x",
                name,
                se_pois,
                se_nb,
                se_nb / se_pois
            ));
        }
        report.sections.push(ratios);

        let fit = &report.fit;
        report.sections.push(
            Section::new("Model Fit Statistics")
                .line(format!("Deviance: {:.2}", fit.deviance))
                .line(format!(
                    "Deviance/df: {:.2} (should be ~1 for good fit)",
                    fit.dispersion_ratio()
                ))
                .line(format!("AIC (NegBin): {:.2}", fit.aic))
                .line(format!("AIC (Poisson): {:.2}", poisson.aic)),
        );

        // Reported alongside the fixed-θ fit; not a pass/fail check
        let estimate = fit_negative_binomial(&frame.design, &frame.y)?;
        report.sections.push(
            Section::new("Theta Estimate")
                .line(format!("Maximum likelihood theta: {:.3}", estimate.theta))
                .line(format!("Tutorial theta: {:.3}", TUTORIAL_THETA))
                .line(format!("Outer iterations: {}", estimate.iterations)),
        );
        if !estimate.converged {
            report
                .warnings
                .push(format!("theta estimate did not converge after {} iterations", estimate.iterations));
        }
        Ok(())
    }

    fn gamma_extras(&self, frame: &ModelFrame, report: &mut ValidationReport) -> Result<()> {
        let fit = &report.fit;
        let shape = 1.0 / fit.scale;
        report.sections.push(
            Section::new("Dispersion")
                .line(format!("Scale (dispersion): {:.6}", fit.scale))
                .line(format!("Shape parameter (1/scale): {:.2}", shape)),
        );
        report
            .checks
            .push(Check::new("shape", TUTORIAL_GAMMA_SHAPE, shape, 2, 1.0));

        let gaussian = Glm::new(Family::Gaussian, Link::Identity).fit_frame(frame)?;
        let fit = &report.fit;
        report.sections.push(
            Section::new("Comparison with Gaussian")
                .line(format!("Gamma AIC: {:.1}", fit.aic))
                .line(format!("Gaussian AIC: {:.1}", gaussian.aic))
                .line(format!("Difference: {:.1} (lower is better)", gaussian.aic - fit.aic)),
        );
        report.sections.push(
            Section::new("Model Fit Statistics")
                .line(format!("Deviance: {:.4}", fit.deviance))
                .line(format!("Null deviance: {:.4}", fit.null_deviance)),
        );
        Ok(())
    }
}

fn fit_statistics(fit: &GlmFit) -> Section {
    Section::new("Model Fit Statistics")
        .line(format!("Null deviance: {:.2}", fit.null_deviance))
        .line(format!("Residual deviance: {:.2}", fit.deviance))
        .line(format!("AIC: {:.2}", fit.aic))
}
