//! One handler per `glmx` subcommand.
//!
//! Handlers write their user-facing report to `out` and return what they
//! produced so callers (and tests) can inspect it.

use crate::config::Config;
use crate::report::{write_batch, write_mode_banner, write_outcome, write_summary};
use crate::CliError;
use clap::ValueEnum;
use glmx_glm::{Tutorial, ValidationReport};
use glmx_pages::{
    html_files_in, html_files_under, run_batch, systematic_pages, tutorial_dirs, BatchReport,
    CssExtract, FeedbackWidget, MobilePicker, Navigation, WriteMode, MOBILE_PICKER_TUTORIALS,
};
use glmx_terrain::{
    fetch_grid, generate_grid, grid_points, write_grid, BatchPlan, ElevationGrid, OpenMeteoClient,
    TerrainModel,
};
use std::io::Write;
use tracing::info;

/// Folder prefixes of the numbered tutorials.
const TUTORIAL_PREFIXES: [&str; 5] = ["01", "02", "03", "04", "05"];

/// Fetch the real elevation grid and write it.
pub fn fetch_elevation(config: &Config, out: &mut dyn Write) -> Result<ElevationGrid, CliError> {
    let terrain = &config.terrain;
    let plan = BatchPlan::new(terrain.batch_size, terrain.request_delay()?)?;
    let client = OpenMeteoClient::with_base_url(&terrain.api_url)?;
    let bounds = terrain.bounds;
    let size = terrain.fetch_grid;

    writeln!(out, "Total points to fetch: {}", grid_points(bounds, size).len()).map_err(io_err)?;
    writeln!(out, "Grid size: {} x {}", size.rows, size.cols).map_err(io_err)?;
    writeln!(
        out,
        "Bounding box: ({}, {}) to ({}, {})",
        bounds.south, bounds.west, bounds.north, bounds.east
    )
    .map_err(io_err)?;

    let grid = fetch_grid(&client, bounds, size, &plan, None)?;
    write_grid(&grid, &terrain.output)?;

    writeln!(out).map_err(io_err)?;
    writeln!(out, "Saved to {}", terrain.output.display()).map_err(io_err)?;
    write_range(out, &grid)?;
    Ok(grid)
}

/// Generate the synthetic elevation grid and write it.
pub fn generate_elevation(config: &Config, out: &mut dyn Write) -> Result<ElevationGrid, CliError> {
    let terrain = &config.terrain;
    let grid = generate_grid(
        &TerrainModel::arthurs_seat(),
        terrain.bounds,
        terrain.synthetic_grid,
    )?;
    write_grid(&grid, &terrain.output)?;

    writeln!(out, "Saved to {}", terrain.output.display()).map_err(io_err)?;
    writeln!(out, "Grid size: {} x {}", grid.grid.rows, grid.grid.cols).map_err(io_err)?;
    write_range(out, &grid)?;
    if let Some(summit) = grid.peaks.as_ref().and_then(|peaks| peaks.first()) {
        writeln!(out, "Global maximum at: ({:.4}, {:.4})", summit.lat, summit.lon).map_err(io_err)?;
    }
    Ok(grid)
}

fn write_range(out: &mut dyn Write, grid: &ElevationGrid) -> Result<(), CliError> {
    writeln!(
        out,
        "Elevation range: {:.1}m - {:.1}m",
        grid.stats.min, grid.stats.max
    )
    .map_err(io_err)?;
    writeln!(out, "Mean elevation: {:.1}m", grid.stats.mean).map_err(io_err)?;
    Ok(())
}

/// Header and bottom navigation links on every published tutorial page.
pub fn add_navigation(config: &Config, mode: WriteMode, out: &mut dyn Write) -> Result<BatchReport, CliError> {
    let base = config.site.tutorials_dir();
    let files = html_files_under(&base)?;

    write_mode_banner(out, mode).map_err(io_err)?;
    writeln!(out, "Found {} HTML files", files.len()).map_err(io_err)?;
    writeln!(out).map_err(io_err)?;

    let report = run_batch(&Navigation, &files, mode)?;
    write_batch(out, &report, &base, mode).map_err(io_err)?;
    Ok(report)
}

/// Feedback widget script on the tutorial pages and the site index.
pub fn add_feedback(config: &Config, mode: WriteMode, out: &mut dyn Write) -> Result<BatchReport, CliError> {
    let base = config.site.tutorials_dir();
    let widget = FeedbackWidget::for_tutorial();

    write_mode_banner(out, mode).map_err(io_err)?;
    writeln!(out, "Processing tutorial pages...").map_err(io_err)?;

    let mut report = BatchReport::default();
    for dir in tutorial_dirs(&base, &TUTORIAL_PREFIXES)? {
        let files = html_files_in(&dir)?;
        let batch = run_batch(&widget, &files, mode)?;
        writeln!(out).map_err(io_err)?;
        writeln!(out, "{}/", dir.file_name().unwrap_or_default().to_string_lossy()).map_err(io_err)?;
        for outcome in &batch.files {
            write_outcome(out, outcome, &dir).map_err(io_err)?;
        }
        report.merge(batch);
    }

    let index = config.site.index_page();
    if index.is_file() {
        writeln!(out).map_err(io_err)?;
        writeln!(out, "Processing index page...").map_err(io_err)?;
        let batch = run_batch(&FeedbackWidget::for_index(), &[index], mode)?;
        for outcome in &batch.files {
            write_outcome(out, outcome, &config.site.docs_dir).map_err(io_err)?;
        }
        report.merge(batch);
    } else {
        info!(path = %index.display(), "no index page, skipping");
    }

    write_summary(out, &report, mode).map_err(io_err)?;
    Ok(report)
}

/// Tap-to-select support on the `systematic.html` pages that still use drag and drop.
pub fn add_mobile_picker(config: &Config, mode: WriteMode, out: &mut dyn Write) -> Result<BatchReport, CliError> {
    let base = config.site.tutorials_dir();
    let files = systematic_pages(&base, &MOBILE_PICKER_TUTORIALS);

    write_mode_banner(out, mode).map_err(io_err)?;
    let report = run_batch(&MobilePicker, &files, mode)?;
    write_batch(out, &report, &base, mode).map_err(io_err)?;
    Ok(report)
}

/// Replace inline styles of the prototype pages with the shared stylesheets.
pub fn extract_css(config: &Config, mode: WriteMode, out: &mut dyn Write) -> Result<BatchReport, CliError> {
    let base = config.site.prototype_tutorials_dir();
    let files = html_files_under(&base)?;

    write_mode_banner(out, mode).map_err(io_err)?;
    writeln!(out, "Found {} HTML files", files.len()).map_err(io_err)?;
    writeln!(out).map_err(io_err)?;

    let report = run_batch(&CssExtract, &files, mode)?;
    write_batch(out, &report, &base, mode).map_err(io_err)?;
    Ok(report)
}

/// Which tutorials `validate` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateTarget {
    Gaussian,
    Binomial,
    Poisson,
    Negbin,
    Gamma,
    All,
}

impl ValidateTarget {
    pub fn tutorials(self) -> Vec<Tutorial> {
        match self {
            ValidateTarget::Gaussian => vec![Tutorial::Gaussian],
            ValidateTarget::Binomial => vec![Tutorial::Binomial],
            ValidateTarget::Poisson => vec![Tutorial::Poisson],
            ValidateTarget::Negbin => vec![Tutorial::NegBin],
            ValidateTarget::Gamma => vec![Tutorial::Gamma],
            ValidateTarget::All => Tutorial::ALL.to_vec(),
        }
    }
}

/// Refit each tutorial's model and compare with the quoted coefficients.
///
/// Reports are printed as text, or as one JSON array when `json` is set.
pub fn validate(
    config: &Config,
    target: ValidateTarget,
    json: bool,
    out: &mut dyn Write,
) -> Result<Vec<ValidationReport>, CliError> {
    let mut reports = Vec::new();
    for tutorial in target.tutorials() {
        let report = tutorial.case().run(&config.validation)?;
        if !json {
            writeln!(out, "{}", report).map_err(io_err)?;
        }
        reports.push(report);
    }

    if json {
        serde_json::to_writer_pretty(&mut *out, &reports)?;
        writeln!(out).map_err(io_err)?;
    } else {
        let mismatches = mismatch_count(&reports);
        if mismatches == 0 {
            writeln!(out, "All {} validation(s) passed", reports.len()).map_err(io_err)?;
        } else {
            writeln!(out, "{} check(s) did not match", mismatches).map_err(io_err)?;
        }
    }
    Ok(reports)
}

/// Failed checks across reports.
pub fn mismatch_count(reports: &[ValidationReport]) -> usize {
    reports.iter().map(|r| r.mismatches().count()).sum()
}

/// Under `--strict`, any mismatch fails the command.
pub fn enforce_strict(reports: &[ValidationReport], strict: bool) -> Result<(), CliError> {
    let mismatches = mismatch_count(reports);
    if strict && mismatches > 0 {
        return Err(CliError::ValidationFailed(mismatches));
    }
    Ok(())
}

fn io_err(e: std::io::Error) -> CliError {
    CliError::Output(e)
}
