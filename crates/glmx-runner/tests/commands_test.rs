//! Command handlers run against a temporary site checkout.

use glmx_pages::WriteMode;
use glmx_runner::commands::{
    add_feedback, add_mobile_picker, add_navigation, enforce_strict, extract_css, fetch_elevation,
    generate_elevation, mismatch_count, validate,
};
use glmx_runner::{CliError, Config, ValidateTarget};
use glmx_terrain::{read_grid, GridSize};
use std::fs;
use std::path::Path;

const TUTORIAL_PAGE: &str = r#"<html>
<head>
  <style>
    body { margin: 0; }
  </style>
</head>
<body>
  <header>
    <div class="container">
      <h1>Page</h1>
    </div>
  </header>
  <div class="nav-buttons">
    <a href="fitting.html" class="btn btn-secondary">&larr; Back</a>
    <a href="systematic.html" class="btn btn-primary">Start Tutorial Over</a>
  </div>
</body>
</html>"#;

const SYSTEMATIC_PAGE: &str = "<html>
<head>
  <style>
    .variable-card.dimmed {
      opacity: 0.4;
    }
  </style>
</head>
<body>

  <script>
    // State
    function setupDropZones() {
      const pool = variablePool;
      [predictorZone, responseZone].forEach(zone => {
        zone.addEventListener('drop', (e) => {
          e.preventDefault();
        });
      });
    }
  </script>
</body>
</html>";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Site with two published tutorials, an index, and one prototype tutorial.
fn site() -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let tutorials = dir.path().join("docs/tutorials");
    for folder in ["01-gaussian", "02-logistic"] {
        write(&tutorials.join(folder).join("intro.html"), TUTORIAL_PAGE);
        write(&tutorials.join(folder).join("advanced.html"), TUTORIAL_PAGE);
    }
    write(&tutorials.join("02-logistic/systematic.html"), SYSTEMATIC_PAGE);
    write(&tutorials.join("shared/notes.html"), "<html><body></body></html>");
    write(&dir.path().join("docs/index.html"), "<html><body></body></html>");
    write(
        &dir.path().join("prototype/tutorials/03-poisson/intro.html"),
        TUTORIAL_PAGE,
    );

    let mut config = Config::default();
    config.site.docs_dir = dir.path().join("docs");
    config.site.prototype_dir = dir.path().join("prototype");
    config.terrain.output = dir.path().join("out/elevation.json");
    config.validation.data_dir = dir.path().join("data");
    (dir, config)
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_add_navigation_dry_run_then_apply() {
    let (dir, config) = site();

    let mut buf = Vec::new();
    let report = add_navigation(&config, WriteMode::DryRun, &mut buf).unwrap();
    let text = output(buf);
    assert!(text.starts_with("DRY RUN MODE"));
    assert!(text.contains("Found 6 HTML files"));
    assert_eq!(report.files.len(), 6);
    let intro = dir.path().join("docs/tutorials/01-gaussian/intro.html");
    assert_eq!(fs::read_to_string(&intro).unwrap(), TUTORIAL_PAGE);

    let mut buf = Vec::new();
    let applied = add_navigation(&config, WriteMode::Apply, &mut buf).unwrap();
    assert_eq!(applied.modified(), report.modified());
    assert!(fs::read_to_string(&intro).unwrap().contains("All Tutorials"));
    assert!(!output(buf).contains("--dry-run"));

    let mut buf = Vec::new();
    let again = add_navigation(&config, WriteMode::Apply, &mut buf).unwrap();
    assert_eq!(again.modified(), 0);
}

#[test]
fn test_add_feedback_covers_numbered_tutorials_and_index() {
    let (dir, config) = site();

    let mut buf = Vec::new();
    let report = add_feedback(&config, WriteMode::Apply, &mut buf).unwrap();
    // 01: two pages, 02: three pages, index; `shared/` is not a tutorial
    assert_eq!(report.modified(), 6);

    let text = output(buf);
    assert!(text.contains("01-gaussian/"));
    assert!(text.contains("Processing index page..."));
    assert!(text.contains("Summary: 6 modified, 0 skipped"));

    let index = fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
    assert!(index.contains(r#"<script src="js/feedback.js"></script>"#));
    let notes = fs::read_to_string(dir.path().join("docs/tutorials/shared/notes.html")).unwrap();
    assert!(!notes.contains("feedback.js"));
}

#[test]
fn test_add_mobile_picker_only_touches_systematic_pages() {
    let (dir, config) = site();

    let mut buf = Vec::new();
    let report = add_mobile_picker(&config, WriteMode::Apply, &mut buf).unwrap();
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.modified(), 1);

    let page = fs::read_to_string(dir.path().join("docs/tutorials/02-logistic/systematic.html")).unwrap();
    assert!(page.contains(".variable-card.selected"));
    assert!(page.contains("initVariablePicker"));
}

#[test]
fn test_extract_css_preview_in_dry_run() {
    let (_dir, config) = site();

    let mut buf = Vec::new();
    let report = extract_css(&config, WriteMode::DryRun, &mut buf).unwrap();
    assert_eq!(report.modified(), 1);

    let text = output(buf);
    assert!(text.contains("WOULD MODIFY: 03-poisson/intro.html (theme: poisson)"));
    assert!(text.contains("themes/poisson.css"));
}

#[test]
fn test_missing_site_directory() {
    let mut config = Config::default();
    config.site.prototype_dir = "/definitely/not/here".into();
    let mut buf = Vec::new();
    let result = extract_css(&config, WriteMode::DryRun, &mut buf);
    assert!(matches!(result, Err(CliError::Pages(_))));
}

#[test]
fn test_generate_elevation_writes_grid() {
    let (_dir, mut config) = site();
    config.terrain.synthetic_grid = GridSize::new(12, 10);

    let mut buf = Vec::new();
    let grid = generate_elevation(&config, &mut buf).unwrap();
    let saved = read_grid(&config.terrain.output).unwrap();
    assert_eq!(saved.grid, grid.grid);
    assert_eq!(saved.peaks.as_ref().map(Vec::len), Some(3));
    assert_eq!(saved.elevations.len(), 12);
    assert_eq!(saved.elevations[0].len(), 10);

    let text = output(buf);
    assert!(text.contains("Grid size: 12 x 10"));
    assert!(text.contains("Global maximum at: ("));
}

#[test]
fn test_fetch_elevation_rejects_bad_delay() {
    let (_dir, mut config) = site();
    config.terrain.delay_secs = f64::NAN;

    let mut buf = Vec::new();
    let result = fetch_elevation(&config, &mut buf);
    assert!(matches!(result, Err(CliError::InvalidConfig(_))));
    assert!(buf.is_empty());
    assert!(!config.terrain.output.exists());
}

fn write_heart_json(data_dir: &Path) {
    write_heart_json_with_slope(data_dir, -0.83);
}

fn write_heart_json_with_slope(data_dir: &Path, age_slope: f64) {
    // MaxHR = 203.37 + slope Age - 14.25 ExerciseAngina - 3.78 Oldpeak, plus
    // a small alternating residual
    let rows = [
        (40.0, "N", 0.0),
        (49.0, "Y", 1.0),
        (37.0, "N", 0.0),
        (48.0, "Y", 1.5),
        (54.0, "N", 0.0),
        (39.0, "N", 2.0),
        (45.0, "Y", 0.5),
        (58.0, "Y", 3.0),
    ];
    let records: Vec<serde_json::Value> = rows
        .iter()
        .enumerate()
        .map(|(i, &(age, angina, oldpeak))| {
            let e = if angina == "Y" { 1.0 } else { 0.0 };
            let noise = if i % 2 == 0 { 0.01 } else { -0.01 };
            serde_json::json!({
                "Age": age,
                "Sex": "M",
                "ExerciseAngina": angina,
                "Oldpeak": oldpeak,
                "MaxHR": 203.37 + age_slope * age - 14.25 * e - 3.78 * oldpeak + noise,
            })
        })
        .collect();
    write(
        &data_dir.join("heart.json"),
        &serde_json::to_string(&records).unwrap(),
    );
}

#[test]
fn test_validate_text_and_json() {
    let (_dir, config) = site();
    write_heart_json(&config.validation.data_dir);

    let mut buf = Vec::new();
    let reports = validate(&config, ValidateTarget::Gaussian, false, &mut buf).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(mismatch_count(&reports), 0);
    let text = output(buf);
    assert!(text.contains("=== Gaussian GLM Validation ==="));
    assert!(text.contains("All 1 validation(s) passed"));

    let mut buf = Vec::new();
    validate(&config, ValidateTarget::Gaussian, true, &mut buf).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(parsed[0]["tutorial"], "gaussian");
    assert_eq!(parsed[0]["checks"].as_array().unwrap().len(), 4);
    assert_eq!(parsed[0]["checks"][0]["status"], "Ok");
}

#[test]
fn test_strict_fails_only_on_mismatch() {
    let (_dir, config) = site();
    write_heart_json(&config.validation.data_dir);
    let mut buf = Vec::new();
    let matching = validate(&config, ValidateTarget::Gaussian, false, &mut buf).unwrap();
    assert!(enforce_strict(&matching, true).is_ok());

    // Age slope far from the tutorial's -0.83
    write_heart_json_with_slope(&config.validation.data_dir, -0.5);
    let mut buf = Vec::new();
    let shifted = validate(&config, ValidateTarget::Gaussian, false, &mut buf).unwrap();
    assert!(mismatch_count(&shifted) > 0);
    assert!(output(buf).contains("MISMATCH"));
    assert!(enforce_strict(&shifted, false).is_ok());
    let err = enforce_strict(&shifted, true).unwrap_err();
    assert!(matches!(err, CliError::ValidationFailed(n) if n == mismatch_count(&shifted)));
}

#[test]
fn test_validate_missing_data() {
    let (_dir, config) = site();
    let mut buf = Vec::new();
    let result = validate(&config, ValidateTarget::Poisson, false, &mut buf);
    assert!(matches!(result, Err(CliError::Glm(_))));
}

#[test]
fn test_validate_targets() {
    assert_eq!(ValidateTarget::All.tutorials().len(), 5);
    assert_eq!(
        ValidateTarget::Negbin.tutorials(),
        vec![glmx_glm::Tutorial::NegBin]
    );
}
