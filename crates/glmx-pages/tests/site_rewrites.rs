//! End-to-end runs of every rewrite over a small site tree on disk.

use glmx_pages::{
    html_files_in, html_files_under, run_batch, systematic_pages, CssExtract, FeedbackWidget,
    FileStatus, MobilePicker, Navigation, WriteMode, MOBILE_PICKER_TUTORIALS,
};
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

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let tutorials = dir.path().join("docs/tutorials");
    for folder in ["01-gaussian", "02-logistic", "05-gamma"] {
        write(&tutorials.join(folder).join("intro.html"), TUTORIAL_PAGE);
        write(&tutorials.join(folder).join("advanced.html"), TUTORIAL_PAGE);
    }
    write(&tutorials.join("02-logistic/systematic.html"), SYSTEMATIC_PAGE);
    write(&dir.path().join("docs/index.html"), "<html><body></body></html>");
    dir
}

#[test]
fn test_dry_run_leaves_files_untouched() {
    let dir = site();
    let files = html_files_under(dir.path().join("docs/tutorials")).unwrap();
    assert_eq!(files.len(), 7);

    // The systematic page has no header block to link from
    let report = run_batch(&Navigation, &files, WriteMode::DryRun).unwrap();
    assert_eq!(report.modified(), 6);
    assert_eq!(report.skipped(), 1);
    assert!(report
        .files
        .iter()
        .filter(|f| f.is_modified())
        .all(|f| matches!(f.status, FileStatus::WouldModify { .. })));

    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        assert!(!content.contains("All Tutorials"));
    }
}

#[test]
fn test_every_rewrite_is_idempotent() {
    let dir = site();
    let tutorials = dir.path().join("docs/tutorials");
    let pages = html_files_under(&tutorials).unwrap();

    let first = run_batch(&Navigation, &pages, WriteMode::Apply).unwrap();
    assert_eq!(first.modified(), pages.len() - 1);
    let again = run_batch(&Navigation, &pages, WriteMode::Apply).unwrap();
    assert_eq!(again.modified(), 0);

    let first = run_batch(&FeedbackWidget::for_tutorial(), &pages, WriteMode::Apply).unwrap();
    assert_eq!(first.modified(), pages.len());
    let again = run_batch(&FeedbackWidget::for_tutorial(), &pages, WriteMode::Apply).unwrap();
    assert_eq!(again.modified(), 0);

    let systematic = systematic_pages(&tutorials, &MOBILE_PICKER_TUTORIALS);
    assert_eq!(systematic.len(), 1);
    let first = run_batch(&MobilePicker, &systematic, WriteMode::Apply).unwrap();
    assert_eq!(first.modified(), 1);
    let again = run_batch(&MobilePicker, &systematic, WriteMode::Apply).unwrap();
    assert_eq!(again.modified(), 0);

    let first = run_batch(&CssExtract, &pages, WriteMode::Apply).unwrap();
    assert_eq!(first.modified(), pages.len());
    let again = run_batch(&CssExtract, &pages, WriteMode::Apply).unwrap();
    assert_eq!(again.modified(), 0);
}

#[test]
fn test_site_after_all_rewrites() {
    let dir = site();
    let tutorials = dir.path().join("docs/tutorials");
    let pages = html_files_under(&tutorials).unwrap();

    run_batch(&Navigation, &pages, WriteMode::Apply).unwrap();
    run_batch(&FeedbackWidget::for_tutorial(), &pages, WriteMode::Apply).unwrap();
    let index = html_files_in(dir.path().join("docs")).unwrap();
    run_batch(&FeedbackWidget::for_index(), &index, WriteMode::Apply).unwrap();

    let logistic = fs::read_to_string(tutorials.join("02-logistic/advanced.html")).unwrap();
    assert!(logistic.contains("../03-poisson/systematic.html"));
    assert!(logistic.contains("../../js/feedback.js"));

    let gamma = fs::read_to_string(tutorials.join("05-gamma/advanced.html")).unwrap();
    assert!(gamma.contains("Complete! Back to All Tutorials"));

    let index = fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
    assert!(index.contains(r#"<script src="js/feedback.js"></script>"#));
}

#[test]
fn test_missing_body_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("fragment.html");
    write(&page, "<div>no body here</div>");

    let report = run_batch(&FeedbackWidget::for_tutorial(), &[page], WriteMode::Apply).unwrap();
    assert_eq!(report.modified(), 0);
    assert_eq!(report.warnings(), 1);
}
