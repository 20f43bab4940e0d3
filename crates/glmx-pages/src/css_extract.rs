//! Replace a prototype page's inline `<style>` block with the shared stylesheets.

use crate::catalog::theme_for_path;
use crate::edit::{EditOutcome, PageEdit, SkipReason};
use crate::Result;
use regex::{NoExpand, Regex};
use std::path::Path;
use std::sync::LazyLock;

/// Lines of rewritten page shown per file in a dry run.
pub const PREVIEW_LINES: usize = 20;

static STYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\s*<style>.*?</style>\s*").expect("valid regex"));

/// The shared stylesheet links for a theme, one per line.
pub fn css_links(theme: &str) -> String {
    format!(
        r#"  <!-- Shared CSS -->
  <link rel="stylesheet" href="../../css/base.css">
  <link rel="stylesheet" href="../../css/components.css">
  <link rel="stylesheet" href="../../css/dialogs.css">
  <link rel="stylesheet" href="../../css/progress.css">
  <link rel="stylesheet" href="../../css/themes/{}.css">"#,
        theme
    )
}

/// Inline CSS extraction.
///
/// The theme comes from the tutorial folder in the page path; a page outside
/// every known folder is an error rather than a skip.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssExtract;

impl PageEdit for CssExtract {
    fn name(&self) -> &'static str {
        "extract-css"
    }

    fn edit(&self, path: &Path, content: &str) -> Result<EditOutcome> {
        if content.contains("../../css/base.css") {
            return Ok(EditOutcome::Skipped(SkipReason::AlreadyApplied("shared CSS links")));
        }
        if !STYLE_BLOCK_RE.is_match(content) {
            return Ok(EditOutcome::Skipped(SkipReason::NoChange));
        }

        let theme = theme_for_path(path)?;
        let replacement = format!("\n{}\n", css_links(theme));
        let updated = STYLE_BLOCK_RE
            .replace(content, NoExpand(&replacement))
            .into_owned();

        Ok(EditOutcome::modified_with_note(updated, format!("theme: {}", theme)))
    }

    fn preview(&self, content: &str) -> Option<String> {
        let head: Vec<&str> = content.split('\n').take(PREVIEW_LINES).collect();
        Some(head.join("\n"))
    }
}
