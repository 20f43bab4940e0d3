//! Navigation links between tutorial pages.
//!
//! Every page gets a "← All Tutorials" link at the top of its header. The
//! final page of each tutorial (`advanced.html`) additionally has its
//! "Start Tutorial Over" button replaced by a link to the next tutorial, or
//! by a "Complete!" link back to the index for the last one.

use crate::catalog::{next_tutorial, NextTutorial};
use crate::edit::{EditOutcome, PageEdit, SkipReason};
use crate::Result;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<header>\s*<div class="container">)"#).expect("valid regex"));

/// Bottom navigation of `advanced.html`: the "Start Tutorial Over" link inside
/// the nav-buttons block.
static NAV_BUTTONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)(<div class="nav-buttons">.*?)(<a\b[^>]*>[^<]*?Start Tutorial Over.*?</a>)(.*?</div>)"#,
    )
    .expect("valid regex")
});

const INDEX_LINK: &str =
    r#"<a href="../../index.html" class="back-to-index">&larr; All Tutorials</a>"#;

const BACK_TO_INDEX_CSS: &str = r#"
    .back-to-index {
      display: inline-block;
      color: rgba(255,255,255,0.8);
      text-decoration: none;
      font-size: 0.85em;
      margin-bottom: 10px;
      transition: color 0.2s;
    }
    .back-to-index:hover {
      color: white;
    }
"#;

const BTN_SUCCESS_CSS: &str = r#"
    .btn-success {
      background: #27ae60;
      color: white;
    }
    .btn-success:hover {
      background: #219a52;
    }
"#;

const COMPLETION_LINK: &str = r#"<a href="../../index.html" class="btn btn-success">
          &#10003; Complete! Back to All Tutorials
        </a>"#;

fn next_link(next: &NextTutorial) -> String {
    format!(
        r#"<a href="../{}/systematic.html" class="btn btn-primary">
          Next: {} &rarr;
        </a>"#,
        next.folder, next.title
    )
}

/// Insert `css` before every closing style tag.
fn append_css(content: &str, css: &str) -> String {
    content.replace("</style>", &format!("{}  </style>", css))
}

/// Add the "All Tutorials" header link and its style.
///
/// Pages that already link to the index are returned unchanged, as are pages
/// without a `<header><div class="container">` block.
pub(crate) fn add_header_nav(content: &str) -> String {
    if content.contains("../../index.html") || content.contains("All Tutorials") {
        return content.to_string();
    }
    if !HEADER_RE.is_match(content) {
        return content.to_string();
    }

    let with_link = HEADER_RE
        .replace_all(content, |caps: &Captures| format!("{}\n      {}", &caps[1], INDEX_LINK))
        .into_owned();

    if with_link.contains(".back-to-index {") {
        with_link
    } else {
        append_css(&with_link, BACK_TO_INDEX_CSS)
    }
}

/// Replace the "Start Tutorial Over" link with the next step of the series.
pub(crate) fn update_advanced_nav(content: &str, next: Option<&NextTutorial>) -> String {
    let link = match next {
        Some(next) => next_link(next),
        None => COMPLETION_LINK.to_string(),
    };

    let updated = NAV_BUTTONS_RE
        .replace_all(content, |caps: &Captures| format!("{}{}{}", &caps[1], link, &caps[3]))
        .into_owned();

    if next.is_none() && !updated.contains(".btn-success") {
        append_css(&updated, BTN_SUCCESS_CSS)
    } else {
        updated
    }
}

/// Navigation link rewrite for tutorial pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Navigation;

impl PageEdit for Navigation {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn edit(&self, path: &Path, content: &str) -> Result<EditOutcome> {
        let mut updated = add_header_nav(content);
        let mut notes = Vec::new();
        if updated != content {
            notes.push("header link".to_string());
        }

        if path.file_name().is_some_and(|n| n == "advanced.html") {
            let folder = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or_default();

            match next_tutorial(folder) {
                Some(next) => {
                    let with_nav = update_advanced_nav(&updated, next.as_ref());
                    if with_nav != updated {
                        notes.push(match next {
                            Some(n) => format!("next: {}", n.folder),
                            None => "completion link".to_string(),
                        });
                    }
                    updated = with_nav;
                }
                None => {
                    warn!(path = %path.display(), "advanced page outside a known tutorial folder");
                }
            }
        }

        if updated == content {
            return Ok(EditOutcome::Skipped(SkipReason::NoChange));
        }
        Ok(EditOutcome::modified_with_note(updated, notes.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
<head>
  <style>
    body { margin: 0; }
  </style>
</head>
<body>
  <header>
    <div class="container">
      <h1>Systematic Component</h1>
    </div>
  </header>
</body>
</html>"#;

    const ADVANCED: &str = r#"<html>
<head>
  <style>
    .btn { padding: 8px; }
  </style>
</head>
<body>
  <header>
    <div class="container">
      <h1>Advanced</h1>
    </div>
  </header>
  <div class="nav-buttons">
    <a href="fitting.html" class="btn btn-secondary">&larr; Back</a>
    <a href="systematic.html" class="btn btn-primary">
      Start Tutorial Over
    </a>
  </div>
</body>
</html>"#;

    fn edit_at(path: &str, content: &str) -> EditOutcome {
        Navigation.edit(Path::new(path), content).unwrap()
    }

    #[test]
    fn test_header_link_inserted_once() {
        let updated = add_header_nav(PAGE);
        assert!(updated.contains(
            "<div class=\"container\">\n      <a href=\"../../index.html\" class=\"back-to-index\">"
        ));
        assert!(updated.contains(".back-to-index {"));
        assert_eq!(add_header_nav(&updated), updated);
    }

    #[test]
    fn test_header_without_container_is_untouched() {
        let page = "<html><style></style><body><h1>Hi</h1></body></html>";
        assert_eq!(add_header_nav(page), page);
    }

    #[test]
    fn test_next_tutorial_link() {
        let outcome = edit_at("docs/tutorials/02-logistic/advanced.html", ADVANCED);
        let content = outcome.content().unwrap();
        assert!(content.contains(r#"<a href="../03-poisson/systematic.html" class="btn btn-primary">"#));
        assert!(content.contains("Next: Bike Rental Demand &rarr;"));
        assert!(!content.contains("Start Tutorial Over"));
        // The back button survives
        assert!(content.contains("&larr; Back</a>"));
        // The old anchor is replaced, not nested
        assert!(!content.contains(r#"<a href="systematic.html""#));
    }

    #[test]
    fn test_last_tutorial_gets_completion_link() {
        let outcome = edit_at("docs/tutorials/05-gamma/advanced.html", ADVANCED);
        let content = outcome.content().unwrap();
        assert!(content.contains("&#10003; Complete! Back to All Tutorials"));
        assert!(content.contains(".btn-success {"));
    }

    #[test]
    fn test_navigation_is_idempotent() {
        let first = edit_at("docs/tutorials/05-gamma/advanced.html", ADVANCED);
        let content = first.content().unwrap().to_string();
        let second = edit_at("docs/tutorials/05-gamma/advanced.html", &content);
        assert_eq!(second, EditOutcome::Skipped(SkipReason::NoChange));

        let first = edit_at("docs/tutorials/01-gaussian/systematic.html", PAGE);
        let content = first.content().unwrap().to_string();
        let second = edit_at("docs/tutorials/01-gaussian/systematic.html", &content);
        assert_eq!(second, EditOutcome::Skipped(SkipReason::NoChange));
    }

    #[test]
    fn test_non_advanced_page_keeps_bottom_nav() {
        let outcome = edit_at("docs/tutorials/02-logistic/systematic.html", ADVANCED);
        let content = outcome.content().unwrap();
        assert!(content.contains("Start Tutorial Over"));
        assert!(content.contains("All Tutorials"));
    }
}
