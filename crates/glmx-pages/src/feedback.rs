//! Feedback widget script tag.

use crate::edit::{EditOutcome, PageEdit, SkipReason};
use crate::Result;
use std::path::Path;

/// Adds `<script src=".../feedback.js">` before `</body>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackWidget {
    script_src: String,
}

impl FeedbackWidget {
    /// Tutorial pages, two levels below the site root.
    pub fn for_tutorial() -> Self {
        Self::with_src("../../js/feedback.js")
    }

    /// The site index at the root.
    pub fn for_index() -> Self {
        Self::with_src("js/feedback.js")
    }

    /// Custom script location.
    pub fn with_src(script_src: impl Into<String>) -> Self {
        Self {
            script_src: script_src.into(),
        }
    }

    /// The tag inserted into pages.
    pub fn script_tag(&self) -> String {
        format!(r#"<script src="{}"></script>"#, self.script_src)
    }
}

impl PageEdit for FeedbackWidget {
    fn name(&self) -> &'static str {
        "feedback"
    }

    fn edit(&self, _path: &Path, content: &str) -> Result<EditOutcome> {
        if content.contains("feedback.js") {
            return Ok(EditOutcome::Skipped(SkipReason::AlreadyApplied("feedback.js")));
        }
        if !content.contains("</body>") {
            return Ok(EditOutcome::Skipped(SkipReason::MissingMarker("</body> tag")));
        }

        let updated = content.replace("</body>", &format!("\n  {}\n</body>", self.script_tag()));
        Ok(EditOutcome::modified_with_note(updated, "added feedback widget"))
    }
}
