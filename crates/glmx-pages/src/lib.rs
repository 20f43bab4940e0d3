//! # glmx-pages
//!
//! Text rewrites applied to the static tutorial pages of the GLM explainer.
//!
//! Every rewrite is a [`PageEdit`]: it receives the page text and either
//! returns the new text or explains why it left the page alone. Rewrites are
//! guarded by a marker check so that running them again is a no-op, and the
//! batch driver can run in [`WriteMode::DryRun`] to report what would change
//! without touching any file.
//!
//! ## Rewrites
//!
//! - [`Navigation`] - "All Tutorials" header link, and "Next tutorial" /
//!   "Complete" links at the bottom of each tutorial's `advanced.html`
//! - [`FeedbackWidget`] - `<script>` tag for `feedback.js` before `</body>`
//! - [`MobilePicker`] - tap-to-select CSS, `variable-picker.js`, and the
//!   `initVariablePicker` version of `setupDropZones`
//! - [`CssExtract`] - replaces inline `<style>` blocks with the shared
//!   stylesheets and the tutorial's theme
//!
//! ## Example
//!
//! ```no_run
//! use glmx_pages::{html_files_under, run_batch, Navigation, WriteMode};
//!
//! let files = html_files_under("docs/tutorials")?;
//! let report = run_batch(&Navigation, &files, WriteMode::DryRun)?;
//! println!("{} would change, {} skipped", report.modified(), report.skipped());
//! # Ok::<(), glmx_pages::PagesError>(())
//! ```

mod catalog;
mod css_extract;
mod edit;
mod error;
mod feedback;
mod mobile_picker;
mod navigation;
mod targets;

pub use catalog::{next_tutorial, theme_for_path, tutorial, NextTutorial, Tutorial, TUTORIALS};
pub use css_extract::{css_links, CssExtract, PREVIEW_LINES};
pub use edit::{
    apply_edit, run_batch, BatchReport, EditOutcome, FileOutcome, FileStatus, PageEdit,
    SkipReason, WriteMode,
};
pub use error::PagesError;
pub use feedback::FeedbackWidget;
pub use mobile_picker::{MobilePicker, MOBILE_PICKER_TUTORIALS};
pub use navigation::Navigation;
pub use targets::{html_files_in, html_files_under, systematic_pages, tutorial_dirs};

/// Result type for page operations.
pub type Result<T> = std::result::Result<T, PagesError>;
