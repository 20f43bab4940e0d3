//! The page-edit abstraction and the batch driver.

use crate::{PagesError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Whether edits are written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Write modified pages.
    Apply,
    /// Report what would change, write nothing.
    DryRun,
}

impl WriteMode {
    /// Pick the mode from a `--dry-run` flag.
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            WriteMode::DryRun
        } else {
            WriteMode::Apply
        }
    }

    /// Whether this is a dry run.
    pub fn is_dry_run(self) -> bool {
        self == WriteMode::DryRun
    }
}

/// Why a page was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The page already carries the edit's marker.
    AlreadyApplied(&'static str),
    /// The insertion point the edit needs is missing.
    MissingMarker(&'static str),
    /// The edit ran but produced identical text.
    NoChange,
}

impl SkipReason {
    /// Whether the skip deserves a warning rather than a quiet note.
    pub fn is_warning(&self) -> bool {
        matches!(self, SkipReason::MissingMarker(_))
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyApplied(what) => write!(f, "already has {}", what),
            SkipReason::MissingMarker(what) => write!(f, "no {} found", what),
            SkipReason::NoChange => write!(f, "no changes needed"),
        }
    }
}

/// Result of running an edit over one page's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The page text changed.
    Modified {
        /// New page text.
        content: String,
        /// Short description of what changed, for the report.
        note: Option<String>,
    },
    /// The page was left alone.
    Skipped(SkipReason),
}

impl EditOutcome {
    /// Modified outcome without a note.
    pub fn modified(content: String) -> Self {
        EditOutcome::Modified {
            content,
            note: None,
        }
    }

    /// Modified outcome with a note.
    pub fn modified_with_note(content: String, note: impl Into<String>) -> Self {
        EditOutcome::Modified {
            content,
            note: Some(note.into()),
        }
    }

    /// New text if the page changed.
    pub fn content(&self) -> Option<&str> {
        match self {
            EditOutcome::Modified { content, .. } => Some(content),
            EditOutcome::Skipped(_) => None,
        }
    }
}

/// A text rewrite applied to a page.
pub trait PageEdit {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    /// Rewrite the page text.
    ///
    /// `path` is only used for decisions that depend on where the page
    /// lives (tutorial folder, file name); the edit must not touch the disk.
    fn edit(&self, path: &Path, content: &str) -> Result<EditOutcome>;

    /// Excerpt of the new text to show in dry-run reports.
    fn preview(&self, _content: &str) -> Option<String> {
        None
    }
}

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The page was rewritten.
    Modified {
        /// Edit note, if any.
        note: Option<String>,
    },
    /// The page would be rewritten (dry run).
    WouldModify {
        /// Edit note, if any.
        note: Option<String>,
        /// Excerpt of the new text, if the edit provides one.
        preview: Option<String>,
    },
    /// The page was left alone.
    Skipped(SkipReason),
}

/// Outcome for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Page path.
    pub path: PathBuf,
    /// What happened.
    pub status: FileStatus,
}

impl FileOutcome {
    /// Whether the page was (or would be) rewritten.
    pub fn is_modified(&self) -> bool {
        !matches!(self.status, FileStatus::Skipped(_))
    }
}

/// Per-page outcomes of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Outcomes in processing order.
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    /// Pages rewritten (or that would be, in a dry run).
    pub fn modified(&self) -> usize {
        self.files.iter().filter(|f| f.is_modified()).count()
    }

    /// Pages left alone.
    pub fn skipped(&self) -> usize {
        self.files.len() - self.modified()
    }

    /// Pages skipped because an insertion point was missing.
    pub fn warnings(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(&f.status, FileStatus::Skipped(r) if r.is_warning()))
            .count()
    }

    /// Append another report.
    pub fn merge(&mut self, other: BatchReport) {
        self.files.extend(other.files);
    }
}

/// Read a page, run an edit over it, and write it back unless in dry-run mode.
pub fn apply_edit(edit: &dyn PageEdit, path: &Path, mode: WriteMode) -> Result<FileOutcome> {
    let content = fs::read_to_string(path).map_err(|e| PagesError::io(path, e))?;

    let status = match edit.edit(path, &content)? {
        EditOutcome::Skipped(reason) => {
            if reason.is_warning() {
                warn!(edit = edit.name(), path = %path.display(), "{}", reason);
            } else {
                debug!(edit = edit.name(), path = %path.display(), "skip: {}", reason);
            }
            FileStatus::Skipped(reason)
        }
        EditOutcome::Modified { content: new_content, note } => {
            if new_content == content {
                FileStatus::Skipped(SkipReason::NoChange)
            } else if mode.is_dry_run() {
                FileStatus::WouldModify {
                    note,
                    preview: edit.preview(&new_content),
                }
            } else {
                fs::write(path, &new_content).map_err(|e| PagesError::io(path, e))?;
                debug!(edit = edit.name(), path = %path.display(), "rewrote page");
                FileStatus::Modified { note }
            }
        }
    };

    Ok(FileOutcome {
        path: path.to_path_buf(),
        status,
    })
}

/// Run an edit over a list of pages.
///
/// Stops at the first error; pages processed before it keep their changes.
pub fn run_batch(edit: &dyn PageEdit, paths: &[PathBuf], mode: WriteMode) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    for path in paths {
        report.files.push(apply_edit(edit, path, mode)?);
    }
    Ok(report)
}
