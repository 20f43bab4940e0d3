//! Error types for the pages crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a page rewrite run.
///
/// Pages that merely lack an insertion point are not errors; they are
/// reported as skipped with a warning.
#[derive(Debug, Error)]
pub enum PagesError {
    /// I/O error reading or writing a page.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Page or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Error while walking a directory tree.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A page lives outside every known tutorial folder.
    #[error("Unknown tutorial folder for {0}")]
    UnknownTutorial(PathBuf),

    /// A directory that should hold pages does not exist.
    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),
}

impl PagesError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PagesError::Io {
            path: path.into(),
            source,
        }
    }
}
