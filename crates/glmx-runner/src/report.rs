//! Human-readable output of the page rewrite commands.

use glmx_pages::{BatchReport, FileOutcome, FileStatus, WriteMode};
use std::io::{self, Write};
use std::path::Path;

/// Banner printed before a dry run.
pub fn write_mode_banner(out: &mut dyn Write, mode: WriteMode) -> io::Result<()> {
    if mode.is_dry_run() {
        writeln!(out, "DRY RUN MODE - no files will be modified")?;
        writeln!(out)?;
    }
    Ok(())
}

/// One line per page, paths shown relative to `base` where possible.
pub fn write_outcome(out: &mut dyn Write, outcome: &FileOutcome, base: &Path) -> io::Result<()> {
    let path = outcome.path.strip_prefix(base).unwrap_or(&outcome.path);
    let path = path.display();
    match &outcome.status {
        FileStatus::Modified { note } => match note {
            Some(note) => writeln!(out, "  MODIFIED: {} ({})", path, note),
            None => writeln!(out, "  MODIFIED: {}", path),
        },
        FileStatus::WouldModify { note, preview } => {
            match note {
                Some(note) => writeln!(out, "  WOULD MODIFY: {} ({})", path, note)?,
                None => writeln!(out, "  WOULD MODIFY: {}", path)?,
            }
            if let Some(preview) = preview {
                for line in preview.lines() {
                    writeln!(out, "    {}", line)?;
                }
                writeln!(out, "    ...")?;
            }
            Ok(())
        }
        FileStatus::Skipped(reason) if reason.is_warning() => {
            writeln!(out, "  WARNING: {} ({})", path, reason)
        }
        FileStatus::Skipped(reason) => writeln!(out, "  SKIP ({}): {}", reason, path),
    }
}

/// Every outcome followed by the summary line.
pub fn write_batch(out: &mut dyn Write, report: &BatchReport, base: &Path, mode: WriteMode) -> io::Result<()> {
    for outcome in &report.files {
        write_outcome(out, outcome, base)?;
    }
    write_summary(out, report, mode)
}

/// Totals, and a reminder after a dry run.
pub fn write_summary(out: &mut dyn Write, report: &BatchReport, mode: WriteMode) -> io::Result<()> {
    writeln!(out)?;
    write!(
        out,
        "Summary: {} modified, {} skipped",
        report.modified(),
        report.skipped()
    )?;
    if report.warnings() > 0 {
        write!(out, " ({} with warnings)", report.warnings())?;
    }
    writeln!(out)?;
    if mode.is_dry_run() {
        writeln!(out)?;
        writeln!(out, "Run without --dry-run to apply changes")?;
    }
    Ok(())
}
