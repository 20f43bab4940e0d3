//! Locating the pages each rewrite applies to.

use crate::{PagesError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
}

fn require_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(PagesError::MissingDirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// Every `.html` file below `dir`, recursively, sorted by path.
pub fn html_files_under<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    require_dir(dir)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && is_html(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// The `.html` files directly inside `dir`, sorted by path.
pub fn html_files_in<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    require_dir(dir)?;

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PagesError::io(dir, e))? {
        let path = entry.map_err(|e| PagesError::io(dir, e))?.path();
        if path.is_file() && is_html(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Subdirectories of `dir` whose names start with one of `prefixes`, sorted.
pub fn tutorial_dirs<P: AsRef<Path>>(dir: P, prefixes: &[&str]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    require_dir(dir)?;

    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PagesError::io(dir, e))? {
        let path = entry.map_err(|e| PagesError::io(dir, e))?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| prefixes.iter().any(|p| name.starts_with(p)));
        if path.is_dir() && matches {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// `systematic.html` of each named tutorial, skipping tutorials without one.
pub fn systematic_pages<P: AsRef<Path>>(tutorials_dir: P, folders: &[&str]) -> Vec<PathBuf> {
    let tutorials_dir = tutorials_dir.as_ref();
    folders
        .iter()
        .map(|folder| tutorials_dir.join(folder).join("systematic.html"))
        .filter(|path| path.exists())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    #[test]
    fn test_html_files_under_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("02-logistic/systematic.html"));
        touch(&dir.path().join("01-gaussian/advanced.html"));
        touch(&dir.path().join("01-gaussian/notes.txt"));

        let files = html_files_under(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("01-gaussian/advanced.html"));
        assert!(files[1].ends_with("02-logistic/systematic.html"));
    }

    #[test]
    fn test_tutorial_dirs_filters_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["03-poisson", "01-gaussian", "assets", "06-extra"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        let dirs = tutorial_dirs(dir.path(), &["01", "02", "03", "04", "05"]).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["01-gaussian", "03-poisson"]);
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            html_files_under("/definitely/not/here"),
            Err(PagesError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_systematic_pages_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("03-poisson/systematic.html"));
        let pages = systematic_pages(dir.path(), &["02-logistic", "03-poisson"]);
        assert_eq!(pages, vec![dir.path().join("03-poisson/systematic.html")]);
    }
}
