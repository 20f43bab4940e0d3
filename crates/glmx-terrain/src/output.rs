//! Reading and writing grid documents.

use crate::grid::ElevationGrid;
use crate::Result;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write a grid as pretty-printed JSON, creating parent directories.
///
/// The grid shape is checked before anything touches the disk.
pub fn write_grid<P: AsRef<Path>>(grid: &ElevationGrid, path: P) -> Result<()> {
    let path = path.as_ref();
    grid.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(grid)?;
    fs::write(path, json)?;

    info!(path = %path.display(), "saved elevation grid");
    Ok(())
}

/// Load a grid document and check its shape.
pub fn read_grid<P: AsRef<Path>>(path: P) -> Result<ElevationGrid> {
    let text = fs::read_to_string(path)?;
    let grid: ElevationGrid = serde_json::from_str(&text)?;
    grid.validate()?;
    Ok(grid)
}
