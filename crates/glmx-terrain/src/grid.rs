//! Elevation grid document and its geometry.

use crate::{Result, TerrainError};
use serde::{Deserialize, Serialize};

/// Geographic bounding box of a grid, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Southern edge (minimum latitude).
    pub south: f64,
    /// Northern edge (maximum latitude).
    pub north: f64,
    /// Western edge (minimum longitude).
    pub west: f64,
    /// Eastern edge (maximum longitude).
    pub east: f64,
}

impl GeoBounds {
    /// Arthur's Seat, Edinburgh. Roughly 1.5 km x 1.5 km centred on 55.9442, -3.1618.
    pub const ARTHURS_SEAT: GeoBounds = GeoBounds {
        south: 55.937,
        north: 55.952,
        west: -3.175,
        east: -3.150,
    };

    /// Check that the box has a positive extent in both directions.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.south, self.north, self.west, self.east]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.north <= self.south || self.east <= self.west {
            return Err(TerrainError::InvalidBounds {
                south: self.south,
                north: self.north,
                west: self.west,
                east: self.east,
            });
        }
        Ok(())
    }

    /// Check if a coordinate is within the bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }

    /// Latitude spacing between grid rows; zero when there is at most one row.
    pub fn lat_step(&self, size: GridSize) -> f64 {
        edge_step(self.north - self.south, size.rows)
    }

    /// Longitude spacing between grid columns; zero when there is at most one column.
    pub fn lon_step(&self, size: GridSize) -> f64 {
        edge_step(self.east - self.west, size.cols)
    }

    /// Latitude of a grid row (row 0 is the southern edge).
    pub fn lat_at(&self, row: usize, size: GridSize) -> f64 {
        self.south + row as f64 * self.lat_step(size)
    }

    /// Longitude of a grid column (column 0 is the western edge).
    pub fn lon_at(&self, col: usize, size: GridSize) -> f64 {
        self.west + col as f64 * self.lon_step(size)
    }
}

fn edge_step(extent: f64, samples: usize) -> f64 {
    match samples.saturating_sub(1) {
        0 => 0.0,
        gaps => extent / gaps as f64,
    }
}

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows (latitude samples).
    pub rows: usize,
    /// Number of columns (longitude samples).
    pub cols: usize,
}

impl GridSize {
    /// Create a new grid size.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether the grid has no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject grids that cannot place a sample on both edges of the box.
    pub fn validate(&self) -> Result<()> {
        if self.rows < 2 || self.cols < 2 {
            return Err(TerrainError::InvalidGridSize {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Split a flat row-major index into (row, col).
    pub fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

/// Summary statistics over all samples of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationStats {
    /// Lowest elevation (m).
    pub min: f64,
    /// Highest elevation (m).
    pub max: f64,
    /// Mean elevation (m).
    pub mean: f64,
}

impl ElevationStats {
    /// Compute statistics over a set of samples.
    ///
    /// Returns `None` for an empty set.
    pub fn from_samples<'a, I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in samples {
            min = min.min(value);
            max = max.max(value);
            sum += value;
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            mean: sum / count as f64,
        })
    }

    /// Round every field to one decimal place.
    pub fn rounded(&self) -> Self {
        Self {
            min: round1(self.min),
            max: round1(self.max),
            mean: round1(self.mean),
        }
    }
}

/// A named landmark annotated on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Elevation in metres.
    pub elevation: f64,
}

/// Elevation grid document as served to the visualisation.
///
/// Field order matches the JSON layout consumed by the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationGrid {
    /// Display name of the area.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Data provenance.
    pub source: String,
    /// Nominal resolution of the source DEM in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_m: Option<u32>,
    /// Bounding box.
    pub bounds: GeoBounds,
    /// Grid dimensions.
    pub grid: GridSize,
    /// Elevations in metres, row-major, row 0 at the southern edge.
    pub elevations: Vec<Vec<f64>>,
    /// Summary statistics.
    pub stats: ElevationStats,
    /// Optional landmark annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Vec<Peak>>,
}

impl ElevationGrid {
    /// Check that the elevation array has exactly `rows x cols` values.
    pub fn validate(&self) -> Result<()> {
        if self.elevations.len() != self.grid.rows {
            return Err(TerrainError::GridShape(format!(
                "{} rows present, {} stated",
                self.elevations.len(),
                self.grid.rows
            )));
        }
        for (i, row) in self.elevations.iter().enumerate() {
            if row.len() != self.grid.cols {
                return Err(TerrainError::GridShape(format!(
                    "row {} has {} columns, {} stated",
                    i,
                    row.len(),
                    self.grid.cols
                )));
            }
        }
        Ok(())
    }

    /// Elevation at a grid cell.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.elevations.get(row)?.get(col).copied()
    }

    /// Iterate all samples in row-major order.
    pub fn samples(&self) -> impl Iterator<Item = &f64> {
        self.elevations.iter().flatten()
    }
}

/// Reshape a flat row-major vector into rows of `cols` values.
pub(crate) fn reshape(flat: Vec<f64>, size: GridSize) -> Result<Vec<Vec<f64>>> {
    if flat.len() != size.len() {
        return Err(TerrainError::GridShape(format!(
            "{} samples for a {}x{} grid",
            flat.len(),
            size.rows,
            size.cols
        )));
    }
    Ok(flat.chunks(size.cols).map(|row| row.to_vec()).collect())
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
