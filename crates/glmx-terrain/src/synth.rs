//! Synthetic terrain from superposed 2D Gaussian bumps.
//!
//! Bumps are placed in normalised coordinates: `x` runs 0..1 from the west
//! edge to the east edge and `y` runs 0..1 from the south edge to the north
//! edge, so a model can be reused on any bounding box.

use crate::grid::{round1, ElevationGrid, ElevationStats, GeoBounds, GridSize, Peak};
use crate::{Result, TerrainError};
use tracing::info;

/// An anisotropic 2D Gaussian bump, optionally rotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBump {
    /// Centre x (normalised, 0 = west edge).
    pub cx: f64,
    /// Centre y (normalised, 0 = south edge).
    pub cy: f64,
    /// Peak height above the surrounding surface (m).
    pub height: f64,
    /// Spread along the bump's own x axis.
    pub sigma_x: f64,
    /// Spread along the bump's own y axis.
    pub sigma_y: f64,
    /// Counter-clockwise rotation of the bump axes (radians).
    pub rotation: f64,
}

impl GaussianBump {
    /// Circular bump.
    pub const fn round(cx: f64, cy: f64, height: f64, sigma: f64) -> Self {
        Self {
            cx,
            cy,
            height,
            sigma_x: sigma,
            sigma_y: sigma,
            rotation: 0.0,
        }
    }

    /// Axis-aligned elliptical bump.
    pub const fn elliptical(cx: f64, cy: f64, height: f64, sigma_x: f64, sigma_y: f64) -> Self {
        Self {
            cx,
            cy,
            height,
            sigma_x,
            sigma_y,
            rotation: 0.0,
        }
    }

    /// Same bump with rotated axes.
    pub const fn rotated(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Height contributed at normalised position (x, y).
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let (sin_r, cos_r) = self.rotation.sin_cos();
        let dx = x - self.cx;
        let dy = y - self.cy;
        let x_rot = dx * cos_r + dy * sin_r;
        let y_rot = -dx * sin_r + dy * cos_r;

        self.height
            * (-(x_rot.powi(2) / (2.0 * self.sigma_x.powi(2))
                + y_rot.powi(2) / (2.0 * self.sigma_y.powi(2))))
            .exp()
    }
}

/// A base elevation plus a set of bumps.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainModel {
    /// Elevation far from every bump (m).
    pub base: f64,
    /// Bumps added on top of the base.
    pub bumps: Vec<GaussianBump>,
}

impl TerrainModel {
    /// Arthur's Seat approximation.
    ///
    /// The real hill peaks at 251 m near 55.9442, -3.1618, with the Salisbury
    /// Crags ridge (~150 m) running NW-SE and several smaller tops around a
    /// saddle.
    pub fn arthurs_seat() -> Self {
        Self {
            base: 30.0,
            bumps: vec![
                // Main summit, ~(0.37, 0.47) in normalised coords
                GaussianBump::elliptical(0.37, 0.47, 220.0, 0.12, 0.10),
                // Salisbury Crags
                GaussianBump::elliptical(0.25, 0.60, 130.0, 0.20, 0.06).rotated(0.5),
                // Crow Hill
                GaussianBump::round(0.55, 0.35, 90.0, 0.08),
                // Whinny Hill
                GaussianBump::elliptical(0.70, 0.55, 70.0, 0.10, 0.08),
                // Dunsapie Loch
                GaussianBump::round(0.60, 0.70, 50.0, 0.07),
                // Holyrood Park base
                GaussianBump::round(0.15, 0.25, 40.0, 0.15),
                // Texture
                GaussianBump::round(0.45, 0.30, 30.0, 0.05),
                GaussianBump::round(0.30, 0.40, 25.0, 0.04),
                GaussianBump::elliptical(0.50, 0.60, 35.0, 0.06, 0.05),
            ],
        }
    }

    /// Elevation at normalised position (x, y).
    pub fn elevation_normalised(&self, x: f64, y: f64) -> f64 {
        self.base + self.bumps.iter().map(|b| b.evaluate(x, y)).sum::<f64>()
    }

    /// Elevation at a geographic coordinate inside `bounds`.
    pub fn elevation_at(&self, bounds: &GeoBounds, lat: f64, lon: f64) -> f64 {
        let x = (lon - bounds.west) / (bounds.east - bounds.west);
        let y = (lat - bounds.south) / (bounds.north - bounds.south);
        self.elevation_normalised(x, y)
    }

    /// Upper bound on any elevation the model can produce.
    pub fn ceiling(&self) -> f64 {
        self.base + self.bumps.iter().map(|b| b.height.max(0.0)).sum::<f64>()
    }
}

/// Landmarks annotated next to the computed summit.
fn reference_peaks() -> [Peak; 2] {
    [
        Peak {
            name: "Salisbury Crags".to_string(),
            lat: 55.946,
            lon: -3.169,
            elevation: 150.0,
        },
        Peak {
            name: "Secondary Peak".to_string(),
            lat: 55.942,
            lon: -3.158,
            elevation: 110.0,
        },
    ]
}

/// Evaluate a terrain model over a grid.
///
/// Stored elevations are rounded to 0.1 m. Statistics and the summit are
/// computed from the unrounded values; the summit is the first sample (in
/// row-major order) holding the maximum.
pub fn generate_grid(model: &TerrainModel, bounds: GeoBounds, size: GridSize) -> Result<ElevationGrid> {
    bounds.validate()?;
    size.validate()?;

    let mut elevations = Vec::with_capacity(size.rows);
    let mut raw = Vec::with_capacity(size.len());

    for row in 0..size.rows {
        let lat = bounds.lat_at(row, size);
        let mut values = Vec::with_capacity(size.cols);
        for col in 0..size.cols {
            let lon = bounds.lon_at(col, size);
            let elevation = model.elevation_at(&bounds, lat, lon);
            values.push(round1(elevation));
            raw.push(elevation);
        }
        elevations.push(values);
    }

    let stats = ElevationStats::from_samples(&raw)
        .ok_or_else(|| TerrainError::GridShape("no samples generated".to_string()))?;

    let mut max_index = 0;
    for (index, &value) in raw.iter().enumerate() {
        if value > raw[max_index] {
            max_index = index;
        }
    }
    let (max_row, max_col) = size.row_col(max_index);
    let summit = Peak {
        name: "Main Summit".to_string(),
        lat: bounds.lat_at(max_row, size),
        lon: bounds.lon_at(max_col, size),
        elevation: round1(raw[max_index]),
    };

    info!(
        rows = size.rows,
        cols = size.cols,
        max = stats.max,
        summit_lat = summit.lat,
        summit_lon = summit.lon,
        "generated synthetic terrain"
    );

    let mut peaks = vec![summit];
    peaks.extend(reference_peaks());

    Ok(ElevationGrid {
        name: "Arthur's Seat (Synthetic)".to_string(),
        description: "Synthetic elevation data mimicking Arthur's Seat topography for optimisation visualisation"
            .to_string(),
        source: "Generated using multiple Gaussian peaks".to_string(),
        resolution_m: None,
        bounds,
        grid: size,
        elevations,
        stats: stats.rounded(),
        peaks: Some(peaks),
    })
}
