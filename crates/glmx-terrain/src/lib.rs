//! # glmx-terrain
//!
//! Elevation grids for the hill-climbing optimisation visualisation on the
//! GLM explainer site.
//!
//! This crate provides two ways of producing the same JSON document:
//! - Real elevations sampled from the Open-Meteo elevation API (Copernicus
//!   DEM GLO-90), fetched in rate-limited batches
//! - Synthetic elevations built from a sum of 2D Gaussian bumps that mimic the
//!   topography of Arthur's Seat, Edinburgh
//!
//! ## Grid Layout
//!
//! Grids are sampled on a regular lat/lon lattice inside a bounding box. Row 0
//! is the southern edge and column 0 the western edge; elevations are stored
//! row-major. The first and last samples sit exactly on the box edges, so a
//! grid needs at least two rows and two columns.
//!
//! ## Examples
//!
//! ### Synthetic Terrain
//!
//! ```no_run
//! use glmx_terrain::{generate_grid, write_grid, GeoBounds, GridSize, TerrainModel};
//!
//! let model = TerrainModel::arthurs_seat();
//! let grid = generate_grid(&model, GeoBounds::ARTHURS_SEAT, GridSize::new(50, 50))?;
//! write_grid(&grid, "docs/data/arthurs_seat_elevation.json")?;
//! println!("Highest point: {:.1} m", grid.stats.max);
//! # Ok::<(), glmx_terrain::TerrainError>(())
//! ```
//!
//! ### Fetching From Open-Meteo
//!
//! ```no_run
//! use glmx_terrain::{fetch_grid, BatchPlan, GeoBounds, GridSize, OpenMeteoClient};
//!
//! let client = OpenMeteoClient::new()?;
//! let grid = fetch_grid(
//!     &client,
//!     GeoBounds::ARTHURS_SEAT,
//!     GridSize::new(30, 30),
//!     &BatchPlan::default(),
//!     None,
//! )?;
//! println!("Mean elevation: {:.1} m", grid.stats.mean);
//! # Ok::<(), glmx_terrain::TerrainError>(())
//! ```

mod error;
mod fetch;
mod grid;
mod output;
mod synth;

pub use error::TerrainError;
pub use fetch::{
    build_request_url, fetch_grid, grid_points, BatchPlan, ElevationApi, GeoPoint,
    OpenMeteoClient, ProgressCallback, MAX_BATCH_SIZE, OPEN_METEO_ELEVATION_URL,
};
pub use grid::{ElevationGrid, ElevationStats, GeoBounds, GridSize, Peak};
pub use output::{read_grid, write_grid};
pub use synth::{generate_grid, GaussianBump, TerrainModel};

/// Result type for terrain operations.
pub type Result<T> = std::result::Result<T, TerrainError>;
