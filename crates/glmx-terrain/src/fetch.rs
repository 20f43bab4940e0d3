//! Open-Meteo elevation fetcher.
//!
//! The Open-Meteo elevation endpoint takes comma-separated latitude and
//! longitude lists and answers with one elevation per point:
//!
//! ```text
//! GET https://api.open-meteo.com/v1/elevation?latitude=55.937000,55.937000&longitude=-3.175000,-3.174138
//! {"elevation":[61.0,63.0]}
//! ```
//!
//! ## Rate Limiting
//!
//! The API accepts at most 100 points per request and throttles clients that
//! call it in quick succession. Grids are therefore requested in sequential
//! batches with a fixed pause after each one. A 30x30 grid is 9 batches and
//! takes about 20 seconds with the default 2 second pause.

use crate::grid::{reshape, ElevationGrid, ElevationStats, GeoBounds, GridSize};
use crate::{Result, TerrainError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Open-Meteo elevation endpoint.
pub const OPEN_METEO_ELEVATION_URL: &str = "https://api.open-meteo.com/v1/elevation";

/// Maximum number of points the API accepts in one request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Default pause between batches.
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Nominal resolution of the Copernicus GLO-90 DEM behind the API.
const GLO90_RESOLUTION_M: u32 = 90;

/// A single sample location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Callback for batch progress messages.
pub type ProgressCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Source of elevations for a batch of points.
///
/// Implementations must return exactly one elevation per point, in order.
pub trait ElevationApi {
    /// Fetch elevations for a batch of points.
    fn fetch_batch(&self, batch_index: usize, points: &[GeoPoint]) -> Result<Vec<f64>>;
}

/// How a grid is split into requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchPlan {
    /// Points per request (1 to [`MAX_BATCH_SIZE`]).
    pub batch_size: usize,
    /// Pause after every request.
    pub delay: Duration,
}

impl Default for BatchPlan {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

impl BatchPlan {
    /// Create a plan, rejecting batch sizes the API would refuse.
    pub fn new(batch_size: usize, delay: Duration) -> Result<Self> {
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(TerrainError::InvalidBatchSize(batch_size));
        }
        Ok(Self { batch_size, delay })
    }

    /// Number of requests needed for `points` samples.
    pub fn batch_count(&self, points: usize) -> usize {
        points.div_ceil(self.batch_size)
    }
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    elevation: Vec<f64>,
}

/// Blocking HTTP client for the Open-Meteo elevation API.
#[derive(Debug)]
pub struct OpenMeteoClient {
    /// Endpoint URL (without query string).
    base_url: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenMeteoClient {
    /// Create a client for the public endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(OPEN_METEO_ELEVATION_URL)
    }

    /// Create a client for a custom endpoint (mirrors, local test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Get the endpoint URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ElevationApi for OpenMeteoClient {
    fn fetch_batch(&self, batch_index: usize, points: &[GeoPoint]) -> Result<Vec<f64>> {
        let url = build_request_url(&self.base_url, points);
        debug!(batch = batch_index, points = points.len(), "requesting elevations");

        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(TerrainError::RequestFailed {
                batch: batch_index,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body: ElevationResponse = serde_json::from_str(&response.text()?)?;

        if body.elevation.len() != points.len() {
            return Err(TerrainError::BatchLength {
                batch: batch_index,
                expected: points.len(),
                got: body.elevation.len(),
            });
        }

        Ok(body.elevation)
    }
}

/// Build the request URL for a batch of points.
///
/// Coordinates are written with six decimal places (about 0.1 m).
pub fn build_request_url(base_url: &str, points: &[GeoPoint]) -> String {
    let lats = points
        .iter()
        .map(|p| format!("{:.6}", p.lat))
        .collect::<Vec<_>>()
        .join(",");
    let lons = points
        .iter()
        .map(|p| format!("{:.6}", p.lon))
        .collect::<Vec<_>>()
        .join(",");

    format!("{}?latitude={}&longitude={}", base_url, lats, lons)
}

/// All sample locations of a grid in row-major order (south to north, west to east).
pub fn grid_points(bounds: GeoBounds, size: GridSize) -> Vec<GeoPoint> {
    let mut points = Vec::with_capacity(size.len());
    for row in 0..size.rows {
        let lat = bounds.lat_at(row, size);
        for col in 0..size.cols {
            points.push(GeoPoint {
                lat,
                lon: bounds.lon_at(col, size),
            });
        }
    }
    points
}

/// Fetch a full elevation grid.
///
/// Batches are requested one after another with `plan.delay` between them.
/// Any request or decoding failure aborts the whole fetch.
pub fn fetch_grid(
    api: &dyn ElevationApi,
    bounds: GeoBounds,
    size: GridSize,
    plan: &BatchPlan,
    progress: Option<&ProgressCallback>,
) -> Result<ElevationGrid> {
    bounds.validate()?;
    size.validate()?;
    // Re-check in case the plan was built with a struct literal.
    let plan = BatchPlan::new(plan.batch_size, plan.delay)?;

    let points = grid_points(bounds, size);
    let total_batches = plan.batch_count(points.len());

    info!(
        points = points.len(),
        rows = size.rows,
        cols = size.cols,
        batches = total_batches,
        "fetching elevation grid"
    );

    let mut elevations = Vec::with_capacity(points.len());

    for (index, batch) in points.chunks(plan.batch_size).enumerate() {
        let message = format!("Fetching batch {} of {}...", index + 1, total_batches);
        info!("{}", message);
        if let Some(cb) = progress {
            cb(&message);
        }

        let values = api.fetch_batch(index, batch)?;
        if values.len() != batch.len() {
            return Err(TerrainError::BatchLength {
                batch: index,
                expected: batch.len(),
                got: values.len(),
            });
        }
        elevations.extend(values);

        if !plan.delay.is_zero() {
            std::thread::sleep(plan.delay);
        }
    }

    let stats = ElevationStats::from_samples(&elevations)
        .ok_or_else(|| TerrainError::GridShape("no samples fetched".to_string()))?;

    Ok(ElevationGrid {
        name: "Arthur's Seat, Edinburgh".to_string(),
        description: "Elevation data for optimisation visualisation".to_string(),
        source: "Open-Meteo Elevation API (Copernicus DEM GLO-90)".to_string(),
        resolution_m: Some(GLO90_RESOLUTION_M),
        bounds,
        grid: size,
        elevations: reshape(elevations, size)?,
        stats,
        peaks: None,
    })
}
