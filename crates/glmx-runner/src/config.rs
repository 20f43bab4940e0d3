//! YAML configuration shared by all commands.
//!
//! Every field has a default, so the tools run from the site checkout
//! without any file:
//!
//! ```yaml
//! site:
//!   docs_dir: docs
//!   prototype_dir: prototype
//! terrain:
//!   output: docs/data/arthurs_seat_elevation.json
//!   batch_size: 100
//!   delay_secs: 2.0
//!   fetch_grid: { rows: 30, cols: 30 }
//!   synthetic_grid: { rows: 50, cols: 50 }
//! validation:
//!   data_dir: data
//!   cleveland: !file data/processed.cleveland.data
//! ```

use crate::CliError;
use glmx_glm::DataSources;
use glmx_terrain::{GeoBounds, GridSize, MAX_BATCH_SIZE, OPEN_METEO_ELEVATION_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "glmx.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub terrain: TerrainConfig,
    pub validation: DataSources,
}

/// Where the site's pages live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Published site root, holding `index.html` and `tutorials/`.
    pub docs_dir: PathBuf,
    /// Prototype site root, holding `tutorials/`.
    pub prototype_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            prototype_dir: PathBuf::from("prototype"),
        }
    }
}

impl SiteConfig {
    pub fn tutorials_dir(&self) -> PathBuf {
        self.docs_dir.join("tutorials")
    }

    pub fn index_page(&self) -> PathBuf {
        self.docs_dir.join("index.html")
    }

    pub fn prototype_tutorials_dir(&self) -> PathBuf {
        self.prototype_dir.join("tutorials")
    }
}

/// Elevation grid settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// JSON document both elevation commands write.
    pub output: PathBuf,
    /// Elevation API endpoint.
    pub api_url: String,
    /// Points per API request.
    pub batch_size: usize,
    /// Pause after each API request, in seconds.
    pub delay_secs: f64,
    pub fetch_grid: GridSize,
    pub synthetic_grid: GridSize,
    pub bounds: GeoBounds,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("docs/data/arthurs_seat_elevation.json"),
            api_url: OPEN_METEO_ELEVATION_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            delay_secs: 2.0,
            fetch_grid: GridSize::new(30, 30),
            synthetic_grid: GridSize::new(50, 50),
            bounds: GeoBounds::ARTHURS_SEAT,
        }
    }
}

impl TerrainConfig {
    /// Pause between API requests; `delay_secs` must be finite and non-negative.
    pub fn request_delay(&self) -> Result<Duration, CliError> {
        Duration::try_from_secs_f64(self.delay_secs).map_err(|e| {
            CliError::InvalidConfig(format!("terrain.delay_secs = {}: {}", self.delay_secs, e))
        })
    }
}

impl Config {
    /// Load `path`, or `glmx.yaml` if it exists, or fall back to defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse YAML text; an empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}
