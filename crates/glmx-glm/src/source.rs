//! Where the validation datasets come from.

use crate::data::Dataset;
use crate::{GlmError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// UCI processed Cleveland heart-disease data (header-less, `?` for missing).
pub const CLEVELAND_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/heart-disease/processed.cleveland.data";

/// Column names of the Cleveland file.
pub const CLEVELAND_COLUMNS: [&str; 14] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal", "target",
];

/// A local file or a URL to download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Url(CLEVELAND_URL.to_string())
    }
}

impl DataSource {
    /// Contents as text.
    pub fn read_to_string(&self) -> Result<String> {
        match self {
            DataSource::File(path) => fs::read_to_string(path).map_err(|e| GlmError::io(path, e)),
            DataSource::Url(url) => fetch_text(url),
        }
    }
}

/// Download a text file.
pub fn fetch_text(url: &str) -> Result<String> {
    info!(url, "downloading dataset");
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?;
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(GlmError::DownloadFailed {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    Ok(response.text()?)
}

/// Load the Cleveland data with its fourteen named columns.
pub fn load_cleveland(source: &DataSource) -> Result<Dataset> {
    Dataset::from_headerless_csv(&source.read_to_string()?, &CLEVELAND_COLUMNS)
}

/// Paths of the datasets each validation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSources {
    /// Directory holding `heart.json` and `day.csv`.
    pub data_dir: PathBuf,
    /// Cleveland heart-disease data.
    pub cleveland: DataSource,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cleveland: DataSource::default(),
        }
    }
}

impl DataSources {
    /// Sources rooted at a data directory, Cleveland data downloaded.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Kaggle heart-failure records (`heart.json`).
    pub fn heart_json(&self) -> PathBuf {
        self.data_dir.join("heart.json")
    }

    /// UCI bike sharing daily counts (`day.csv`).
    pub fn bike_day_csv(&self) -> PathBuf {
        self.data_dir.join("day.csv")
    }
}
