//! Errors surfaced by the `glmx` commands.

use std::path::PathBuf;
use thiserror::Error;

/// Anything that makes a command exit with status 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Terrain(#[from] glmx_terrain::TerrainError),

    #[error(transparent)]
    Pages(#[from] glmx_pages::PagesError),

    #[error(transparent)]
    Glm(#[from] glmx_glm::GlmError),

    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for [`Config`](crate::Config).
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A config value is outside its valid range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Writing the report failed.
    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `--strict` validation found mismatching coefficients.
    #[error("{0} validation check(s) did not match")]
    ValidationFailed(usize),
}
