//! # glmx-runner
//!
//! Command handlers, configuration and logging setup behind the `glmx`
//! binary. Each handler runs one authoring tool to completion and prints
//! its report to the writer it is given.

pub mod commands;
pub mod config;
mod error;
pub mod report;

pub use commands::ValidateTarget;
pub use config::{Config, SiteConfig, TerrainConfig, DEFAULT_CONFIG_FILE};
pub use error::CliError;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str =
    "warn,glmx=info,glmx_runner=info,glmx_terrain=info,glmx_pages=info,glmx_glm=info";

/// Install the fmt subscriber, filtered by `RUST_LOG` or [`DEFAULT_LOG_FILTER`].
///
/// Logs go to stderr so that reports on stdout stay clean.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
