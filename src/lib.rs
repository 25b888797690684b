//! Query helpers over job-listing CSV exports.
//!
//! Records are loaded once per path through a memoizing [`insights::JobLoader`]
//! and then filtered by industry, job type or salary range.

pub mod config;
pub mod error;
pub mod insights;
pub mod telemetry;

pub use error::{AppError, InsightsError, InvalidSalaryInput, Result};

use config::AppConfig;
use insights::{CsvFileSource, JobLoader};
use tracing::info;

/// Configuration plus a loader built from it.
pub struct Bootstrap {
    pub config: AppConfig,
    pub loader: JobLoader,
}

/// Loads [`AppConfig`] from the environment, installs tracing and builds a CSV loader.
pub fn bootstrap() -> std::result::Result<Bootstrap, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let loader = JobLoader::from_config(&config.data, CsvFileSource);
    info!(
        ?config.environment,
        data_path = %config.data.path.display(),
        cache_enabled = config.data.cache_enabled,
        "job insights ready"
    );

    Ok(Bootstrap { config, loader })
}

impl Bootstrap {
    /// Records from the configured default data path.
    pub fn jobs(&self) -> Result<Option<std::sync::Arc<Vec<insights::Record>>>> {
        self.loader.read(&self.config.data.path)
    }
}
