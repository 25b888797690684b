use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use std::fmt;
use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = InsightsError> = std::result::Result<T, E>;

/// Failures surfaced by the loader and the query helpers.
#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    #[error("failed to read job data from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("record has no `{field}` field")]
    MissingField { field: String },
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidSalaryInput),
    #[error("no valid numeric `{field}` values to aggregate")]
    EmptyAggregation { field: &'static str },
    #[error("`{field}` value {value:?} does not fit in 128 bits")]
    SalaryOverflow { field: &'static str, value: String },
}

/// Reasons a single record (or the queried salary) cannot be matched against a range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSalaryInput {
    #[error("record is missing `{field}`")]
    MissingBound { field: &'static str },
    #[error("`{field}` is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
    #[error("no salary was provided")]
    MissingSalary,
    #[error("min_salary {min} is greater than max_salary {max}")]
    InvertedRange { min: i64, max: i64 },
}

impl InsightsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Startup failures from [`crate::bootstrap`].
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}
