use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_DATA_PATH: &str = "data/jobs.csv";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the library.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub data: DataConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let path = env::var("JOB_INSIGHTS_DATA_PATH")
            .unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
        if path.trim().is_empty() {
            return Err(ConfigError::EmptyDataPath);
        }

        let cache_enabled = match env::var("JOB_INSIGHTS_CACHE") {
            Ok(raw) => parse_cache_flag(&raw)?,
            Err(_) => true,
        };

        let log_level =
            env::var("JOB_INSIGHTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            data: DataConfig {
                path: PathBuf::from(path),
                cache_enabled,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_cache_flag(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidCacheFlag {
            value: raw.to_string(),
        }),
    }
}

/// Where job listings are read from and whether parsed reads are memoized.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub path: PathBuf,
    pub cache_enabled: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            cache_enabled: true,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyDataPath,
    InvalidCacheFlag { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyDataPath => write!(f, "JOB_INSIGHTS_DATA_PATH must not be empty"),
            ConfigError::InvalidCacheFlag { value } => {
                write!(f, "JOB_INSIGHTS_CACHE must be `on` or `off`, got '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
