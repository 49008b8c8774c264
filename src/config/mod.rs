use crate::workflows::placement::{InvalidWeights, Weights};
use std::env;
use std::fmt;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub weights: Weights,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut weights = Weights::default();
        weights.field = weight_from_env("PLACEMENT_W_FIELD", weights.field)?;
        weights.city = weight_from_env("PLACEMENT_W_CITY", weights.city)?;
        weights.special = weight_from_env("PLACEMENT_W_SPECIAL", weights.special)?;
        weights
            .validate()
            .map_err(|source| ConfigError::InvalidWeights { source })?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            weights,
        })
    }
}

fn weight_from_env(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidWeight { name }),
        Err(_) => Ok(default),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidWeight { name: &'static str },
    InvalidWeights { source: InvalidWeights },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWeight { name } => {
                write!(f, "{name} must be a floating point weight")
            }
            ConfigError::InvalidWeights { source } => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidWeight { .. } => None,
            ConfigError::InvalidWeights { source } => Some(source),
        }
    }
}
