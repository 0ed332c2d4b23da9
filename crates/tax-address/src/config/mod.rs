use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::limits::{Scope, ScopeType};

/// Top-level configuration for the normalizer tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data: DataConfig,
    pub scope: Scope,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let limits_path = optional_var("ADDRESS_LIMITS_PATH").map(PathBuf::from);
        let directory_path = optional_var("ADDRESS_DIRECTORY_PATH").map(PathBuf::from);

        let scope_code = optional_var("ADDRESS_SCOPE_CODE");
        let scope_type = match optional_var("ADDRESS_SCOPE_TYPE") {
            Some(raw) => ScopeType::parse(&raw).ok_or(ConfigError::InvalidScopeType(raw))?,
            None => ScopeType::default(),
        };

        let log_level = env::var("ADDRESS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data: DataConfig {
                limits_path,
                directory_path,
            },
            scope: Scope::new(scope_code, scope_type),
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Locations of the field limits table and the country directory.
#[derive(Debug, Clone, Default)]
pub struct DataConfig {
    pub limits_path: Option<PathBuf>,
    pub directory_path: Option<PathBuf>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidScopeType(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidScopeType(value) => write!(
                f,
                "ADDRESS_SCOPE_TYPE must be one of default, website or store (found '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
