use anyhow::{Context, Result};
use mylite_error::{ErrorCode, ErrorContext, MyliteError};
use serde::Deserialize;
use std::path::PathBuf;
use validator::Validate;

// Default constants
pub const DEFAULT_DATABASE_DIRECTORY: &str = "database";
pub const DEFAULT_DATABASE_FILE: &str = ".ht.sqlite";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 25;
pub const DEFAULT_MAX_DELAY_MS: u64 = 1000;

pub const DEFAULT_VERSION_STRING: &str = "5.5";

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_PREFIX: &str = "MYLITE";

#[derive(Debug, Deserialize, Default, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub database: DatabaseConfig,
    #[serde(default)]
    #[validate(nested)]
    pub installer: InstallerConfig,
    #[serde(default)]
    #[validate(nested)]
    pub functions: FunctionsConfig,
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,
}

/// Where the embedded database lives and how the connection is tuned.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_database_file")]
    #[validate(length(min = 1))]
    pub file: String,

    /// Full path; takes precedence over `directory` + `file` when set.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub in_memory: bool,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            directory: default_database_directory(),
            file: default_database_file(),
            path: None,
            in_memory: false,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Resolve the on-disk database file.
    pub fn resolve_path(&self) -> mylite_error::Result<PathBuf> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(invalid_path("database.path", "Database path is empty"));
            }
            return Ok(path.clone());
        }

        let file = self.file.trim();
        if file.is_empty() {
            return Err(invalid_path("database.file", "Database file name is empty"));
        }
        if file.ends_with('/') || file.ends_with('\\') {
            return Err(invalid_path(
                "database.file",
                format!("Database file name '{}' names a directory", file),
            ));
        }
        Ok(self.directory.join(file))
    }
}

fn invalid_path(field: &str, message: impl Into<String>) -> MyliteError {
    MyliteError::new(ErrorCode::InvalidDatabasePath, message).with_context(ErrorContext::Config {
        file_path: None,
        field: Some(field.to_string()),
    })
}

#[derive(Debug, Deserialize, Clone, Default, Validate)]
pub struct InstallerConfig {
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetrySettings,
}

/// Bounded retry for busy/locked contention at the commit boundary.
#[derive(Debug, Deserialize, Clone, Copy, Validate)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 100))]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct FunctionsConfig {
    /// Literal returned by `version()`.
    #[serde(default = "default_version_string")]
    #[validate(length(min = 1))]
    pub version_string: String,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            version_string: default_version_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    #[validate(length(min = 1))]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_database_directory() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_DIRECTORY)
}

fn default_database_file() -> String {
    DEFAULT_DATABASE_FILE.to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

fn default_version_string() -> String {
    DEFAULT_VERSION_STRING.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(config::File::with_name(path))
        } else {
            builder
        };

        // MYLITE__DATABASE__PATH maps to database.path, etc.
        let builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;

        let app_config: AppConfig = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {:?}", e))?;

        Ok(app_config)
    }

    /// Like [`AppConfig::from_file`], reporting failures as a coded error.
    pub fn load(path: &str) -> mylite_error::Result<Self> {
        Self::from_file(path).map_err(|e| {
            MyliteError::new(ErrorCode::InvalidConfig, format!("{:#}", e)).with_context(
                ErrorContext::Config {
                    file_path: Some(path.to_string()),
                    field: None,
                },
            )
        })
    }
}
