//! Configuration loading and database path resolution
//!
//! Bootstrap settings come from an optional TOML file. A missing file is not
//! an error: defaults are used and a warning is logged.
//!
//! Database path priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `SHELF_DATABASE`
//! 3. TOML `database_path`
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "SHELF_CONFIG";

/// Environment variable naming the SQLite database file
pub const DATABASE_ENV_VAR: &str = "SHELF_DATABASE";

/// Default HTTP port for shelf-api
pub const DEFAULT_PORT: u16 = 5780;

/// Default report folder, relative to the working directory
pub const DEFAULT_REPORTS_DIR: &str = "reports_png";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reporting job configuration (optional)
    #[serde(default)]
    pub reports: ReportsConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            port: default_port(),
            bind_address: default_bind_address(),
            logging: LoggingConfig::default(),
            reports: ReportsConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Reporting job configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportsConfig {
    /// Folder receiving the chart images
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// Lookup order is the CLI path, then `SHELF_CONFIG`, then the platform
    /// config directory. A missing file is not an error; a file that exists
    /// but does not parse is. Runs before logging is set up, so the caller
    /// logs the returned [`ConfigSource`] once the subscriber is installed.
    pub fn load(cli_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let explicit = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));
        let named = explicit.is_some();

        let Some(path) = explicit.or_else(default_config_file) else {
            return Ok((Self::default(), ConfigSource::Defaults));
        };

        if !path.exists() {
            let source = if named {
                ConfigSource::Missing(path)
            } else {
                ConfigSource::Defaults
            };
            return Ok((Self::default(), source));
        }

        let config = Self::from_file(&path)?;
        Ok((config, ConfigSource::File(path)))
    }

    /// Resolve the database file: CLI → env → TOML → OS default
    pub fn resolve_database_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.database_path {
            return path.clone();
        }

        default_database_path()
    }

    /// Resolve the report folder: CLI → TOML → `./reports_png`
    pub fn resolve_reports_dir(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        if let Some(path) = &self.reports.output_dir {
            return path.clone();
        }

        std::env::current_dir()
            .map(|cwd| cwd.join(DEFAULT_REPORTS_DIR))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPORTS_DIR))
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// A file was named but does not exist; defaults are in use
    Missing(PathBuf),
    /// Nothing named and nothing at the default location
    Defaults,
}

impl ConfigSource {
    /// Report the source at info, or warn when falling back to defaults
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => {
                info!("Loaded configuration from {}", path.display())
            }
            ConfigSource::Missing(path) => warn!(
                "Configuration file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigSource::Defaults => {
                warn!("No configuration file found, using built-in defaults")
            }
        }
    }
}

/// Default configuration file path for the platform
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shelf").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("shelf"))
        .unwrap_or_else(|| PathBuf::from("./shelf_data"))
        .join("shelf.db")
}
