//! Bootstrap configuration
//!
//! Settings are resolved in this priority order:
//! 1. Command-line arguments
//! 2. Environment variables (both collected by the binary into [`ConfigOverrides`])
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing default TOML file is not an error: the service starts with
//! defaults. An explicitly requested file must exist.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::credentials::PasswordMode;
use crate::{Error, Result};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "songhive.toml";

/// Complete bootstrap configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub seed: SeedConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Which document store adapter to run against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    /// Process-local, lost on exit
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::Mongodb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(Error::Config(format!("Unknown store backend '{}'", other))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Mongodb => f.write_str("mongodb"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb_uri: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: "SongHive".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
    /// JSON snapshot used to fill empty collections at startup
    pub file: PathBuf,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: PathBuf::from("db.json"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub password_mode: PasswordMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API; empty allows any origin
    pub allowed_origins: Vec<String>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub store: Option<StoreBackend>,
    pub mongodb_uri: Option<String>,
    pub database: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub no_seed: bool,
    pub password_mode: Option<PasswordMode>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&content)
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    return Self::load(Some(default_path));
                }
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line and environment overrides on top of the file values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(store) = overrides.store {
            self.store.backend = store;
        }
        if let Some(uri) = overrides.mongodb_uri {
            self.store.mongodb_uri = uri;
        }
        if let Some(database) = overrides.database {
            self.store.database = database;
        }
        if let Some(file) = overrides.seed_file {
            self.seed.file = file;
        }
        if overrides.no_seed {
            self.seed.enabled = false;
        }
        if let Some(mode) = overrides.password_mode {
            self.auth.password_mode = mode;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }
}
