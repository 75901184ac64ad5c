use crate::services::rpc::LSIF_SCHEME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// URI scheme the host reserves for the index filesystem
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Report any failed `statFile` round trip as "file not found" instead of
    /// a transport error. Only for hosts that depend on that behavior.
    #[serde(default = "default_false")]
    pub stat_errors_as_not_found: bool,

    /// Default log filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_scheme() -> String {
    LSIF_SCHEME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Index server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `host:port` of the index server
    #[serde(default = "default_address")]
    pub address: String,

    /// Send LSP `initialize`/`initialized` before any other request
    #[serde(default = "default_true")]
    pub handshake: bool,

    /// Client name reported during the handshake
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

fn default_address() -> String {
    "127.0.0.1:5007".to_string()
}

fn default_client_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            handshake: true,
            client_name: default_client_name(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            scheme: default_scheme(),
            stat_errors_as_not_found: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Default location of the config file (`<config dir>/lsif-fs/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lsif-fs").join("config.json"))
    }

    /// Load the config file at `path`, or at the default location, falling
    /// back to defaults when no file exists there.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.address cannot be empty".to_string(),
            ));
        }

        if !self.server.address.contains(':') {
            return Err(ConfigError::ValidationError(format!(
                "server.address '{}' must be host:port",
                self.server.address
            )));
        }

        let scheme_ok = self
            .scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && self
                .scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(ConfigError::ValidationError(format!(
                "'{}' is not a valid URI scheme",
                self.scheme
            )));
        }

        if self.scheme.eq_ignore_ascii_case("file") {
            return Err(ConfigError::ValidationError(
                "scheme must differ from the local disk scheme 'file'".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
