use std::path::{Path, PathBuf};

use geomcp_common::config::ServerConfig;
use geomcp_common::GeoMcpError;

use super::validation;

/// Environment variable holding the mapping-provider API key (required).
pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";
/// Environment variable overriding the listen port.
pub const PORT_VAR: &str = "PORT";
/// Environment variable pointing at an optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "GEOMCP_CONFIG";

/// Load configuration from the process environment.
///
/// Fails loudly with clear error messages if anything is misconfigured.
/// The server refuses to start on any error returned here.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Load configuration using `lookup` as the environment.
///
/// Order: defaults, then the TOML file named by `GEOMCP_CONFIG` (if set),
/// then `GOOGLE_MAPS_API_KEY` and `PORT`.
pub fn load_config_from<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()) {
        Some(path) => load_file(Path::new(path.trim()))?,
        None => ServerConfig::default(),
    };

    if let Some(key) = lookup(API_KEY_VAR) {
        config.provider.api_key = key;
    }

    // A key from either source is only usable once surrounding whitespace is gone.
    config.provider.api_key = config.provider.api_key.trim().to_string();
    if config.provider.api_key.is_empty() {
        return Err(ConfigError::MissingApiKey);
    }

    if let Some(raw) = lookup(PORT_VAR) {
        config.transport.port = parse_port(&raw)?;
    }

    validation::validate(&config)?;

    tracing::info!(
        port = config.transport.port,
        endpoint = %config.transport.endpoint_path,
        provider_timeout_s = config.provider.timeout_seconds,
        "Configuration loaded successfully"
    );

    Ok(config)
}

fn load_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    tracing::info!(path = %path.display(), "Loading configuration file");

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("GOOGLE_MAPS_API_KEY is not set")]
    MissingApiKey,

    #[error("PORT must be a positive integer below 65536, got '{0}'")]
    InvalidPort(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<ConfigError> for GeoMcpError {
    fn from(e: ConfigError) -> Self {
        GeoMcpError::Config(e.to_string())
    }
}
