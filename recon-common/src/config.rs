//! Configuration loading
//!
//! Every tool reads an optional TOML bootstrap file. Resolution order for
//! each setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (handled by clap's `env` attribute)
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Logging configuration (`[logging]` table)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `<config_dir>/recon/<tool>.toml`
pub fn default_config_path(tool: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("recon").join(format!("{}.toml", tool)))
}

/// Where a loaded config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at the default location
    Defaults,
}

impl ConfigSource {
    /// Report the source; call once tracing is initialized
    pub fn log(&self, tool: &str) {
        match self {
            ConfigSource::File(path) => tracing::info!(path = %path.display(), "Loaded config file"),
            ConfigSource::Defaults => tracing::warn!("No config file found for {}, using defaults", tool),
        }
    }
}

/// Load a tool's TOML config
///
/// An explicit path must exist and parse. Without one, the default location
/// is tried; a missing default file yields `T::default()`.
pub fn load_toml_config<T: DeserializeOwned + Default>(
    explicit: Option<&Path>,
    tool: &str,
) -> Result<(T, ConfigSource)> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!("config file not found: {}", path.display())));
            }
            path.to_path_buf()
        }
        None => match default_config_path(tool).filter(|p| p.exists()) {
            Some(path) => path,
            None => return Ok((T::default(), ConfigSource::Defaults)),
        },
    };

    let config = parse_toml_file(&path)?;
    Ok((config, ConfigSource::File(path)))
}

fn parse_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// First present value, in priority order, else the compiled default
pub fn resolve<T>(cli_or_env: Option<T>, toml: Option<T>, default: impl FnOnce() -> T) -> T {
    cli_or_env.or(toml).unwrap_or_else(default)
}

/// A setting with no default
pub fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::Config(format!("missing required setting '{}'", name)))
}

/// Strip whitespace and surrounding quotes from a pasted path
pub fn sanitize_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches(|c| c == '"' || c == '\'').trim())
}

/// clap value parser built on [`sanitize_path`]
pub fn parse_path(raw: &str) -> std::result::Result<PathBuf, String> {
    let path = sanitize_path(raw);
    if path.as_os_str().is_empty() {
        return Err("path must not be empty".to_string());
    }
    Ok(path)
}
