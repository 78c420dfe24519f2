//! TOML configuration loading shared by the ADAS binaries.
//!
//! A configuration file always carries a `[shared]` table; everything else
//! belongs to the application struct that embeds [`SharedConfig`]. Any
//! `DeserializeOwned` type gets [`ConfigLoader`] for free.
//!
//! ```rust,no_run
//! use adas_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct BenchRig {
//!     shared: SharedConfig,
//!     lanes: u8,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let rig = BenchRig::load(Path::new("rig.toml"))?;
//!     rig.shared.validate()?;
//!     println!("{} with {} lanes", rig.shared.service_name, rig.lanes);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted `service_name`; it ends up in every log line.
pub const SERVICE_NAME_MAX_LEN: usize = 64;

/// Configuration loading error.
///
/// Parameters are range-checked once here so the control core never
/// re-checks them per tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Unreadable file or malformed TOML (including unknown keys).
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// Well-formed but out of range.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Default log verbosity, lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-tick command traces.
    Trace,
    /// Source changes, PID diagnostics, obstacle warnings.
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The `[shared]` table.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "adas-bench-02"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    #[serde(default)]
    pub log_level: LogLevel,
    /// Instance name used in logs and status payloads.
    pub service_name: String,
}

impl SharedConfig {
    /// Reject empty, oversized or whitespace-padded service names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.service_name;
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        if name.len() > SERVICE_NAME_MAX_LEN {
            return Err(ConfigError::ValidationError(format!(
                "service_name longer than {SERVICE_NAME_MAX_LEN} bytes"
            )));
        }
        if name.trim() != name {
            return Err(ConfigError::ValidationError(format!(
                "service_name '{name}' has leading or trailing whitespace"
            )));
        }
        Ok(())
    }
}

/// Load a configuration struct from TOML.
///
/// `load` maps a missing file to [`ConfigError::FileNotFound`]; every other
/// read or syntax failure is a [`ConfigError::ParseError`].
pub trait ConfigLoader: Sized + DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::ParseError(format!("{}: {e}", path.display())),
        })?;
        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: DeserializeOwned> ConfigLoader for T {}
