//! Control unit configuration loader with validation.
//!
//! One TOML file: `[shared]`, the tick period, and the `[control.*]`
//! parameter sections. Everything is validated here so the tick path never
//! re-checks bounds.

use std::path::Path;

use adas_common::config::{ConfigError, ConfigLoader, SharedConfig};
use adas_common::consts::{TICK_SECONDS, TICK_SECONDS_MAX, TICK_SECONDS_MIN};
use adas_common::drive::config::ControlParameters;
use serde::{Deserialize, Serialize};

fn default_tick_seconds() -> f64 {
    TICK_SECONDS
}

/// Complete control unit configuration.
///
/// # TOML Example
///
/// ```toml
/// tick_seconds = 0.05
///
/// [shared]
/// service_name = "adas-control-unit"
///
/// [control.pid]
/// kp = 1.2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlUnitConfig {
    pub shared: SharedConfig,
    /// Fixed control step [s].
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    #[serde(default)]
    pub control: ControlParameters,
}

impl Default for ControlUnitConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: Default::default(),
                service_name: "adas-control-unit".to_string(),
            },
            tick_seconds: TICK_SECONDS,
            control: ControlParameters::default(),
        }
    }
}

impl ControlUnitConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if !self.tick_seconds.is_finite()
            || self.tick_seconds < TICK_SECONDS_MIN
            || self.tick_seconds > TICK_SECONDS_MAX
        {
            return Err(ConfigError::ValidationError(format!(
                "tick_seconds {} out of range [{TICK_SECONDS_MIN}, {TICK_SECONDS_MAX}]",
                self.tick_seconds
            )));
        }

        self.control
            .validate()
            .map_err(ConfigError::ValidationError)
    }
}

/// Load and validate the configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ControlUnitConfig, ConfigError> {
    let config = ControlUnitConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<ControlUnitConfig, ConfigError> {
    let config = ControlUnitConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}
