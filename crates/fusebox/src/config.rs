//! Configuration file parsing and structures.
//!
//! fusebox uses TOML for declarative configuration. Every section is optional:
//! - `[logging]`: default level and per-target overrides
//! - `[power]`: the house power budget and the cost of switching a light on
//! - `[api]`: the HTTP API, disabled when the section is absent
//! - `[fixtures.<light_id>]`: the physical fixtures the scene actuator drives

use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;

/// Top-level configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub power: PowerConfig,

    #[serde(default)]
    pub api: Option<ApiConfig>,

    /// Key = light id, Value = the fixture that light id resolves to
    #[serde(default)]
    pub fixtures: HashMap<String, FixtureConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,

    /// Per-target levels, e.g. `"fusebox::engine" = "debug"`
    #[serde(default)]
    pub overrides: HashMap<String, LogLevel>,
}

/// House power budget.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Initial and maximum power
    pub start: f64,

    /// Minimum power. At this level no light can be switched on.
    pub floor: f64,

    /// Fixed debit for every light switched on
    pub cost_per_toggle: f64,

    /// Optional ambient drain applied on a timer
    pub drain: Option<DrainConfig>,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            start: 100.0,
            floor: 0.0,
            cost_per_toggle: 10.0,
            drain: None,
        }
    }
}

/// Ambient drain: `amount` is consumed every `interval_ms` for as long as any
/// power remains.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DrainConfig {
    pub interval_ms: u64,
    pub amount: f64,
}

/// Native HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8565
}

/// A physical light fixture and the light-emitting elements inside it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixtureConfig {
    #[serde(default = "default_emitters")]
    pub emitters: Vec<String>,
}

fn default_emitters() -> Vec<String> {
    vec!["lamp".to_string()]
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        contents.parse()
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let power = &self.power;

        if !power.start.is_finite() {
            return Err(ConfigError::invalid("power.start", "must be a finite number"));
        }
        if !power.floor.is_finite() {
            return Err(ConfigError::invalid("power.floor", "must be a finite number"));
        }
        if power.floor > power.start {
            return Err(ConfigError::invalid(
                "power.floor",
                format!("{} exceeds power.start ({})", power.floor, power.start),
            ));
        }
        if !power.cost_per_toggle.is_finite() || power.cost_per_toggle < 0.0 {
            return Err(ConfigError::invalid(
                "power.cost_per_toggle",
                "must be a finite, non-negative number",
            ));
        }

        if let Some(drain) = &power.drain {
            if drain.interval_ms == 0 {
                return Err(ConfigError::invalid("power.drain.interval_ms", "must be greater than 0"));
            }
            if !drain.amount.is_finite() || drain.amount < 0.0 {
                return Err(ConfigError::invalid(
                    "power.drain.amount",
                    "must be a finite, non-negative number",
                ));
            }
        }

        for (light_id, fixture) in &self.fixtures {
            if fixture.emitters.is_empty() {
                return Err(ConfigError::invalid(
                    format!("fixtures.{}.emitters", light_id),
                    "must name at least one emitter",
                ));
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}
