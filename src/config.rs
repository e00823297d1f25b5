//! Configuration loading (TOML file + environment overrides).
//!
//! Configuration is merged from two sources:
//! 1. a TOML file (default `config/pulse-daq.toml`; a missing file just
//!    yields the defaults)
//! 2. environment variables prefixed with `PULSE_DAQ_`, nested with `__`
//!    (e.g. `PULSE_DAQ_INSTRUMENT__PORT=/dev/ttyUSB1`)
//!
//! # Example
//! ```no_run
//! use pulse_daq::config::Config;
//!
//! # fn main() -> Result<(), figment::Error> {
//! let config = Config::load()?;
//! println!("Connecting to {}", config.instrument.port);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Instrument connection settings.
    #[serde(default)]
    pub instrument: InstrumentConfig,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name.
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Instrument connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Instrument identifier used in logs.
    #[serde(default = "default_id")]
    pub id: String,
    /// Connection target: serial device path. USB-GPIB adapters that
    /// expose the bus as a serial device use the same form.
    #[serde(default = "default_port")]
    pub port: String,
    /// Serial baud rate.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Reply timeout in milliseconds (owned by the transport).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Run against the built-in instrument simulator instead of hardware.
    #[serde(default)]
    pub mock: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            port: default_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            mock: false,
        }
    }
}

fn default_app_name() -> String {
    "pulse-daq".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_id() -> String {
    "hp8131a".to_string()
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_timeout_ms() -> u64 {
    2000
}

impl Config {
    /// Load configuration from the default path and environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from("config/pulse-daq.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PULSE_DAQ_").split("__"))
            .extract()
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.instrument.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }

        if !self.instrument.mock && self.instrument.port.is_empty() {
            return Err("instrument.port must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_file_yields_defaults() {
        let config = Config::load_from("/nonexistent/pulse-daq.toml").unwrap();
        assert_eq!(config.application.name, "pulse-daq");
        assert_eq!(config.instrument.port, "/dev/ttyUSB0");
        assert_eq!(config.instrument.baud_rate, 9600);
        assert!(!config.instrument.mock);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn loads_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulse-daq.toml");
        std::fs::write(
            &path,
            r#"
            [application]
            log_level = "debug"

            [instrument]
            id = "bench-pulsegen"
            port = "/dev/ttyUSB3"
            timeout_ms = 500
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.instrument.id, "bench-pulsegen");
        assert_eq!(config.instrument.port, "/dev/ttyUSB3");
        assert_eq!(config.instrument.timeout_ms, 500);
        // Unspecified fields fall back to defaults
        assert_eq!(config.instrument.baud_rate, 9600);
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulse-daq.toml");
        std::fs::write(&path, "[instrument]\nport = \"/dev/ttyUSB0\"\n").unwrap();

        std::env::set_var("PULSE_DAQ_INSTRUMENT__PORT", "/dev/ttyACM7");
        let config = Config::load_from(&path).unwrap();
        std::env::remove_var("PULSE_DAQ_INSTRUMENT__PORT");

        assert_eq!(config.instrument.port, "/dev/ttyACM7");
    }

    #[test]
    #[serial]
    fn validation_rejects_bad_values() {
        let mut config = Config::load_from("/nonexistent/pulse-daq.toml").unwrap();

        config.application.log_level = "loud".to_string();
        assert!(config.validate().is_err());
        config.application.log_level = "info".to_string();

        config.instrument.timeout_ms = 0;
        assert!(config.validate().is_err());
        config.instrument.timeout_ms = 2000;

        config.instrument.port = String::new();
        assert!(config.validate().is_err());

        // An empty port is fine in mock mode
        config.instrument.mock = true;
        assert!(config.validate().is_ok());
    }
}
