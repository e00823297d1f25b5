//! Tracing initialization for the shell.
//!
//! Structured, async-aware logging via `tracing` + `tracing-subscriber`.
//! The level comes from configuration; `RUST_LOG` takes precedence when
//! set, so operators can raise verbosity for a single module without
//! touching the config file.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Output format for log lines.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-oriented multi-line format with colors.
    Pretty,
    /// Single-line format without decoration.
    Compact,
    /// JSON for log aggregation.
    Json,
}

/// Initialize tracing from loaded configuration (pretty format).
pub fn init_from_config(config: &Config) -> Result<(), String> {
    init(&config.application.log_level, OutputFormat::Pretty)
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup; a second call returns an error from the
/// subscriber registry.
pub fn init(level: &str, format: OutputFormat) -> Result<(), String> {
    let level = parse_log_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        OutputFormat::Pretty => builder.pretty().try_init(),
        OutputFormat::Compact => builder.compact().with_ansi(false).try_init(),
        OutputFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| format!("failed to initialize tracing: {e}"))
}

/// Parse a log level string into a tracing `Level`.
pub fn parse_log_level(level: &str) -> Result<Level, String> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(format!(
            "Invalid log level '{other}'. Must be one of: trace, debug, info, warn, error"
        )),
    }
}
