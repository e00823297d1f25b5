//! Custom error types for the adapter.
//!
//! This module defines the primary error type, `PulseError`, using the
//! `thiserror` crate. The variants fall into three families that callers
//! care about:
//!
//! - **Connection errors** (`Connection`, `NotConnected`, `Io`): the
//!   transport failed at startup or mid-operation. The driver marks its
//!   health `Faulted` when one of these surfaces.
//! - **Coercion errors** (`Coercion`, `TypeMismatch`): an instrument reply
//!   did not match the property's declared type, or a caller supplied a
//!   value of the wrong kind. No health change.
//! - **Validation errors** (`Validation`): a numeric value fell outside the
//!   property's declared bounds. Rejected before any command is sent.
//!
//! Configuration and lookup problems (`Config`, `Configuration`,
//! `UnknownProperty`, `UnknownMnemonic`) are startup-time errors: the
//! property set is fixed, so an unknown name is a caller bug, not a
//! runtime condition.
//!
//! Public driver methods return `anyhow::Result`, so `PulseError` values
//! travel through `?` and remain downcastable at the call site.

use thiserror::Error;

/// Convenience alias for results using the adapter error type.
pub type AppResult<T> = std::result::Result<T, PulseError>;

/// Unified error type for the pulse generator adapter.
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Transport not connected")]
    NotConnected,

    #[error("Cannot coerce reply '{reply}' into {expected}")]
    Coercion {
        /// Raw reply text as received from the instrument.
        reply: String,
        /// Human-readable name of the expected value kind.
        expected: &'static str,
    },

    #[error("Property '{property}' expects a {expected} value")]
    TypeMismatch {
        /// Logical property name.
        property: &'static str,
        /// Human-readable name of the expected value kind.
        expected: &'static str,
    },

    #[error("Value {value} for '{property}' out of range [{min}, {max}]")]
    Validation {
        /// Logical property name.
        property: &'static str,
        /// Rejected value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    #[error("Unknown property '{0}'")]
    UnknownProperty(String),

    #[error("Unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("Serial support not enabled. Rebuild with --features instrument_serial")]
    SerialFeatureDisabled,

    #[error("Failed to send value update (no subscribers)")]
    ParameterNoSubscribers,

    #[error("Invalid choice for parameter")]
    ParameterInvalidChoice,

    #[error("Value out of range for parameter")]
    ParameterOutOfRange,
}
