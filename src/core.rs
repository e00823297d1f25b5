//! Core abstractions shared by the adapter and its host-facing surface.
//!
//! Defines the coarse [`HealthState`] reported to operators, the
//! [`Instrument`] lifecycle trait, and [`ParameterBase`] for dynamic
//! (JSON-typed) access to a heterogeneous parameter collection.
//!
//! Instruments implement `Instrument` directly and are driven by a host
//! shell (CLI, service) that owns them exclusively. Every operation takes
//! `&mut self`, so exactly one command/reply exchange is in flight at a
//! time; callers that need concurrent access must serialize above this
//! layer.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Coarse connectivity/self-test status exposed to operators.
///
/// Transitions:
/// - `Uninitialized` → `Connected` on a successful connection attempt
/// - `Uninitialized` → `Faulted` on a failed connection attempt
/// - `Connected` → `Faulted` when a self-test fails or the transport errors
/// - `Faulted` → `Connected` when a self-test succeeds
///
/// There is no automatic recovery loop; state changes only on explicit
/// calls into the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    /// Not yet connected, or shut down.
    Uninitialized,
    /// Connection established and last self-test (if any) passed.
    Connected,
    /// Connection attempt or self-test failed.
    Faulted,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthState::Uninitialized => "UNINITIALIZED",
            HealthState::Connected => "CONNECTED",
            HealthState::Faulted => "FAULTED",
        };
        f.write_str(label)
    }
}

/// Base trait for all parameters (enables heterogeneous collections).
///
/// Concrete parameters use `Parameter<T>` (see `parameter` module). The
/// JSON projection is what remote hosts and generic UIs consume; typed
/// access stays inside the driver.
pub trait ParameterBase: Send + Sync {
    /// Parameter name.
    fn name(&self) -> &str;

    /// Human-readable description (display label).
    fn description(&self) -> Option<&str>;

    /// Unit of measurement, if any.
    fn unit(&self) -> Option<&str>;

    /// Get current value as JSON.
    fn value_json(&self) -> serde_json::Value;

    /// Set value from JSON, enforcing the declared constraints.
    fn set_json(&mut self, value: serde_json::Value) -> Result<()>;

    /// Refresh the cached value from a hardware read-back.
    ///
    /// Skips constraint validation: the instrument's own value is taken as
    /// authoritative even when quantization puts it at a bound edge.
    fn update_json(&mut self, value: serde_json::Value) -> Result<()>;

    /// Get parameter constraints as JSON.
    fn constraints_json(&self) -> serde_json::Value;
}

/// Base trait for all instruments.
///
/// The host shell calls `initialize` once at startup and `shutdown` once on
/// exit; `shutdown` must release the underlying connection on every exit
/// path, including after a failed `initialize`.
#[async_trait]
pub trait Instrument: Send + Sync {
    /// Unique instrument identifier.
    fn id(&self) -> &str;

    /// Current health state.
    fn health(&self) -> HealthState;

    /// Establish the hardware connection and verify communication.
    async fn initialize(&mut self) -> Result<()>;

    /// Release the hardware connection.
    async fn shutdown(&mut self) -> Result<()>;

    /// Access instrument parameters for introspection and dynamic access.
    fn parameters(&self) -> &HashMap<String, Box<dyn ParameterBase>>;

    /// Mutable access to parameters (for setting).
    fn parameters_mut(&mut self) -> &mut HashMap<String, Box<dyn ParameterBase>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_state_display() {
        assert_eq!(HealthState::Uninitialized.to_string(), "UNINITIALIZED");
        assert_eq!(HealthState::Connected.to_string(), "CONNECTED");
        assert_eq!(HealthState::Faulted.to_string(), "FAULTED");
    }

    #[test]
    fn health_state_round_trips_through_serde() {
        let json = serde_json::to_string(&HealthState::Faulted).unwrap();
        let back: HealthState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HealthState::Faulted);
    }
}
