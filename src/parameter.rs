//! Parameter<T> - typed property metadata with change notification.
//!
//! Each instrument property is declared once as a `Parameter<T>` carrying
//! its display label, unit, and validation constraints. The current value
//! is observable through a `tokio::sync::watch` channel so host frontends
//! can refresh displays without polling the hardware.
//!
//! Unlike a full logged-quantity system, parameters here do not perform
//! hardware I/O themselves: the driver owns the transport and dispatches
//! reads/writes explicitly, then refreshes the cached value via
//! [`Parameter::update`].
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_daq::parameter::ParameterBuilder;
//!
//! let mut period = ParameterBuilder::new("period", 2e-9)
//!     .description("period")
//!     .unit("s")
//!     .range(2e-9, 99.9e-3)
//!     .build();
//!
//! period.set(1e-6)?;          // validates against the declared range
//! let mut rx = period.subscribe();
//! assert_eq!(*rx.borrow(), 1e-6);
//! ```

use std::fmt::Debug;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::core::ParameterBase;
use crate::error::PulseError;

// =============================================================================
// Constraints
// =============================================================================

/// Parameter constraints for validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Constraints<T> {
    /// No constraints.
    None,

    /// Numeric range (min, max), inclusive on both ends.
    Range {
        /// Lower bound.
        min: T,
        /// Upper bound.
        max: T,
    },

    /// Allowed discrete values.
    Choices(Vec<T>),
}

impl<T: PartialOrd + PartialEq> Constraints<T> {
    /// Validate a value against the constraints.
    pub fn validate(&self, value: &T) -> Result<(), PulseError> {
        match self {
            Constraints::None => Ok(()),

            Constraints::Range { min, max } => {
                if value < min || value > max {
                    Err(PulseError::ParameterOutOfRange)
                } else {
                    Ok(())
                }
            }

            Constraints::Choices(choices) => {
                if choices.iter().any(|c| c == value) {
                    Ok(())
                } else {
                    Err(PulseError::ParameterInvalidChoice)
                }
            }
        }
    }
}

impl<T> Default for Constraints<T> {
    fn default() -> Self {
        Constraints::None
    }
}

// =============================================================================
// Parameter<T>
// =============================================================================

/// Typed parameter with validation and change notification.
///
/// # Type Requirements
///
/// - `Clone`: for distributing values to subscribers
/// - `Send + Sync`: for thread-safe access
/// - `PartialEq + PartialOrd`: for choice and range validation
/// - `Debug`: for logging and error messages
pub struct Parameter<T>
where
    T: Clone + Send + Sync + PartialEq + PartialOrd + Debug,
{
    /// Parameter name (unique identifier).
    name: String,

    /// Display label / tooltip text.
    description: Option<String>,

    /// Unit of measurement (e.g. "s", "V").
    unit: Option<String>,

    /// Current value (observable via watch channel).
    value_rx: watch::Receiver<T>,
    value_tx: watch::Sender<T>,

    /// Validation constraints.
    constraints: Constraints<T>,
}

impl<T> Parameter<T>
where
    T: Clone + Send + Sync + PartialEq + PartialOrd + Debug + 'static,
{
    /// Create a new parameter with an initial value.
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        let (value_tx, value_rx) = watch::channel(initial);

        Self {
            name: name.into(),
            description: None,
            unit: None,
            value_rx,
            value_tx,
            constraints: Constraints::None,
        }
    }

    /// Set the parameter description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the parameter unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set numeric range constraints.
    pub fn with_range(mut self, min: T, max: T) -> Self {
        self.constraints = Constraints::Range { min, max };
        self
    }

    /// Set discrete choice constraints.
    pub fn with_choices(mut self, choices: Vec<T>) -> Self {
        self.constraints = Constraints::Choices(choices);
        self
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value_rx.borrow().clone()
    }

    /// Set the value, validating against the declared constraints.
    ///
    /// Subscribers are notified via the watch channel on success.
    pub fn set(&mut self, value: T) -> Result<()> {
        self.constraints.validate(&value)?;

        self.value_tx
            .send(value)
            .map_err(|_| PulseError::ParameterNoSubscribers)?;

        Ok(())
    }

    /// Refresh the cached value from a hardware read-back.
    ///
    /// Does NOT validate: the instrument's own value is authoritative.
    pub fn update(&mut self, value: T) -> Result<()> {
        self.value_tx
            .send(value)
            .map_err(|_| PulseError::ParameterNoSubscribers)?;

        Ok(())
    }

    /// Subscribe to value changes (for display widgets).
    ///
    /// Returns a watch receiver that notifies whenever the value changes.
    /// Multiple subscribers can observe independently.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value_rx.clone()
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parameter unit.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Declared constraints.
    pub fn constraints(&self) -> &Constraints<T> {
        &self.constraints
    }
}

// =============================================================================
// ParameterBase Implementation (for dynamic collections)
// =============================================================================

impl<T> ParameterBase for Parameter<T>
where
    T: Clone
        + Send
        + Sync
        + PartialEq
        + PartialOrd
        + Debug
        + Serialize
        + for<'de> Deserialize<'de>
        + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    fn value_json(&self) -> serde_json::Value {
        serde_json::to_value(self.get()).unwrap_or(serde_json::Value::Null)
    }

    fn set_json(&mut self, value: serde_json::Value) -> Result<()> {
        let typed_value: T = serde_json::from_value(value)?;
        self.set(typed_value)
    }

    fn update_json(&mut self, value: serde_json::Value) -> Result<()> {
        let typed_value: T = serde_json::from_value(value)?;
        self.update(typed_value)
    }

    fn constraints_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.constraints).unwrap_or(serde_json::Value::Null)
    }
}

// =============================================================================
// Parameter Builder (Fluent API)
// =============================================================================

/// Builder for creating parameters with a fluent API.
pub struct ParameterBuilder<T>
where
    T: Clone + Send + Sync + PartialEq + PartialOrd + Debug,
{
    name: String,
    initial: T,
    description: Option<String>,
    unit: Option<String>,
    constraints: Constraints<T>,
}

impl<T> ParameterBuilder<T>
where
    T: Clone + Send + Sync + PartialEq + PartialOrd + Debug + 'static,
{
    /// Start building a parameter with a name and initial value.
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        Self {
            name: name.into(),
            initial,
            description: None,
            unit: None,
            constraints: Constraints::None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the unit.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set numeric range constraints.
    pub fn range(mut self, min: T, max: T) -> Self {
        self.constraints = Constraints::Range { min, max };
        self
    }

    /// Set discrete choice constraints.
    pub fn choices(mut self, choices: Vec<T>) -> Self {
        self.constraints = Constraints::Choices(choices);
        self
    }

    /// Build the parameter.
    pub fn build(self) -> Parameter<T> {
        let param = Parameter::new(self.name, self.initial);

        let mut param = match self.description {
            Some(desc) => param.with_description(desc),
            None => param,
        };

        param = match self.unit {
            Some(unit) => param.with_unit(unit),
            None => param,
        };

        param.constraints = self.constraints;

        param
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_basic() {
        let mut param = Parameter::new("test", 42.0);
        assert_eq!(param.get(), 42.0);

        param.set(100.0).unwrap();
        assert_eq!(param.get(), 100.0);
    }

    #[test]
    fn parameter_range_validation() {
        let mut param = Parameter::new("test", 50.0).with_range(0.0, 100.0);

        assert!(param.set(50.0).is_ok());
        assert!(param.set(150.0).is_err()); // Out of range
        assert!(param.set(-10.0).is_err()); // Out of range
    }

    #[test]
    fn parameter_choices() {
        let mut param = Parameter::new("mode", "AUTO".to_string())
            .with_choices(vec!["AUTO".to_string(), "BURST".to_string()]);

        assert!(param.set("BURST".to_string()).is_ok());
        assert!(param.set("INVALID".to_string()).is_err());
    }

    #[test]
    fn parameter_update_skips_validation() {
        let mut param = Parameter::new("level", 0.0).with_range(-5.0, 5.0);

        // A hardware read-back just outside the declared bounds must not
        // be rejected: the instrument value is authoritative.
        param.update(5.1).unwrap();
        assert_eq!(param.get(), 5.1);

        assert!(param.set(5.1).is_err());
    }

    #[tokio::test]
    async fn parameter_subscription() {
        let mut param = Parameter::new("test", 0.0);
        let mut rx = param.subscribe();

        assert_eq!(*rx.borrow(), 0.0);

        param.set(42.0).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 42.0);
    }

    #[test]
    fn parameter_builder() {
        let param = ParameterBuilder::new("period", 2e-9)
            .description("pulse repetition period")
            .unit("s")
            .range(2e-9, 99.9e-3)
            .build();

        assert_eq!(param.name(), "period");
        assert_eq!(param.description(), Some("pulse repetition period"));
        assert_eq!(param.unit(), Some("s"));
        assert_eq!(param.get(), 2e-9);
    }

    #[test]
    fn parameter_base_json_access() {
        let mut param = ParameterBuilder::new("level", 0.0).range(-5.0, 5.0).build();
        let base: &mut dyn ParameterBase = &mut param;

        base.set_json(serde_json::json!(2.5)).unwrap();
        assert_eq!(base.value_json(), serde_json::json!(2.5));

        assert!(base.set_json(serde_json::json!(7.0)).is_err());
        // Hardware refresh path bypasses validation
        base.update_json(serde_json::json!(7.0)).unwrap();
        assert_eq!(base.value_json(), serde_json::json!(7.0));
    }
}
