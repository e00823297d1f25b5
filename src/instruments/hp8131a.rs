//! HP 8131A 500 MHz pulse generator driver.
//!
//! Exposes the instrument's timing, level, and trigger registers as typed
//! read/write properties over the line-oriented command set, plus raw
//! passthrough commands, a manual trigger, and a self-test that feeds the
//! health state.
//!
//! ## Configuration
//!
//! ```toml
//! [instrument]
//! id = "pulsegen"
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//! timeout_ms = 2000
//! ```
//!
//! ## Protocol
//!
//! Line-oriented text, newline-terminated in both directions:
//! - Query: mnemonic + `?` (e.g. `:PULS1:TIM:WIDT?`), one reply line.
//! - Write: mnemonic, a space, the rendered value (e.g.
//!   `:PULS1:TIM:WIDT 5E-7`), no reply.
//! - Common commands: `*IDN?`, `*TST?`, `*TRG`.
//!
//! Every operation is a single blocking exchange; there is no retry, no
//! caching beyond the display-value refresh, and no background polling.
//! A transport failure on any exchange marks the health `Faulted`;
//! coercion failures leave health untouched.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::commands::{PropertyKind, PulseProperty, TriggerMode, TriggerSlope};
use crate::core::{HealthState, Instrument, ParameterBase};
use crate::error::PulseError;
use crate::parameter::ParameterBuilder;
use crate::transport::Transport;
use crate::value::{coerce_reply, PropertyValue};

/// HP 8131A pulse generator behind a [`Transport`].
pub struct Hp8131a {
    /// Instrument identifier.
    id: String,

    /// Current health state.
    health: HealthState,

    /// Connection to the physical device; `None` when the shell could not
    /// open one, or after shutdown.
    transport: Option<Box<dyn Transport>>,

    /// Identity string (*IDN? response), cached at initialization.
    identity: Option<String>,

    /// Host-facing property surface with cached display values.
    parameters: HashMap<String, Box<dyn ParameterBase>>,
}

impl Hp8131a {
    /// Create a driver bound to an open transport.
    pub fn with_transport(id: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            id: id.into(),
            health: HealthState::Uninitialized,
            transport: Some(transport),
            identity: None,
            parameters: declare_parameters(),
        }
    }

    /// Create a driver with no transport.
    ///
    /// Used by the shell when opening the connection target failed at
    /// startup: the adapter stays up in a degraded state and every
    /// accessor reports a connection error.
    pub fn disconnected(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            health: HealthState::Uninitialized,
            transport: None,
            identity: None,
            parameters: declare_parameters(),
        }
    }

    /// Cached identity string from the last successful handshake.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Send a raw command with no reply expected. Logged in both modes.
    pub async fn send(&mut self, command: &str) -> Result<()> {
        debug!(instrument = %self.id, command, "write");
        let result = match self.transport.as_mut() {
            Some(transport) => transport.send(command).await,
            None => Err(PulseError::NotConnected.into()),
        };
        if result.is_err() {
            self.health = HealthState::Faulted;
        }
        result
    }

    /// Send a raw command and return the reply line.
    pub async fn send_and_receive(&mut self, command: &str) -> Result<String> {
        debug!(instrument = %self.id, command, "query");
        let result = match self.transport.as_mut() {
            Some(transport) => transport.send_and_receive(command).await,
            None => Err(PulseError::NotConnected.into()),
        };
        match result {
            Ok(reply) => {
                debug!(instrument = %self.id, reply = %reply, "reply");
                Ok(reply)
            }
            Err(err) => {
                self.health = HealthState::Faulted;
                Err(err)
            }
        }
    }

    /// Read a property from the instrument.
    ///
    /// Queries `<mnemonic>?`, coerces the reply per the property's declared
    /// type, and refreshes the cached display value.
    pub async fn read(&mut self, property: PulseProperty) -> Result<PropertyValue> {
        let query = format!("{}?", property.mnemonic());
        let reply = self.send_and_receive(&query).await?;
        let value = coerce_reply(property.kind(), &reply)?;

        self.refresh_cache(property, value);
        debug!(instrument = %self.id, property = property.name(), value = %value, "read");
        Ok(value)
    }

    /// Write a property value to the instrument.
    ///
    /// The value's kind must match the property's declared type, and
    /// numeric values must fall within the declared bounds; both checks
    /// happen before any command is sent. The instrument's state change is
    /// unobservable until a subsequent read.
    pub async fn write(&mut self, property: PulseProperty, value: PropertyValue) -> Result<()> {
        if value.kind() != property.kind() {
            return Err(PulseError::TypeMismatch {
                property: property.name(),
                expected: property.kind().expected(),
            }
            .into());
        }

        if let (PropertyValue::Float(v), Some((min, max))) = (value, property.bounds()) {
            if v < min || v > max {
                return Err(PulseError::Validation {
                    property: property.name(),
                    value: v,
                    min,
                    max,
                }
                .into());
            }
        }

        let command = format!("{} {}", property.mnemonic(), value.render());
        self.send(&command).await?;

        self.refresh_cache(property, value);
        debug!(instrument = %self.id, property = property.name(), value = %value, "write");
        Ok(())
    }

    /// Fire a single trigger event.
    pub async fn manual_trigger(&mut self) -> Result<()> {
        self.send("*TRG").await
    }

    /// Run the instrument self-test and update the health state.
    ///
    /// Reply `0` means the test passed (health `Connected`); any other
    /// reply marks the instrument `Faulted`.
    pub async fn self_test(&mut self) -> Result<()> {
        let reply = self.send_and_receive("*TST?").await?;
        if reply.trim() == "0" {
            self.health = HealthState::Connected;
            info!(instrument = %self.id, "self-test passed");
        } else {
            self.health = HealthState::Faulted;
            warn!(instrument = %self.id, reply = %reply, "self-test failed");
        }
        Ok(())
    }

    fn refresh_cache(&mut self, property: PulseProperty, value: PropertyValue) {
        if let Some(param) = self.parameters.get_mut(property.name()) {
            if let Err(err) = param.update_json(value.to_json()) {
                warn!(
                    instrument = %self.id,
                    property = property.name(),
                    %err,
                    "failed to refresh cached value"
                );
            }
        }
    }
}

#[async_trait]
impl Instrument for Hp8131a {
    fn id(&self) -> &str {
        &self.id
    }

    fn health(&self) -> HealthState {
        self.health
    }

    /// Verify communication with an identity query.
    ///
    /// On failure the health becomes `Faulted` and the error propagates;
    /// the shell decides whether to keep running degraded.
    async fn initialize(&mut self) -> Result<()> {
        match self.send_and_receive("*IDN?").await {
            Ok(identity) => {
                info!(instrument = %self.id, %identity, "connection established");
                self.identity = Some(identity);
                self.health = HealthState::Connected;
                Ok(())
            }
            Err(err) => {
                self.health = HealthState::Faulted;
                Err(err)
            }
        }
    }

    /// Release the connection and return to `Uninitialized`.
    async fn shutdown(&mut self) -> Result<()> {
        // Dropping the transport closes the underlying port.
        self.transport = None;
        self.health = HealthState::Uninitialized;
        info!(instrument = %self.id, "shut down");
        Ok(())
    }

    fn parameters(&self) -> &HashMap<String, Box<dyn ParameterBase>> {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut HashMap<String, Box<dyn ParameterBase>> {
        &mut self.parameters
    }
}

/// Declare the fixed property surface with labels, units, and bounds.
fn declare_parameters() -> HashMap<String, Box<dyn ParameterBase>> {
    let mut parameters: HashMap<String, Box<dyn ParameterBase>> = HashMap::new();

    for property in PulseProperty::ALL {
        let name = property.name();
        let parameter: Box<dyn ParameterBase> = match property.kind() {
            PropertyKind::Bool => Box::new(
                ParameterBuilder::new(name, false)
                    .description(property.label())
                    .build(),
            ),
            PropertyKind::Float => {
                let (min, max) = property.bounds().unwrap_or((f64::MIN, f64::MAX));
                let mut builder = ParameterBuilder::new(name, min)
                    .description(property.label())
                    .range(min, max);
                if let Some(unit) = property.unit() {
                    builder = builder.unit(unit);
                }
                Box::new(builder.build())
            }
            PropertyKind::TriggerMode => Box::new(
                ParameterBuilder::new(name, TriggerMode::Auto.as_str().to_string())
                    .description(property.label())
                    .choices(
                        TriggerMode::ALL
                            .iter()
                            .map(|mode| mode.as_str().to_string())
                            .collect(),
                    )
                    .build(),
            ),
            PropertyKind::TriggerSlope => Box::new(
                ParameterBuilder::new(name, TriggerSlope::Positive.as_str().to_string())
                    .description(property.label())
                    .choices(
                        TriggerSlope::ALL
                            .iter()
                            .map(|slope| slope.as_str().to_string())
                            .collect(),
                    )
                    .build(),
            ),
        };
        parameters.insert(name.to_string(), parameter);
    }

    parameters
}
