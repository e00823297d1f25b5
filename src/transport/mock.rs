//! Simulated HP 8131A for tests and the CLI mock mode.
//!
//! Emulates the instrument's register file keyed by mnemonic: writes store
//! the value token, queries echo it back. The instrument's asymmetric
//! boolean convention is reproduced: state registers are written as
//! `0`/`1` but report `OFF`/`ON`. `*IDN?`, `*TST?`, and `*TRG` behave like
//! the common-command subset the driver uses.
//!
//! The mock is cheaply cloneable; clones share state, so a test can hand
//! one clone to the driver and inspect traffic through another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;

use super::Transport;
use crate::commands::{PropertyKind, PulseProperty};
use crate::error::PulseError;

const IDENTITY: &str = "HEWLETT-PACKARD,8131A,0,REV 01.00";

struct MockState {
    /// Register file: mnemonic → stored value token.
    registers: HashMap<&'static str, String>,
    /// Reply to `*TST?`.
    self_test_reply: String,
    /// `*TRG` events received.
    trigger_count: usize,
    /// Every command received, in order.
    traffic: Vec<String>,
    /// When set, every exchange fails as if the link were dead.
    offline: bool,
}

/// Simulated HP 8131A register file behind the [`Transport`] trait.
#[derive(Clone)]
pub struct MockPulseGen {
    state: Arc<Mutex<MockState>>,
}

impl MockPulseGen {
    /// Create a mock with plausible power-on register values.
    pub fn new() -> Self {
        let mut registers = HashMap::new();
        for property in PulseProperty::ALL {
            let default = match property.kind() {
                PropertyKind::Bool => "0".to_string(),
                PropertyKind::TriggerMode => "AUTO".to_string(),
                PropertyKind::TriggerSlope => "POSITIVE".to_string(),
                PropertyKind::Float => {
                    let (min, _) = property.bounds().unwrap_or((0.0, 0.0));
                    format!("{min:E}")
                }
            };
            registers.insert(property.mnemonic(), default);
        }

        Self {
            state: Arc::new(Mutex::new(MockState {
                registers,
                self_test_reply: "0".to_string(),
                trigger_count: 0,
                traffic: Vec::new(),
                offline: false,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the reply the mock returns for `*TST?`.
    pub fn set_self_test_reply(&self, reply: impl Into<String>) {
        self.lock().self_test_reply = reply.into();
    }

    /// Simulate a dead link: every exchange fails until re-enabled.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of `*TRG` events received.
    pub fn trigger_count(&self) -> usize {
        self.lock().trigger_count
    }

    /// Every command received so far, in order.
    pub fn traffic(&self) -> Vec<String> {
        self.lock().traffic.clone()
    }

    /// Raw stored token for a register, if any.
    pub fn register(&self, mnemonic: &str) -> Option<String> {
        self.lock().registers.get(mnemonic).cloned()
    }

    fn check_online(state: &MockState) -> Result<()> {
        if state.offline {
            return Err(PulseError::Connection("instrument is not responding".to_string()).into());
        }
        Ok(())
    }

    fn answer(state: &MockState, command: &str) -> Result<String> {
        match command {
            "*IDN?" => Ok(IDENTITY.to_string()),
            "*TST?" => Ok(state.self_test_reply.clone()),
            _ => {
                let mnemonic = command.trim_end_matches('?');
                let stored = state.registers.get(mnemonic).ok_or_else(|| {
                    PulseError::UnknownMnemonic(mnemonic.to_string())
                })?;

                // State registers report ON/OFF even though they are
                // written as 0/1.
                if let Ok(property) = PulseProperty::from_mnemonic(mnemonic) {
                    if property.kind() == PropertyKind::Bool {
                        return Ok(match stored.as_str() {
                            "1" => "ON".to_string(),
                            "0" => "OFF".to_string(),
                            other => other.to_string(),
                        });
                    }
                }
                Ok(stored.clone())
            }
        }
    }
}

impl Default for MockPulseGen {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockPulseGen {
    async fn send(&mut self, command: &str) -> Result<()> {
        let mut state = self.lock();
        state.traffic.push(command.to_string());
        Self::check_online(&state)?;

        if command == "*TRG" {
            state.trigger_count += 1;
            return Ok(());
        }

        if let Some((mnemonic, value)) = command.split_once(' ') {
            if let Ok(property) = PulseProperty::from_mnemonic(mnemonic) {
                state
                    .registers
                    .insert(property.mnemonic(), value.to_string());
            }
        }

        Ok(())
    }

    async fn send_and_receive(&mut self, command: &str) -> Result<String> {
        let mut state = self.lock();
        state.traffic.push(command.to_string());
        Self::check_online(&state)?;

        Self::answer(&state, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_query_echoes_value() {
        let mut mock = MockPulseGen::new();
        mock.send(":PULS:TIM:PER 2E-9").await.unwrap();
        assert_eq!(mock.send_and_receive(":PULS:TIM:PER?").await.unwrap(), "2E-9");
    }

    #[tokio::test]
    async fn boolean_registers_report_on_off() {
        let mut mock = MockPulseGen::new();
        assert_eq!(
            mock.send_and_receive(":OUTP1:PULS:STAT?").await.unwrap(),
            "OFF"
        );
        mock.send(":OUTP1:PULS:STAT 1").await.unwrap();
        assert_eq!(
            mock.send_and_receive(":OUTP1:PULS:STAT?").await.unwrap(),
            "ON"
        );
    }

    #[tokio::test]
    async fn common_commands() {
        let mut mock = MockPulseGen::new();
        assert!(mock
            .send_and_receive("*IDN?")
            .await
            .unwrap()
            .contains("8131A"));

        mock.set_self_test_reply("1");
        assert_eq!(mock.send_and_receive("*TST?").await.unwrap(), "1");

        mock.send("*TRG").await.unwrap();
        mock.send("*TRG").await.unwrap();
        assert_eq!(mock.trigger_count(), 2);
    }

    #[tokio::test]
    async fn offline_mock_fails_every_exchange() {
        let mut mock = MockPulseGen::new();
        mock.set_offline(true);
        assert!(mock.send_and_receive("*IDN?").await.is_err());
        assert!(mock.send(":PULS:TIM:PER 1E-6").await.is_err());

        mock.set_offline(false);
        assert!(mock.send_and_receive("*IDN?").await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mut mock = MockPulseGen::new();
        let observer = mock.clone();
        mock.send(":PULS1:TIM:WIDT 5E-7").await.unwrap();
        assert_eq!(observer.register(":PULS1:TIM:WIDT").as_deref(), Some("5E-7"));
        assert_eq!(observer.traffic(), vec![":PULS1:TIM:WIDT 5E-7".to_string()]);
    }
}
