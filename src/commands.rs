//! Property ↔ mnemonic command table for the HP 8131A.
//!
//! The instrument exposes its configuration registers through colon-
//! delimited hierarchical SCPI-style mnemonics (e.g. `:PULS1:TIM:WIDT`).
//! This module declares the fixed property set, the one-to-one mapping to
//! mnemonics, and the enumerated trigger types with their symbolic-name
//! tables.
//!
//! The mapping is a bijection over the declared set and is fixed at
//! compile time; `from_name`/`from_mnemonic` failures indicate a caller
//! bug or a diagnostic on unexpected traffic, never a runtime condition
//! of the instrument.

use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::PulseError;

// =============================================================================
// Trigger enumerations
// =============================================================================

/// Trigger mode of the input stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerMode {
    /// Free-running pulse generation.
    Auto = 0,
    /// One pulse per trigger event.
    Trigger = 1,
    /// Pulses while the gate signal is asserted.
    Gate = 2,
    /// A burst of pulses per trigger event.
    Burst = 3,
    /// Output width follows the external trigger width.
    EWidth = 4,
    /// Transducer mode.
    Transducer = 5,
}

impl TriggerMode {
    /// All modes, in ordinal order.
    pub const ALL: [TriggerMode; 6] = [
        TriggerMode::Auto,
        TriggerMode::Trigger,
        TriggerMode::Gate,
        TriggerMode::Burst,
        TriggerMode::EWidth,
        TriggerMode::Transducer,
    ];

    /// Symbolic name as sent to / received from the instrument.
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerMode::Auto => "AUTO",
            TriggerMode::Trigger => "TRIGGER",
            TriggerMode::Gate => "GATE",
            TriggerMode::Burst => "BURST",
            TriggerMode::EWidth => "EWIDTH",
            TriggerMode::Transducer => "TRANSDUCER",
        }
    }

    /// Ordinal value (stable wire-independent encoding).
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Mode for an ordinal value, if in range.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }
}

impl FromStr for TriggerMode {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| PulseError::Coercion {
                reply: s.to_string(),
                expected: "trigger mode",
            })
    }
}

/// Trigger slope of the input stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerSlope {
    /// Trigger on the rising edge.
    Positive = 0,
    /// Trigger on the falling edge.
    Negative = 1,
}

impl TriggerSlope {
    /// Both slopes, in ordinal order.
    pub const ALL: [TriggerSlope; 2] = [TriggerSlope::Positive, TriggerSlope::Negative];

    /// Symbolic name as sent to / received from the instrument.
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerSlope::Positive => "POSITIVE",
            TriggerSlope::Negative => "NEGATIVE",
        }
    }

    /// Ordinal value.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Slope for an ordinal value, if in range.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }
}

impl FromStr for TriggerSlope {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|slope| slope.as_str() == s)
            .ok_or_else(|| PulseError::Coercion {
                reply: s.to_string(),
                expected: "trigger slope",
            })
    }
}

// =============================================================================
// Property kinds
// =============================================================================

/// Value type of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// On/off register: written as `0`/`1`, read back as `OFF`/`ON`.
    Bool,
    /// Numeric register, engineering-notation decimal on the wire.
    Float,
    /// Trigger mode register, symbolic names on the wire.
    TriggerMode,
    /// Trigger slope register, symbolic names on the wire.
    TriggerSlope,
}

impl PropertyKind {
    /// Human-readable kind name for error messages and listings.
    pub fn expected(self) -> &'static str {
        match self {
            PropertyKind::Bool => "boolean",
            PropertyKind::Float => "float",
            PropertyKind::TriggerMode => "trigger mode",
            PropertyKind::TriggerSlope => "trigger slope",
        }
    }
}

// =============================================================================
// Property set
// =============================================================================

/// A logical instrument setting exposed as a readable/writable property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PulseProperty {
    /// Trigger mode of the input stage.
    TriggerMode,
    /// Trigger slope of the input stage.
    TriggerSlope,
    /// External trigger threshold level.
    TriggerLevel,
    /// External trigger input enable.
    TriggerExternal,
    /// Pulse repetition period (common to both channels).
    Period,
    /// Channel 1 pulse width.
    Width1,
    /// Channel 1 pulse delay.
    Delay1,
    /// Channel 1 low level.
    Low1,
    /// Channel 1 high level.
    High1,
    /// Channel 1 output enable.
    Enabled1,
    /// Channel 1 complement output enable.
    CompEnabled1,
    /// Channel 2 pulse width.
    Width2,
    /// Channel 2 pulse delay.
    Delay2,
    /// Channel 2 low level.
    Low2,
    /// Channel 2 high level.
    High2,
    /// Channel 2 output enable.
    Enabled2,
    /// Channel 2 complement output enable.
    CompEnabled2,
}

impl PulseProperty {
    /// The full declared property set.
    pub const ALL: [PulseProperty; 17] = [
        PulseProperty::TriggerMode,
        PulseProperty::TriggerSlope,
        PulseProperty::TriggerLevel,
        PulseProperty::TriggerExternal,
        PulseProperty::Period,
        PulseProperty::Width1,
        PulseProperty::Delay1,
        PulseProperty::Low1,
        PulseProperty::High1,
        PulseProperty::Enabled1,
        PulseProperty::CompEnabled1,
        PulseProperty::Width2,
        PulseProperty::Delay2,
        PulseProperty::Low2,
        PulseProperty::High2,
        PulseProperty::Enabled2,
        PulseProperty::CompEnabled2,
    ];

    /// Logical property name used by the host surface.
    pub fn name(self) -> &'static str {
        match self {
            PulseProperty::TriggerMode => "trigger_mode",
            PulseProperty::TriggerSlope => "trigger_slope",
            PulseProperty::TriggerLevel => "trigger_level",
            PulseProperty::TriggerExternal => "trigger_external",
            PulseProperty::Period => "period",
            PulseProperty::Width1 => "width1",
            PulseProperty::Delay1 => "delay1",
            PulseProperty::Low1 => "low1",
            PulseProperty::High1 => "high1",
            PulseProperty::Enabled1 => "enabled1",
            PulseProperty::CompEnabled1 => "cenabled1",
            PulseProperty::Width2 => "width2",
            PulseProperty::Delay2 => "delay2",
            PulseProperty::Low2 => "low2",
            PulseProperty::High2 => "high2",
            PulseProperty::Enabled2 => "enabled2",
            PulseProperty::CompEnabled2 => "cenabled2",
        }
    }

    /// Display label shown by host frontends.
    pub fn label(self) -> &'static str {
        match self {
            PulseProperty::TriggerMode => "trigger",
            PulseProperty::TriggerSlope => "trigger_slope",
            PulseProperty::TriggerLevel => "trigger_level",
            PulseProperty::TriggerExternal => "trigger_external",
            PulseProperty::Period => "period",
            PulseProperty::Width1 => "ch1_width",
            PulseProperty::Delay1 => "ch1_delay",
            PulseProperty::Low1 => "ch1_low",
            PulseProperty::High1 => "ch1_high",
            PulseProperty::Enabled1 => "ch1_enabled",
            PulseProperty::CompEnabled1 => "ch1_comp_enabled",
            PulseProperty::Width2 => "ch2_width",
            PulseProperty::Delay2 => "ch2_delay",
            PulseProperty::Low2 => "ch2_low",
            PulseProperty::High2 => "ch2_high",
            PulseProperty::Enabled2 => "ch2_enabled",
            PulseProperty::CompEnabled2 => "ch2_comp_enabled",
        }
    }

    /// Command mnemonic understood by the instrument.
    pub fn mnemonic(self) -> &'static str {
        match self {
            PulseProperty::TriggerMode => ":INP:TRIG:MODE",
            PulseProperty::TriggerSlope => ":INP:TRIG:SLOP",
            PulseProperty::TriggerLevel => ":INP:TRIG:THR",
            PulseProperty::TriggerExternal => ":INP:TRIG:STAT",
            PulseProperty::Period => ":PULS:TIM:PER",
            PulseProperty::Width1 => ":PULS1:TIM:WIDT",
            PulseProperty::Delay1 => ":PULS1:TIM:DEL",
            PulseProperty::Low1 => ":PULS1:LEVEL:LOW",
            PulseProperty::High1 => ":PULS1:LEVEL:HIGH",
            PulseProperty::Enabled1 => ":OUTP1:PULS:STAT",
            PulseProperty::CompEnabled1 => ":OUTP1:PULS:CST",
            PulseProperty::Width2 => ":PULS2:TIM:WIDT",
            PulseProperty::Delay2 => ":PULS2:TIM:DEL",
            PulseProperty::Low2 => ":PULS2:LEVEL:LOW",
            PulseProperty::High2 => ":PULS2:LEVEL:HIGH",
            PulseProperty::Enabled2 => ":OUTP2:PULS:STAT",
            PulseProperty::CompEnabled2 => ":OUTP2:PULS:CST",
        }
    }

    /// Declared value type.
    pub fn kind(self) -> PropertyKind {
        match self {
            PulseProperty::TriggerMode => PropertyKind::TriggerMode,
            PulseProperty::TriggerSlope => PropertyKind::TriggerSlope,
            PulseProperty::TriggerExternal
            | PulseProperty::Enabled1
            | PulseProperty::CompEnabled1
            | PulseProperty::Enabled2
            | PulseProperty::CompEnabled2 => PropertyKind::Bool,
            _ => PropertyKind::Float,
        }
    }

    /// Unit of measurement for numeric properties.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            PulseProperty::Period
            | PulseProperty::Width1
            | PulseProperty::Delay1
            | PulseProperty::Width2
            | PulseProperty::Delay2 => Some("s"),
            PulseProperty::TriggerLevel
            | PulseProperty::Low1
            | PulseProperty::High1
            | PulseProperty::Low2
            | PulseProperty::High2 => Some("V"),
            _ => None,
        }
    }

    /// Declared numeric bounds (inclusive) for numeric properties.
    pub fn bounds(self) -> Option<(f64, f64)> {
        match self {
            PulseProperty::Period => Some((2e-9, 99.9e-3)),
            PulseProperty::Width1 | PulseProperty::Width2 => Some((0.5e-9, 99.9e-3)),
            PulseProperty::Delay1 | PulseProperty::Delay2 => Some((0.0, 99.9e-3)),
            PulseProperty::Low1 | PulseProperty::Low2 => Some((-5.0, 4.9)),
            PulseProperty::High1 | PulseProperty::High2 => Some((-4.9, 5.0)),
            PulseProperty::TriggerLevel => Some((-5.0, 5.0)),
            _ => None,
        }
    }

    /// Resolve a logical property name.
    pub fn from_name(name: &str) -> Result<Self, PulseError> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or_else(|| PulseError::UnknownProperty(name.to_string()))
    }

    /// Reverse lookup: resolve a mnemonic back to its property.
    ///
    /// Used for diagnostics on captured traffic.
    pub fn from_mnemonic(mnemonic: &str) -> Result<Self, PulseError> {
        MNEMONIC_TABLE
            .get(mnemonic)
            .copied()
            .ok_or_else(|| PulseError::UnknownMnemonic(mnemonic.to_string()))
    }
}

static MNEMONIC_TABLE: Lazy<HashMap<&'static str, PulseProperty>> = Lazy::new(|| {
    PulseProperty::ALL
        .iter()
        .map(|p| (p.mnemonic(), *p))
        .collect()
});

// =============================================================================
// Tests
// =============================================================================
