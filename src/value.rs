//! Typed property values and reply/command coercion.
//!
//! The instrument speaks text in both directions; this module is the
//! single place where text becomes typed values and back:
//!
//! - Replies are coerced per the property's declared kind: `ON`/`OFF` for
//!   booleans, symbolic names for the trigger enumerations, and `f64`
//!   parsing for everything else. Anything that does not match is a
//!   coercion error, surfaced to the caller with no state change.
//! - Written values render as the instrument expects: booleans as `0`/`1`,
//!   enumerations as their symbolic name, numerics in engineering notation
//!   (`2E-9`), which the reply parser round-trips exactly.

use std::fmt;

use crate::commands::{PropertyKind, TriggerMode, TriggerSlope};
use crate::error::PulseError;

/// A typed property value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    /// On/off state.
    Bool(bool),
    /// Numeric value in the property's unit.
    Float(f64),
    /// Trigger mode.
    TriggerMode(TriggerMode),
    /// Trigger slope.
    TriggerSlope(TriggerSlope),
}

impl PropertyValue {
    /// Kind of this value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::TriggerMode(_) => PropertyKind::TriggerMode,
            PropertyValue::TriggerSlope(_) => PropertyKind::TriggerSlope,
        }
    }

    /// Render the value as the instrument expects it in a write command.
    pub fn render(&self) -> String {
        match self {
            PropertyValue::Bool(state) => {
                if *state {
                    "1".to_string()
                } else {
                    "0".to_string()
                }
            }
            PropertyValue::Float(value) => format!("{value:E}"),
            PropertyValue::TriggerMode(mode) => mode.as_str().to_string(),
            PropertyValue::TriggerSlope(slope) => slope.as_str().to_string(),
        }
    }

    /// JSON projection for the host parameter surface.
    ///
    /// Enumerations project as their symbolic name, matching the choices
    /// declared on the corresponding parameter.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::Bool(state) => serde_json::json!(state),
            PropertyValue::Float(value) => serde_json::json!(value),
            PropertyValue::TriggerMode(mode) => serde_json::json!(mode.as_str()),
            PropertyValue::TriggerSlope(slope) => serde_json::json!(slope.as_str()),
        }
    }

    /// Parse operator input (CLI, scripts) into a value of the given kind.
    ///
    /// More forgiving than reply coercion: booleans accept `on/off`,
    /// `true/false`, `1/0` in any case, and enumeration names are matched
    /// case-insensitively.
    pub fn parse_input(kind: PropertyKind, input: &str) -> Result<Self, PulseError> {
        let trimmed = input.trim();
        match kind {
            PropertyKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "on" | "true" => Ok(PropertyValue::Bool(true)),
                "0" | "off" | "false" => Ok(PropertyValue::Bool(false)),
                _ => Err(PulseError::Coercion {
                    reply: trimmed.to_string(),
                    expected: kind.expected(),
                }),
            },
            PropertyKind::Float => trimmed
                .parse::<f64>()
                .map(PropertyValue::Float)
                .map_err(|_| PulseError::Coercion {
                    reply: trimmed.to_string(),
                    expected: kind.expected(),
                }),
            PropertyKind::TriggerMode => trimmed
                .to_ascii_uppercase()
                .parse::<TriggerMode>()
                .map(PropertyValue::TriggerMode),
            PropertyKind::TriggerSlope => trimmed
                .to_ascii_uppercase()
                .parse::<TriggerSlope>()
                .map(PropertyValue::TriggerSlope),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(state) => f.write_str(if *state { "ON" } else { "OFF" }),
            PropertyValue::Float(value) => write!(f, "{value}"),
            PropertyValue::TriggerMode(mode) => f.write_str(mode.as_str()),
            PropertyValue::TriggerSlope(slope) => f.write_str(slope.as_str()),
        }
    }
}

/// Coerce a raw instrument reply into a typed value.
///
/// Reply coercion is strict: only the exact tokens the instrument emits
/// are accepted.
pub fn coerce_reply(kind: PropertyKind, reply: &str) -> Result<PropertyValue, PulseError> {
    let trimmed = reply.trim();
    match kind {
        PropertyKind::Bool => match trimmed {
            "ON" => Ok(PropertyValue::Bool(true)),
            "OFF" => Ok(PropertyValue::Bool(false)),
            _ => Err(PulseError::Coercion {
                reply: trimmed.to_string(),
                expected: kind.expected(),
            }),
        },
        PropertyKind::Float => trimmed
            .parse::<f64>()
            .map(PropertyValue::Float)
            .map_err(|_| PulseError::Coercion {
                reply: trimmed.to_string(),
                expected: kind.expected(),
            }),
        PropertyKind::TriggerMode => trimmed
            .parse::<TriggerMode>()
            .map(PropertyValue::TriggerMode),
        PropertyKind::TriggerSlope => trimmed
            .parse::<TriggerSlope>()
            .map(PropertyValue::TriggerSlope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_coercion_is_strict() {
        assert_eq!(
            coerce_reply(PropertyKind::Bool, "ON").unwrap(),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            coerce_reply(PropertyKind::Bool, "OFF").unwrap(),
            PropertyValue::Bool(false)
        );
        assert!(matches!(
            coerce_reply(PropertyKind::Bool, "1"),
            Err(PulseError::Coercion { .. })
        ));
        assert!(matches!(
            coerce_reply(PropertyKind::Bool, "on"),
            Err(PulseError::Coercion { .. })
        ));
    }

    #[test]
    fn enum_coercion_matches_symbolic_names() {
        for mode in TriggerMode::ALL {
            assert_eq!(
                coerce_reply(PropertyKind::TriggerMode, mode.as_str()).unwrap(),
                PropertyValue::TriggerMode(mode)
            );
        }
        for slope in TriggerSlope::ALL {
            assert_eq!(
                coerce_reply(PropertyKind::TriggerSlope, slope.as_str()).unwrap(),
                PropertyValue::TriggerSlope(slope)
            );
        }
        assert!(coerce_reply(PropertyKind::TriggerMode, "EDGE").is_err());
    }

    #[test]
    fn numeric_render_parses_back_to_same_value() {
        for value in [2e-9, 99.9e-3, 0.0, -5.0, 4.9] {
            let rendered = PropertyValue::Float(value).render();
            let parsed = coerce_reply(PropertyKind::Float, &rendered).unwrap();
            assert_eq!(parsed, PropertyValue::Float(value), "via '{rendered}'");
        }
    }

    #[test]
    fn boolean_renders_as_integer() {
        assert_eq!(PropertyValue::Bool(true).render(), "1");
        assert_eq!(PropertyValue::Bool(false).render(), "0");
    }

    #[test]
    fn enum_renders_symbolic_name() {
        assert_eq!(PropertyValue::TriggerMode(TriggerMode::Burst).render(), "BURST");
        assert_eq!(
            PropertyValue::TriggerSlope(TriggerSlope::Negative).render(),
            "NEGATIVE"
        );
    }

    #[test]
    fn reply_whitespace_is_trimmed() {
        assert_eq!(
            coerce_reply(PropertyKind::Float, " 2E-9\r\n").unwrap(),
            PropertyValue::Float(2e-9)
        );
    }

    #[test]
    fn operator_input_is_forgiving() {
        assert_eq!(
            PropertyValue::parse_input(PropertyKind::Bool, "On").unwrap(),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            PropertyValue::parse_input(PropertyKind::Bool, "0").unwrap(),
            PropertyValue::Bool(false)
        );
        assert_eq!(
            PropertyValue::parse_input(PropertyKind::TriggerMode, "burst").unwrap(),
            PropertyValue::TriggerMode(TriggerMode::Burst)
        );
        assert_eq!(
            PropertyValue::parse_input(PropertyKind::Float, "99.9e-3").unwrap(),
            PropertyValue::Float(99.9e-3)
        );
        assert!(PropertyValue::parse_input(PropertyKind::Bool, "maybe").is_err());
    }

    #[test]
    fn json_projection_matches_parameter_types() {
        assert_eq!(PropertyValue::Bool(true).to_json(), serde_json::json!(true));
        assert_eq!(PropertyValue::Float(4.9).to_json(), serde_json::json!(4.9));
        assert_eq!(
            PropertyValue::TriggerMode(TriggerMode::Gate).to_json(),
            serde_json::json!("GATE")
        );
    }
}
