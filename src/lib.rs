//! # pulse-daq
//!
//! Remote-control adapter for the HP 8131A 500 MHz pulse generator. The
//! instrument's configuration registers (timing, voltage levels, trigger
//! behavior) are exposed as a fixed set of named, typed, readable/writable
//! properties over its line-oriented text command set, and instrument
//! health is reported as a coarse state.
//!
//! The core is deliberately small: a static property ↔ mnemonic table, one
//! generic read accessor, one write accessor with per-type rendering, a
//! handful of passthrough commands, and a three-state health machine. No
//! retries, no caching beyond display-value refresh, no background tasks.
//!
//! ## Crate Structure
//!
//! - **`commands`**: the fixed property set, the bijective property ↔
//!   mnemonic command table, and the trigger enumerations with their
//!   symbolic-name tables.
//! - **`value`**: typed property values; coercion of instrument replies
//!   and rendering of write commands.
//! - **`transport`**: the line-oriented [`transport::Transport`] channel,
//!   with a serial implementation for real hardware and a simulated
//!   instrument for tests and mock mode.
//! - **`instruments`**: the [`instruments::Hp8131a`] driver with read/write
//!   accessors, raw passthroughs, manual trigger, and self-test.
//! - **`parameter`**: `Parameter<T>` property metadata (label, unit,
//!   bounds) with watch-channel change notification for host displays.
//! - **`core`**: health state, the `Instrument` lifecycle trait, and
//!   dynamic JSON parameter access.
//! - **`config`**: TOML + environment configuration loading.
//! - **`error`**: the `PulseError` type.
//! - **`tracing_setup`**: logging initialization for the shell.

pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod instruments;
pub mod parameter;
pub mod tracing_setup;
pub mod transport;
pub mod value;
