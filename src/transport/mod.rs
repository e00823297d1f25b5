//! Instrument transport layer.
//!
//! A [`Transport`] is a line-oriented command/reply channel to the physical
//! device: commands go out newline-terminated, replies come back
//! newline-terminated and are returned trimmed. Timeout policy is owned by
//! the transport; the layers above never retry.
//!
//! Two implementations are provided:
//! - [`SerialTransport`] for real hardware behind a serial device (feature
//!   `instrument_serial`, default on), covering both native serial and
//!   USB-GPIB adapters that expose the bus as a tty.
//! - [`MockPulseGen`], a simulated HP 8131A used by tests and the CLI's
//!   `--mock` mode.

use anyhow::Result;
use async_trait::async_trait;

pub mod mock;
#[cfg(feature = "instrument_serial")]
pub mod serial;

pub use mock::MockPulseGen;
#[cfg(feature = "instrument_serial")]
pub use serial::SerialTransport;

/// Line-oriented command channel to the instrument.
///
/// Exclusively owned by the driver; `&mut self` on every operation keeps
/// exactly one exchange in flight at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a command with no reply expected.
    async fn send(&mut self, command: &str) -> Result<()>;

    /// Send a command and wait for a single reply line.
    async fn send_and_receive(&mut self, command: &str) -> Result<String>;
}
