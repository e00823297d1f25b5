//! Serial transport for the instrument link.
//!
//! The HP 8131A is reached either over native GPIB or through a USB-GPIB
//! adapter that exposes the bus as a serial device; in both deployments
//! the adapter side is a plain tty. Line terminator is `\n` in both
//! directions.
//!
//! Uses blocking I/O wrapped in a `Mutex` rather than an async serial
//! stack; the protocol is simple and low-frequency, with a single command
//! or query in flight at a time.

use std::io::{Read, Write};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::trace;

use super::Transport;
use crate::error::PulseError;

const LINE_TERMINATOR: &str = "\n";
const REPLY_TERMINATOR: char = '\n';

/// Serial connection to the instrument.
pub struct SerialTransport {
    port: Mutex<Box<dyn serialport::SerialPort>>,
    target: String,
    reply_timeout: Duration,
}

impl SerialTransport {
    /// Open the serial device at `path` with the given baud rate.
    ///
    /// `reply_timeout` bounds how long a query waits for the terminating
    /// newline; the underlying port uses a short read timeout so the wait
    /// loop stays responsive.
    pub fn open(path: &str, baud_rate: u32, reply_timeout: Duration) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(50))
            .open()
            .map_err(|e| PulseError::Connection(format!("failed to open {path}: {e}")))?;

        Ok(Self {
            port: Mutex::new(port),
            target: path.to_string(),
            reply_timeout,
        })
    }

    fn write_line(&self, command: &str) -> Result<()> {
        let line = format!("{command}{LINE_TERMINATOR}");
        trace!(port = %self.target, command, "serial write");

        let mut port = self
            .port
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        port.write_all(line.as_bytes())
            .with_context(|| format!("failed to send command to '{}'", self.target))?;
        Ok(())
    }

    fn read_reply(&self) -> Result<String> {
        let mut port = self
            .port
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut buffer = [0u8; 256];
        let mut reply = String::new();
        let start = Instant::now();

        // Accumulate until the terminator shows up or the reply window
        // closes. Individual reads time out quickly so a silent instrument
        // does not pin the loop.
        while start.elapsed() < self.reply_timeout {
            match port.read(&mut buffer) {
                Ok(n) if n > 0 => {
                    reply.push_str(&String::from_utf8_lossy(&buffer[..n]));
                    if reply.contains(REPLY_TERMINATOR) {
                        trace!(port = %self.target, reply = %reply.escape_default(), "serial read");
                        return Ok(reply.trim().to_string());
                    }
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => {
                    return Err(PulseError::Connection(format!(
                        "read from '{}' failed: {e}",
                        self.target
                    ))
                    .into());
                }
            }
        }

        Err(PulseError::Connection(format!(
            "no reply from '{}' within {:?}",
            self.target, self.reply_timeout
        ))
        .into())
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, command: &str) -> Result<()> {
        self.write_line(command)
    }

    async fn send_and_receive(&mut self, command: &str) -> Result<String> {
        self.write_line(command)?;
        self.read_reply()
    }
}
