// Serial port abstraction with async support
// Wraps the serialport crate with tokio timing and exposes the byte-level
// Transport contract the CAT protocol is written against

use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

/// Interval between input-queue polls while waiting for data
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Error, Debug)]
pub enum SerialError {
    #[error("cannot open {port}: {reason}")]
    Open { port: String, reason: String },

    #[error("{port}: {reason}")]
    Control { port: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("port already closed")]
    NotOpen,
}

impl SerialError {
    /// Interrupted and would-block conditions: the caller should retry
    /// the same wait/read without treating it as a failure
    pub fn is_transient(&self) -> bool {
        match self {
            SerialError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Outcome of waiting for the input side to become readable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    TimedOut,
}

/// Byte-level link to the radio.
///
/// Protocol code is written against this trait so it can be driven by a
/// real serial port or by the scripted mock in tests.
// Driven from a single task on a current-thread runtime, so the returned
// futures are never required to be Send.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Write the whole buffer, retrying short writes internally
    async fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for at least one byte to be readable
    async fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness>;

    /// Read whatever is available into `buf`. Zero means the link closed.
    async fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Line settings for the CAT jack. The radio's CAT rate menu offers
/// 4800, 9600 and 38400 baud; framing is always 8N2.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub stop_bits: serialport::StopBits,
    pub parity: serialport::Parity,
    pub flow_control: serialport::FlowControl,

    /// Bound on a single blocking read or write inside the driver
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig::new(4800)
    }
}

impl SerialConfig {
    pub fn new(baud_rate: u32) -> Self {
        SerialConfig {
            baud_rate,
            data_bits: serialport::DataBits::Eight,
            stop_bits: serialport::StopBits::Two,
            parity: serialport::Parity::None,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_secs(2),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stop_bits(mut self, stop_bits: serialport::StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }
}

/// Serial device in raw mode. Dropping it (or `close`) releases the device.
pub struct SerialPort {
    inner: Option<Box<dyn serialport::SerialPort>>,
    name: String,
    config: SerialConfig,
}

impl SerialPort {
    pub fn open(port_name: &str, config: SerialConfig) -> Result<Self> {
        let inner = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|e| SerialError::Open {
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            "Opened {} at {} baud ({:?} stop bits)",
            port_name,
            config.baud_rate,
            config.stop_bits
        );

        Ok(SerialPort {
            inner: Some(inner),
            name: port_name.to_string(),
            config,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn device(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>> {
        self.inner.as_mut().ok_or(SerialError::NotOpen)
    }

    fn control_error(&self, e: serialport::Error) -> SerialError {
        SerialError::Control {
            port: self.name.clone(),
            reason: e.to_string(),
        }
    }

    /// Discard bytes the radio sent that nobody has read yet
    pub fn clear_input(&mut self) -> Result<()> {
        let result = self.device()?.clear(serialport::ClearBuffer::Input);
        result.map_err(|e| self.control_error(e))
    }

    /// Bytes waiting in the driver's input queue
    pub fn bytes_to_read(&mut self) -> Result<u32> {
        let result = self.device()?.bytes_to_read();
        result.map_err(|e| self.control_error(e))
    }

    pub fn close(mut self) -> Result<()> {
        match self.inner.take() {
            Some(_) => {
                tracing::debug!("Closed {}", self.name);
                Ok(())
            }
            None => Err(SerialError::NotOpen),
        }
    }
}

impl Transport for SerialPort {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let port = self.device()?;

        let mut written = 0;
        while written < buf.len() {
            match port.write(&buf[written..]) {
                Ok(0) => {
                    return Err(SerialError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "Port accepted no bytes",
                    )))
                }
                Ok(n) => written += n,
                Err(ref e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(SerialError::Io(e)),
            }
        }

        port.flush().map_err(SerialError::Io)
    }

    async fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.bytes_to_read()? > 0 {
                return Ok(Readiness::Ready);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Readiness::TimedOut);
            }
            sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        let port = self.device()?;
        port.read(buf).map_err(SerialError::Io)
    }
}
