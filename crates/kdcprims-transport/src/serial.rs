use std::time::Duration;

use bytes::Bytes;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::DEFAULT_TIMEOUT;
use crate::traits::{read_exact_bytes, write_all_flush, Transport};

/// Default baud rate of the KDC101 virtual COM port.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial port settings. Framing is fixed at 8N1 without flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port path, e.g. `/dev/ttyUSB0` or `COM6`.
    pub port: String,
    /// Baud rate. Default: 115200.
    pub baud_rate: u32,
    /// Timeout applied to every blocking read and write.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Settings for `port` with default baud rate and timeout.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Serial-port transport backed by the `serialport` crate.
///
/// The port is opened on [`connect`](Transport::connect) and closed on
/// [`disconnect`](Transport::disconnect) or drop.
pub struct SerialTransport {
    config: SerialConfig,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Create a disconnected serial transport.
    pub fn new(config: SerialConfig) -> Self {
        Self { config, port: None }
    }

    /// The configured port settings.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let port = serialport::new(&self.config.port, self.config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.config.timeout)
            .open()
            .map_err(|e| TransportError::Open {
                port: self.config.port.clone(),
                source: e.into(),
            })?;

        // Stale bytes from a previous session would desynchronize framing.
        if let Err(err) = port.clear(ClearBuffer::All) {
            warn!(port = %self.config.port, %err, "failed to clear serial buffers");
        }

        info!(
            port = %self.config.port,
            baud = self.config.baud_rate,
            "opened serial port"
        );
        self.port = Some(port);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            info!(port = %self.config.port, "closed serial port");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let port = self.port_mut()?;
        write_all_flush(port.as_mut(), bytes)?;
        debug!(len = bytes.len(), "serial write");
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        let port = self.port_mut()?;
        let bytes = read_exact_bytes(port.as_mut(), n)?;
        debug!(len = n, "serial read");
        Ok(bytes)
    }

    fn transport_name(&self) -> &'static str {
        "serial"
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("config", &self.config)
            .field("connected", &self.port.is_some())
            .finish()
    }
}
