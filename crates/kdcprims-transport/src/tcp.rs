use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{read_exact_bytes, write_all_flush, Transport};

/// Settings for a serial-over-TCP bridge (e.g. ser2net).
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// `host:port` of the bridge.
    pub addr: String,
    /// Connect, read and write timeout.
    pub timeout: Duration,
}

impl TcpConfig {
    /// Settings for `addr` with the default 5 s timeout.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: crate::DEFAULT_TIMEOUT,
        }
    }
}

/// TCP transport for controllers exposed through a serial bridge.
#[derive(Debug)]
pub struct TcpTransport {
    config: TcpConfig,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Create a disconnected TCP transport.
    pub fn new(config: TcpConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// The configured bridge settings.
    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    fn connect_error(&self, source: std::io::Error) -> TransportError {
        TransportError::Connect {
            addr: self.config.addr.clone(),
            source,
        }
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let addr = self
            .config
            .addr
            .to_socket_addrs()
            .map_err(|e| self.connect_error(e))?
            .next()
            .ok_or_else(|| {
                self.connect_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "address resolved to nothing",
                ))
            })?;

        let stream = TcpStream::connect_timeout(&addr, self.config.timeout)
            .map_err(|e| self.connect_error(e))?;
        stream
            .set_read_timeout(Some(self.config.timeout))
            .map_err(|e| self.connect_error(e))?;
        stream
            .set_write_timeout(Some(self.config.timeout))
            .map_err(|e| self.connect_error(e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| self.connect_error(e))?;

        info!(addr = %self.config.addr, "connected to serial bridge");
        self.stream = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            // The peer may already be gone; the socket is closed on drop regardless.
            let _ = stream.shutdown(Shutdown::Both);
            info!(addr = %self.config.addr, "disconnected from serial bridge");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream_mut()?;
        write_all_flush(stream, bytes)?;
        debug!(len = bytes.len(), "tcp write");
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        let stream = self.stream_mut()?;
        let bytes = read_exact_bytes(stream, n)?;
        debug!(len = n, "tcp read");
        Ok(bytes)
    }

    fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
