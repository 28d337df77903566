//! Scripted in-memory transport for exercising the protocol without hardware.
//!
//! Replies are queued up front with [`MockTransport::push_reply`]; every
//! write and every read request is recorded so tests can assert on the exact
//! wire traffic, including the absence of it.
//!
//! ```
//! use kdcprims_transport::{MockTransport, Transport};
//!
//! let mut mock = MockTransport::connected();
//! mock.push_reply(&[0x12, 0x02, 0x01, 0x01, 0x01, 0x50]);
//!
//! mock.write(&[0x11, 0x02, 0x01, 0x00, 0x50, 0x01]).unwrap();
//! let reply = mock.read(6).unwrap();
//! assert_eq!(reply[3], 0x01);
//! assert_eq!(mock.written().len(), 1);
//! ```

use std::io::ErrorKind;

use bytes::{Bytes, BytesMut};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// A [`Transport`] test double with scripted replies and recorded traffic.
///
/// Reads are served from a single queue of reply bytes. A read that asks for
/// more bytes than are queued fails with a `TimedOut` I/O error, which is how
/// a real port reports a device that never answered.
#[derive(Debug, Default)]
pub struct MockTransport {
    connected: bool,
    rx: BytesMut,
    writes: Vec<Vec<u8>>,
    read_requests: Vec<usize>,
    connect_error: Option<ErrorKind>,
    write_error: Option<ErrorKind>,
    connect_calls: usize,
    disconnect_calls: usize,
}

impl MockTransport {
    /// Create a disconnected mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that is already connected.
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Queue bytes to be returned by subsequent reads.
    pub fn push_reply(&mut self, bytes: &[u8]) {
        self.rx.extend_from_slice(bytes);
    }

    /// Make the next `connect` fail with the given I/O error kind.
    pub fn fail_next_connect(&mut self, kind: ErrorKind) {
        self.connect_error = Some(kind);
    }

    /// Make the next `write` fail with the given I/O error kind.
    pub fn fail_next_write(&mut self, kind: ErrorKind) {
        self.write_error = Some(kind);
    }

    /// Every buffer passed to `write`, in order.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// The byte count of every `read` request, in order.
    pub fn read_requests(&self) -> &[usize] {
        &self.read_requests
    }

    /// Total number of write and read calls observed.
    pub fn io_count(&self) -> usize {
        self.writes.len() + self.read_requests.len()
    }

    /// Number of queued reply bytes not yet consumed.
    pub fn pending_reply_bytes(&self) -> usize {
        self.rx.len()
    }

    /// Number of `connect` calls observed.
    pub fn connect_calls(&self) -> usize {
        self.connect_calls
    }

    /// Number of `disconnect` calls observed.
    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls
    }

    /// Forget recorded traffic while keeping queued replies.
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.read_requests.clear();
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> Result<()> {
        self.connect_calls += 1;
        if let Some(kind) = self.connect_error.take() {
            return Err(TransportError::Connect {
                addr: "mock".to_string(),
                source: std::io::Error::from(kind),
            });
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.disconnect_calls += 1;
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.writes.push(bytes.to_vec());
        if let Some(kind) = self.write_error.take() {
            return Err(TransportError::Io(std::io::Error::from(kind)));
        }
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.read_requests.push(n);
        if self.rx.len() < n {
            return Err(TransportError::Io(std::io::Error::new(
                ErrorKind::TimedOut,
                format!("wanted {n} bytes, {} queued", self.rx.len()),
            )));
        }
        Ok(self.rx.split_to(n).freeze())
    }

    fn transport_name(&self) -> &'static str {
        "mock"
    }
}
