use std::io::{ErrorKind, Read, Write};

use bytes::Bytes;

use crate::error::{Result, TransportError};

/// A blocking byte-stream link to a single controller.
///
/// This is the only capability the protocol core consumes. Implementations
/// own the underlying handle: it is acquired by [`connect`](Transport::connect)
/// and released by [`disconnect`](Transport::disconnect).
pub trait Transport {
    /// Open the underlying byte stream.
    fn connect(&mut self) -> Result<()>;

    /// Close the underlying byte stream. Disconnecting an already closed
    /// transport is not an error.
    fn disconnect(&mut self) -> Result<()>;

    /// Whether the stream is currently open.
    fn is_connected(&self) -> bool;

    /// Write all of `bytes` (blocking).
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read exactly `n` bytes (blocking), or fail on timeout/EOF/I/O error.
    fn read(&mut self, n: usize) -> Result<Bytes>;

    /// Transport name for diagnostics.
    fn transport_name(&self) -> &'static str;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        (**self).read(n)
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        (**self).read(n)
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

/// Write a full buffer to a blocking stream and flush it.
///
/// Interrupted writes are retried; a zero-length write means the peer closed
/// the stream.
pub(crate) fn write_all_flush<W: Write + ?Sized>(inner: &mut W, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match inner.write(&bytes[offset..]) {
            Ok(0) => {
                return Err(TransportError::Io(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "stream closed during write",
                )))
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }

    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}

/// Read exactly `n` bytes from a blocking stream.
///
/// The stream's own read timeout bounds each underlying read. EOF before `n`
/// bytes surfaces as `UnexpectedEof`.
pub(crate) fn read_exact_bytes<R: Read + ?Sized>(inner: &mut R, n: usize) -> Result<Bytes> {
    let mut buf = vec![0u8; n];
    let mut filled = 0usize;
    while filled < n {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(TransportError::Io(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("stream closed after {filled} of {n} bytes"),
                )))
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(Bytes::from(buf))
}
