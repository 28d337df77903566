//! Write-then-read exchanges with fixed settle delays.
//!
//! The controller gives no "reply ready" signal, so each request waits a
//! fixed delay between the write and the first read. Exactly one exchange is
//! in flight at a time; the engine takes `&mut self` for every operation.

use std::thread;
use std::time::Duration;

use kdcprims_frame::{
    read_data, read_header, write_data, write_header, DataMessage, HeaderMessage,
};
use kdcprims_transport::Transport;
use tracing::debug;

use crate::commands::command_name;
use crate::error::Result;

/// Default wait before reading a header-only reply.
pub const DEFAULT_HEADER_SETTLE: Duration = Duration::from_millis(15);

/// Default wait before reading a data reply.
pub const DEFAULT_DATA_SETTLE: Duration = Duration::from_millis(50);

/// Settle delays applied between a request and its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionConfig {
    /// Wait before reading a header-only reply. Default: 15 ms.
    pub header_settle: Duration,
    /// Wait before reading a data reply. Default: 50 ms.
    pub data_settle: Duration,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            header_settle: DEFAULT_HEADER_SETTLE,
            data_settle: DEFAULT_DATA_SETTLE,
        }
    }
}

impl TransactionConfig {
    /// No settle delay at all. Useful against a scripted transport.
    pub fn immediate() -> Self {
        Self {
            header_settle: Duration::ZERO,
            data_settle: Duration::ZERO,
        }
    }
}

/// Drives request/reply exchanges over an owned transport.
#[derive(Debug)]
pub struct TransactionEngine<T> {
    transport: T,
    config: TransactionConfig,
}

impl<T: Transport> TransactionEngine<T> {
    /// Engine with the default settle delays.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, TransactionConfig::default())
    }

    pub fn with_config(transport: T, config: TransactionConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the engine and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a header-only message that expects no reply.
    pub fn write_header_only(&mut self, msg: &HeaderMessage) -> Result<()> {
        debug!(command = command_name(msg.command), "send header");
        write_header(&mut self.transport, msg)?;
        Ok(())
    }

    /// Send a data message that expects no reply.
    pub fn write_data(&mut self, msg: &DataMessage) -> Result<()> {
        debug!(
            command = command_name(msg.command),
            len = msg.data_length(),
            "send data"
        );
        write_data(&mut self.transport, msg)?;
        Ok(())
    }

    /// Send a header-only request and read a header-only reply.
    pub fn request_header_only(&mut self, msg: &HeaderMessage) -> Result<HeaderMessage> {
        self.write_header_only(msg)?;
        settle(self.config.header_settle);
        let reply = read_header(&mut self.transport)?;
        debug!(
            command = command_name(msg.command),
            reply = format_args!("0x{:04X}", reply.command),
            "header reply"
        );
        Ok(reply)
    }

    /// Send a header-only request and read a data reply.
    pub fn request_data(&mut self, msg: &HeaderMessage) -> Result<DataMessage> {
        self.write_header_only(msg)?;
        settle(self.config.data_settle);
        let reply = read_data(&mut self.transport)?;
        debug!(
            command = command_name(msg.command),
            reply = format_args!("0x{:04X}", reply.command),
            len = reply.data_length(),
            "data reply"
        );
        Ok(reply)
    }
}

fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use kdcprims_transport::{MockTransport, TransportError};

    use super::*;
    use crate::error::ControllerError;

    fn engine(mock: MockTransport) -> TransactionEngine<MockTransport> {
        TransactionEngine::with_config(mock, TransactionConfig::immediate())
    }

    #[test]
    fn default_delays() {
        let config = TransactionConfig::default();
        assert_eq!(config.header_settle, Duration::from_millis(15));
        assert_eq!(config.data_settle, Duration::from_millis(50));
    }

    #[test]
    fn header_request_writes_then_reads_six() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x12, 0x02, 0x01, 0x01, 0x01, 0x50]);
        let mut engine = engine(mock);

        let reply = engine
            .request_header_only(&HeaderMessage::new(0x0211, 0x01, 0x00))
            .unwrap();
        assert_eq!(reply.command, 0x0212);
        assert_eq!(reply.param2, 0x01);

        let mock = engine.into_inner();
        assert_eq!(mock.written(), &[vec![0x11u8, 0x02, 0x01, 0x00, 0x50, 0x01]]);
        assert_eq!(mock.read_requests(), &[6]);
    }

    #[test]
    fn data_request_reads_header_then_payload() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x52, 0x04, 0x06, 0x00, 0x81, 0x50]);
        mock.push_reply(&[0x01, 0x00, 0xCE, 0x45, 0x05, 0x00]);
        let mut engine = engine(mock);

        let reply = engine
            .request_data(&HeaderMessage::new(0x0451, 0x01, 0x00))
            .unwrap();
        assert_eq!(reply.command, 0x0452);
        assert_eq!(reply.payload.len(), 6);
        assert_eq!(engine.transport().read_requests(), &[6, 6]);
    }

    #[test]
    fn zero_length_reply_fails_before_second_read() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x91, 0x04, 0x00, 0x00, 0x81, 0x50]);
        let mut engine = engine(mock);

        let err = engine
            .request_data(&HeaderMessage::new(0x0490, 0x01, 0x00))
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidDataLength(0)));
        assert_eq!(engine.transport().read_requests(), &[6]);
    }

    #[test]
    fn write_failure_skips_read() {
        let mut mock = MockTransport::connected();
        mock.fail_next_write(std::io::ErrorKind::BrokenPipe);
        let mut engine = engine(mock);

        let err = engine
            .request_header_only(&HeaderMessage::new(0x0211, 0x01, 0x00))
            .unwrap_err();
        assert!(matches!(err, ControllerError::Transport(TransportError::Io(_))));
        assert!(engine.transport().read_requests().is_empty());
    }

    #[test]
    fn settle_delays_are_applied() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x12, 0x02, 0x01, 0x01, 0x01, 0x50]);
        mock.push_reply(&[0x91, 0x04, 0x01, 0x00, 0x81, 0x50, 0x01]);
        let mut engine = TransactionEngine::new(mock);

        let start = Instant::now();
        engine
            .request_header_only(&HeaderMessage::new(0x0211, 0x01, 0x00))
            .unwrap();
        assert!(start.elapsed() >= DEFAULT_HEADER_SETTLE);

        let start = Instant::now();
        engine
            .request_data(&HeaderMessage::new(0x0490, 0x01, 0x00))
            .unwrap();
        assert!(start.elapsed() >= DEFAULT_DATA_SETTLE);
    }

    #[test]
    fn fire_and_forget_never_reads() {
        let mut engine = engine(MockTransport::connected());
        engine
            .write_header_only(&HeaderMessage::new(0x0443, 0x01, 0x00))
            .unwrap();
        engine
            .write_data(&DataMessage::new(0x0450, vec![0x01u8, 0x00, 0, 0, 0, 0]))
            .unwrap();
        assert_eq!(engine.transport().written().len(), 2);
        assert!(engine.transport().read_requests().is_empty());
    }
}
