use kdcprims_transport::Transport;
use tracing::trace;

use crate::codec::{decode_data_header, decode_header, header_bytes, DataMessage, HeaderMessage, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Read one header-only message (exactly six bytes).
pub fn read_header<T: Transport + ?Sized>(transport: &mut T) -> Result<HeaderMessage> {
    let raw = read_header_bytes(transport)?;
    let msg = decode_header(&raw);
    trace!(command = format_args!("0x{:04X}", msg.command), bytes = ?raw, "rx header");
    Ok(msg)
}

/// Read one data message: a six-byte header, then its payload.
///
/// A zero length field fails with [`FrameError::InvalidDataLength`] before
/// any payload read is attempted.
pub fn read_data<T: Transport + ?Sized>(transport: &mut T) -> Result<DataMessage> {
    let raw = read_header_bytes(transport)?;
    let header = decode_data_header(&raw)?;

    let expected = usize::from(header.data_length);
    let payload = transport.read(expected)?;
    if payload.len() != expected {
        return Err(FrameError::Truncated {
            expected,
            actual: payload.len(),
        });
    }
    trace!(
        command = format_args!("0x{:04X}", header.command),
        len = expected,
        payload = ?payload.as_ref(),
        "rx data"
    );

    Ok(DataMessage {
        command: header.command,
        destination: header.destination,
        source: header.source,
        payload,
    })
}

fn read_header_bytes<T: Transport + ?Sized>(transport: &mut T) -> Result<[u8; HEADER_SIZE]> {
    let bytes = transport.read(HEADER_SIZE)?;
    header_bytes(&bytes).ok_or(FrameError::Truncated {
        expected: HEADER_SIZE,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use kdcprims_transport::MockTransport;

    use super::*;
    use crate::codec::Endpoint;

    #[test]
    fn test_read_header_reply() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x12, 0x02, 0x01, 0x01, 0x01, 0x50]);

        let msg = read_header(&mut mock).unwrap();
        assert_eq!(msg.command, 0x0212);
        assert_eq!(msg.param1, 0x01);
        assert_eq!(msg.param2, 0x01);
        assert_eq!(msg.destination, Endpoint::HOST);
        assert_eq!(msg.source, Endpoint::GENERIC_UNIT);
        assert_eq!(mock.read_requests(), &[6]);
    }

    #[test]
    fn test_read_data_two_reads() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x54, 0x04, 0x06, 0x00, 0x81, 0x50]);
        mock.push_reply(&[0x01, 0x00, 0xCE, 0x45, 0x05, 0x00]);

        let msg = read_data(&mut mock).unwrap();
        assert_eq!(msg.command, 0x0454);
        assert_eq!(msg.destination, Endpoint::HOST);
        assert_eq!(msg.payload.as_ref(), &[0x01, 0x00, 0xCE, 0x45, 0x05, 0x00]);
        assert_eq!(mock.read_requests(), &[6, 6]);
    }

    #[test]
    fn test_read_data_zero_length_skips_payload_read() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x91, 0x04, 0x00, 0x00, 0x81, 0x50]);

        let err = read_data(&mut mock).unwrap_err();
        assert!(matches!(err, FrameError::InvalidDataLength(0)));
        assert_eq!(mock.read_requests(), &[6]);
    }

    #[test]
    fn test_read_data_missing_payload_is_transport_error() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x91, 0x04, 0x0E, 0x00, 0x81, 0x50, 0x01, 0x00]);

        let err = read_data(&mut mock).unwrap_err();
        match err {
            FrameError::Transport(inner) => assert!(inner.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_header_not_connected() {
        let mut mock = MockTransport::new();
        let err = read_header(&mut mock).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(kdcprims_transport::TransportError::NotConnected)
        ));
    }
}
