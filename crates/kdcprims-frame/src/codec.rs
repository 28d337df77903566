use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Every message starts with a 6-byte header.
pub const HEADER_SIZE: usize = 6;

/// Set in the destination byte of data-bearing messages.
pub const DATA_FLAG: u8 = 0x80;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Source/destination address byte.
///
/// Decoding is total: any byte is a valid endpoint, the named constants are
/// the ones this protocol addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(pub u8);

impl Endpoint {
    /// The controlling PC.
    pub const HOST: Endpoint = Endpoint(0x01);
    /// Motherboard of a rack unit.
    pub const RACK: Endpoint = Endpoint(0x02);
    /// A stand-alone controller such as the KDC101.
    pub const GENERIC_UNIT: Endpoint = Endpoint(0x50);

    /// Human-readable name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::HOST => "host",
            Self::RACK => "rack",
            Self::GENERIC_UNIT => "generic-unit",
            _ => "unknown",
        }
    }
}

impl From<u8> for Endpoint {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Endpoint> for u8 {
    fn from(value: Endpoint) -> Self {
        value.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), self.0)
    }
}

/// A 6-byte command with two parameter bytes and no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMessage {
    pub command: u16,
    pub param1: u8,
    pub param2: u8,
    pub destination: Endpoint,
    pub source: Endpoint,
}

impl HeaderMessage {
    /// A host-to-controller header message.
    pub fn new(command: u16, param1: u8, param2: u8) -> Self {
        Self {
            command,
            param1,
            param2,
            destination: Endpoint::GENERIC_UNIT,
            source: Endpoint::HOST,
        }
    }
}

/// A 6-byte length-prefixed header followed by a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMessage {
    pub command: u16,
    pub destination: Endpoint,
    pub source: Endpoint,
    pub payload: Bytes,
}

impl DataMessage {
    /// A host-to-controller data message.
    pub fn new(command: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            destination: Endpoint::GENERIC_UNIT,
            source: Endpoint::HOST,
            payload: payload.into(),
        }
    }

    /// Payload length as carried in the header.
    pub fn data_length(&self) -> usize {
        self.payload.len()
    }

    /// The total wire size of this message (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Header fields of a data message, before its payload has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    pub command: u16,
    pub data_length: u16,
    pub destination: Endpoint,
    pub source: Endpoint,
}

/// Encode a header-only message.
///
/// Wire format:
/// ```text
/// ┌──────────────┬────────┬────────┬──────┬─────┐
/// │ Command (2B) │ Param1 │ Param2 │ Dest │ Src │
/// │ LE           │        │        │      │     │
/// └──────────────┴────────┴────────┴──────┴─────┘
/// ```
pub fn encode_header(msg: &HeaderMessage, dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE);
    dst.put_u16_le(msg.command);
    dst.put_u8(msg.param1);
    dst.put_u8(msg.param2);
    dst.put_u8(msg.destination.0);
    dst.put_u8(msg.source.0);
}

/// Encode a data message.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────────┬───────────┬─────┬──────────────────┐
/// │ Command (2B) │ Length (2B) │ Dest|0x80 │ Src │ Payload          │
/// │ LE           │ LE          │           │     │ (Length bytes)   │
/// └──────────────┴─────────────┴───────────┴─────┴──────────────────┘
/// ```
pub fn encode_data(msg: &DataMessage, dst: &mut BytesMut) -> Result<()> {
    let len = u16::try_from(msg.payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: msg.payload.len(),
        max: MAX_PAYLOAD,
    })?;
    dst.reserve(msg.wire_size());
    dst.put_u16_le(msg.command);
    dst.put_u16_le(len);
    dst.put_u8(msg.destination.0 | DATA_FLAG);
    dst.put_u8(msg.source.0);
    dst.put_slice(&msg.payload);
    Ok(())
}

/// Decode the six header bytes of a header-only message.
pub fn decode_header(src: &[u8; HEADER_SIZE]) -> HeaderMessage {
    let mut buf = &src[..];
    HeaderMessage {
        command: buf.get_u16_le(),
        param1: buf.get_u8(),
        param2: buf.get_u8(),
        destination: Endpoint(buf.get_u8()),
        source: Endpoint(buf.get_u8()),
    }
}

/// Decode the six header bytes of a data message.
///
/// Fails with [`FrameError::InvalidDataLength`] when the length field is zero.
pub fn decode_data_header(src: &[u8; HEADER_SIZE]) -> Result<DataHeader> {
    let mut buf = &src[..];
    let header = DataHeader {
        command: buf.get_u16_le(),
        data_length: buf.get_u16_le(),
        destination: Endpoint(buf.get_u8() & !DATA_FLAG),
        source: Endpoint(buf.get_u8()),
    };
    if header.data_length < 1 {
        return Err(FrameError::InvalidDataLength(header.data_length));
    }
    Ok(header)
}

/// Decode a data message from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete message yet.
/// An invalid length is reported as soon as the header is available.
/// On success, consumes the message bytes from the buffer.
pub fn decode_data(src: &mut BytesMut) -> Result<Option<DataMessage>> {
    let Some(raw) = header_bytes(src) else {
        return Ok(None); // Need more data
    };
    let header = decode_data_header(&raw)?;

    let total = HEADER_SIZE + usize::from(header.data_length);
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(usize::from(header.data_length)).freeze();

    Ok(Some(DataMessage {
        command: header.command,
        destination: header.destination,
        source: header.source,
        payload,
    }))
}

/// Copy the first six bytes of `src`, if present.
pub(crate) fn header_bytes(src: &[u8]) -> Option<[u8; HEADER_SIZE]> {
    src.get(..HEADER_SIZE)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_header_layout() {
        let mut buf = BytesMut::new();
        encode_header(&HeaderMessage::new(0x0223, 0x01, 0x00), &mut buf);
        assert_eq!(buf.as_ref(), &[0x23, 0x02, 0x01, 0x00, 0x50, 0x01]);
    }

    #[test]
    fn test_header_decode_reproduces_fields() {
        let msg = HeaderMessage {
            command: 0x0465,
            param1: 0x01,
            param2: 0x02,
            destination: Endpoint::RACK,
            source: Endpoint(0x11),
        };
        let mut buf = BytesMut::new();
        encode_header(&msg, &mut buf);

        let raw = header_bytes(&buf).unwrap();
        assert_eq!(decode_header(&raw), msg);
    }

    #[test]
    fn test_encode_data_sets_flag_and_length() {
        let msg = DataMessage::new(0x0453, vec![0x01, 0x00, 0xCE, 0x45, 0x05, 0x00]);
        let mut buf = BytesMut::new();
        encode_data(&msg, &mut buf).unwrap();

        assert_eq!(
            buf.as_ref(),
            &[0x53, 0x04, 0x06, 0x00, 0xD0, 0x01, 0x01, 0x00, 0xCE, 0x45, 0x05, 0x00]
        );
        assert_eq!(buf.len(), msg.wire_size());
    }

    #[test]
    fn test_data_decode_masks_flag_and_keeps_payload() {
        let msg = DataMessage {
            command: 0x0491,
            destination: Endpoint::HOST,
            source: Endpoint::GENERIC_UNIT,
            payload: Bytes::from_static(&[0xAA, 0x00, 0xFF, 0x80]),
        };
        let mut buf = BytesMut::new();
        encode_data(&msg, &mut buf).unwrap();
        assert_eq!(buf[4], 0x81);

        let decoded = decode_data(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, msg);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_data_incomplete_header() {
        let mut buf = BytesMut::from(&[0x53, 0x04, 0x06][..]);
        assert!(decode_data(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_decode_data_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_data(&DataMessage::new(0x0452, vec![1u8, 0, 2, 3, 4, 5]), &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 2);

        assert!(decode_data(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_data_zero_length() {
        let mut buf = BytesMut::from(&[0x91, 0x04, 0x00, 0x00, 0x81, 0x50][..]);
        let result = decode_data(&mut buf);
        assert!(matches!(result, Err(FrameError::InvalidDataLength(0))));
    }

    #[test]
    fn test_encode_data_rejects_oversized_payload() {
        let msg = DataMessage::new(0x0413, vec![0u8; MAX_PAYLOAD + 1]);
        let mut buf = BytesMut::new();
        let result = encode_data(&msg, &mut buf);
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_back_to_back_messages() {
        let mut buf = BytesMut::new();
        encode_data(&DataMessage::new(0x0413, vec![1u8, 0]), &mut buf).unwrap();
        encode_data(&DataMessage::new(0x0416, vec![1u8, 0, 9]), &mut buf).unwrap();

        let first = decode_data(&mut buf).unwrap().unwrap();
        let second = decode_data(&mut buf).unwrap().unwrap();
        assert_eq!(first.command, 0x0413);
        assert_eq!(second.command, 0x0416);
        assert_eq!(second.payload.as_ref(), &[1, 0, 9]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_endpoint_names() {
        assert_eq!(Endpoint::GENERIC_UNIT.name(), "generic-unit");
        assert_eq!(Endpoint(0x7F).name(), "unknown");
        assert_eq!(Endpoint::HOST.to_string(), "host(0x01)");
        assert_eq!(u8::from(Endpoint::RACK), 0x02);
    }
}
