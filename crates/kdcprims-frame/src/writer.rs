use bytes::BytesMut;
use kdcprims_transport::Transport;
use tracing::trace;

use crate::codec::{encode_data, encode_header, DataMessage, HeaderMessage, HEADER_SIZE};
use crate::error::Result;

/// Encode and send a header-only message in a single write.
pub fn write_header<T: Transport + ?Sized>(transport: &mut T, msg: &HeaderMessage) -> Result<()> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE);
    encode_header(msg, &mut buf);
    trace!(command = format_args!("0x{:04X}", msg.command), bytes = ?buf.as_ref(), "tx header");
    transport.write(&buf)?;
    Ok(())
}

/// Encode and send a data message (header and payload) in a single write.
pub fn write_data<T: Transport + ?Sized>(transport: &mut T, msg: &DataMessage) -> Result<()> {
    let mut buf = BytesMut::with_capacity(msg.wire_size());
    encode_data(msg, &mut buf)?;
    trace!(
        command = format_args!("0x{:04X}", msg.command),
        len = msg.data_length(),
        bytes = ?buf.as_ref(),
        "tx data"
    );
    transport.write(&buf)?;
    Ok(())
}
