//! APT message framing for KDC101 controllers.
//!
//! Two message shapes share a 6-byte header:
//! - header-only: command, two parameter bytes, destination, source
//! - data: command, a 2-byte little-endian payload length, destination with
//!   bit 7 set, source, then the payload
//!
//! All multi-byte fields are little-endian. The reader and writer work over any
//! [`kdcprims_transport::Transport`] and never split a message across writes.

pub mod channel;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use channel::{channel_mask, channel_prefix, is_supported, CHANNEL_PREFIX_SIZE, SUPPORTED_CHANNEL};
pub use codec::{
    decode_data, decode_data_header, decode_header, encode_data, encode_header, DataHeader,
    DataMessage, Endpoint, HeaderMessage, DATA_FLAG, HEADER_SIZE, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use reader::{read_data, read_header};
pub use writer::{write_data, write_header};
