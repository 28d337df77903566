use kdcprims_transport::TransportError;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A data message declared a payload length below one byte.
    #[error("invalid data length: {0}")]
    InvalidDataLength(u16),

    /// The payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The transport returned fewer bytes than were requested.
    #[error("truncated read ({actual} bytes, expected {expected})")]
    Truncated { expected: usize, actual: usize },

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
