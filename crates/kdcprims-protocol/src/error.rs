use kdcprims_frame::FrameError;
use kdcprims_transport::TransportError;

/// Errors returned by controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The channel argument is not one the controller exposes.
    #[error("KDC101 only supports channel 1 (got {0})")]
    ChannelNotSupported(u8),

    /// Stage or motor label missing from the calibration table.
    #[error("unsupported stage or motor: {0}")]
    UnsupportedStageOrMotor(String),

    /// A data reply was shorter than its fixed layout requires.
    #[error("response to 0x{command:04X} too short ({actual} bytes, expected at least {expected})")]
    ResponseTooShort {
        command: u16,
        expected: usize,
        actual: usize,
    },

    /// A data reply declared a zero-length payload.
    #[error("invalid data length: {0}")]
    InvalidDataLength(u16),

    /// Outgoing payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The transport returned fewer bytes than requested.
    #[error("truncated read ({actual} bytes, expected {expected})")]
    Truncated { expected: usize, actual: usize },

    /// A status condition was not reached in time.
    #[error("status condition not reached within {0:?}")]
    WaitTimeout(std::time::Duration),

    /// Transport failure, propagated unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl From<FrameError> for ControllerError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::InvalidDataLength(len) => Self::InvalidDataLength(len),
            FrameError::PayloadTooLarge { size, max } => Self::PayloadTooLarge { size, max },
            FrameError::Truncated { expected, actual } => Self::Truncated { expected, actual },
            FrameError::Transport(err) => Self::Transport(err),
        }
    }
}

impl ControllerError {
    /// Returns true for transport timeouts and expired status waits.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_timeout(),
            Self::WaitTimeout(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_errors_are_lifted() {
        let err: ControllerError = FrameError::InvalidDataLength(0).into();
        assert!(matches!(err, ControllerError::InvalidDataLength(0)));

        let err: ControllerError = FrameError::Transport(TransportError::NotConnected).into();
        assert!(matches!(
            err,
            ControllerError::Transport(TransportError::NotConnected)
        ));
    }

    #[test]
    fn timeout_detection() {
        let io = std::io::Error::from(std::io::ErrorKind::TimedOut);
        let err = ControllerError::Transport(TransportError::Io(io));
        assert!(err.is_timeout());
        assert!(!ControllerError::ChannelNotSupported(2).is_timeout());
    }

    #[test]
    fn channel_message() {
        let msg = ControllerError::ChannelNotSupported(3).to_string();
        assert!(msg.contains("channel 1"));
        assert!(msg.contains('3'));
    }
}
