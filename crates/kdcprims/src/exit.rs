use std::fmt;
use std::io;

use kdcprims_protocol::ControllerError;
use kdcprims_transport::TransportError;

// Process exit codes, shared with the sysexits-style conventions of other tools.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DEVICE_ERROR: i32 = 40;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => TRANSPORT_ERROR,
        io::ErrorKind::UnexpectedEof => DEVICE_ERROR,
        io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        other => {
            let code = match &other {
                TransportError::Open { source, .. } | TransportError::Connect { source, .. }
                    if source.kind() == io::ErrorKind::PermissionDenied =>
                {
                    PERMISSION_DENIED
                }
                _ => TRANSPORT_ERROR,
            };
            CliError::new(code, format!("{context}: {other}"))
        }
    }
}

pub fn controller_error(context: &str, err: ControllerError) -> CliError {
    match err {
        ControllerError::Transport(err) => transport_error(context, err),
        ControllerError::ChannelNotSupported(_) | ControllerError::UnsupportedStageOrMotor(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        ControllerError::ResponseTooShort { .. }
        | ControllerError::InvalidDataLength(_)
        | ControllerError::Truncated { .. } => {
            CliError::new(DEVICE_ERROR, format!("{context}: {err}"))
        }
        ControllerError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ControllerError::WaitTimeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
    }
}
