//! Blocking byte-stream transports for KDC101 motor controllers.
//!
//! The protocol core consumes a single capability, the [`Transport`] trait:
//! connect, disconnect, write a buffer, read exactly `n` bytes. This crate
//! provides the trait and its implementations:
//! - [`SerialTransport`]: USB virtual COM port (requires `serial` feature)
//! - [`TcpTransport`]: serial-over-TCP bridge
//! - [`MockTransport`]: scripted in-memory double for tests
//!
//! This is the lowest layer of kdcprims. Everything else builds on top of it.

use std::time::Duration;

pub mod error;
pub mod mock;
pub mod tcp;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use mock::MockTransport;
pub use tcp::{TcpConfig, TcpTransport};
pub use traits::Transport;

#[cfg(feature = "serial")]
pub use serial::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};

/// Default per-operation read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
