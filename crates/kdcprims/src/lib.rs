//! Thorlabs KDC101 motor controller access over the APT binary protocol.
//!
//! kdcprims drives a single-channel DC servo controller over a byte stream:
//! message framing, the command catalog, calibration and unit conversion.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte-stream transports (serial port, TCP bridge, mock)
//! - [`frame`]: APT header-only and data message framing
//! - [`protocol`]: calibration, unit conversion, status decoding and the
//!   [`Controller`] command catalog
//!
//! ```no_run
//! use kdcprims::{Controller, MotorType, StageType};
//! use kdcprims::transport::{SerialConfig, SerialTransport};
//!
//! let transport = SerialTransport::new(SerialConfig::new("/dev/ttyUSB0"));
//! let mut ctl = Controller::new(transport, StageType::Mts25Z8, MotorType::Brushed);
//! ctl.connect()?;
//! ctl.enable(1, true)?;
//! ctl.move_absolute_position(1, 10.0)?;
//! # Ok::<(), kdcprims::ControllerError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use kdcprims_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use kdcprims_frame::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use kdcprims_protocol::*;
}

pub use kdcprims_protocol::{
    Calibration, Controller, ControllerError, DcStatusUpdate, DcStatusUpdateSi, Direction,
    HwInformation, JogParameters, MotorType, StageType, StatusFlags, StopMode, TransactionConfig,
    UnitConverter, VelocityProfile,
};
