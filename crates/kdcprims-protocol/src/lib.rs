//! KDC101 command catalog over the Thorlabs APT protocol.
//!
//! [`Controller`] is the public surface: one method per device operation,
//! each validating the channel, converting physical units to encoder counts
//! through the resolved [`Calibration`], and running a single request through
//! the [`TransactionEngine`].
//!
//! ```
//! use kdcprims_protocol::{Controller, MotorType, StageType, TransactionConfig, Calibration};
//! use kdcprims_transport::MockTransport;
//!
//! let calibration = Calibration::new(StageType::Mts25Z8, MotorType::Brushed);
//! let mut ctl = Controller::with_config(
//!     MockTransport::connected(),
//!     calibration,
//!     TransactionConfig::immediate(),
//! );
//! ctl.move_absolute_position(1, 10.0).unwrap();
//!
//! let frame = &ctl.transport().written()[0];
//! assert_eq!(&frame[..6], &[0x53, 0x04, 0x06, 0x00, 0xD0, 0x01]);
//! assert!(ctl.move_absolute_position(2, 10.0).is_err());
//! ```

pub mod calibration;
pub mod commands;
pub mod controller;
pub mod error;
pub mod monitor;
pub mod params;
pub mod status;
pub mod transaction;
pub mod units;

pub use calibration::{Calibration, MotorType, StageType, DC_SERVO_TIME_FACTOR};
pub use commands::{command_name, Direction, StopMode};
pub use controller::{Controller, HwInformation};
pub use error::{ControllerError, Result};
pub use monitor::{DcStatusUpdate, DcStatusUpdateSi};
pub use params::{JogParameters, VelocityProfile};
pub use status::StatusFlags;
pub use transaction::{TransactionConfig, TransactionEngine};
pub use units::UnitConverter;
