//! Velocity profile and jog parameter setpoints.

use bytes::{Buf, BufMut};
use kdcprims_frame::DataMessage;
use kdcprims_transport::Transport;
use serde::Serialize;

use crate::commands::{
    MOT_GET_JOGPARAMS, MOT_GET_VELPARAMS, MOT_REQ_JOGPARAMS, MOT_REQ_VELPARAMS, MOT_SET_JOGPARAMS,
    MOT_SET_VELPARAMS,
};
use crate::controller::{channel_payload, check_channel, require_len, Controller};
use crate::error::Result;

/// Minimum payload of a velocity profile reply.
pub const VELOCITY_REPLY_LEN: usize = 14;

/// Minimum payload of a jog parameters reply.
pub const JOG_REPLY_LEN: usize = 22;

/// Trapezoidal velocity profile in physical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VelocityProfile {
    /// mm/s
    pub min_velocity: f64,
    /// mm/s²
    pub acceleration: f64,
    /// mm/s
    pub max_velocity: f64,
}

/// Jog behaviour in physical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JogParameters {
    /// 1 = continuous, 2 = single step.
    pub mode: u16,
    /// mm per step.
    pub step_size: f64,
    pub min_velocity: f64,
    pub acceleration: f64,
    pub max_velocity: f64,
    /// 1 = abrupt, 2 = profiled.
    pub stop_mode: u16,
}

impl<T: Transport> Controller<T> {
    pub fn set_trapezoidal_velocity(&mut self, channel: u8, profile: VelocityProfile) -> Result<()> {
        check_channel(channel)?;
        let conv = self.converter();
        let min = conv.velocity_to_counts(profile.min_velocity);
        let accel = conv.acceleration_to_counts(profile.acceleration);
        let max = conv.velocity_to_counts(profile.max_velocity);

        let mut payload = channel_payload(channel, 12);
        payload.put_u32_le(min);
        payload.put_u32_le(accel);
        payload.put_u32_le(max);
        self.engine_mut()
            .write_data(&DataMessage::new(MOT_SET_VELPARAMS, payload.freeze()))
    }

    pub fn get_trapezoidal_velocity(&mut self, channel: u8) -> Result<VelocityProfile> {
        let payload = self.request_payload(MOT_REQ_VELPARAMS, MOT_GET_VELPARAMS, channel)?;
        require_len(MOT_GET_VELPARAMS, &payload, VELOCITY_REPLY_LEN)?;

        let mut buf = &payload[2..VELOCITY_REPLY_LEN];
        let min = buf.get_u32_le();
        let accel = buf.get_u32_le();
        let max = buf.get_u32_le();

        let conv = self.converter();
        Ok(VelocityProfile {
            min_velocity: conv.counts_to_velocity(min),
            acceleration: conv.counts_to_acceleration(accel),
            max_velocity: conv.counts_to_velocity(max),
        })
    }

    pub fn set_jog_parameters(&mut self, channel: u8, params: JogParameters) -> Result<()> {
        check_channel(channel)?;
        let conv = self.converter();
        let step = conv.position_to_counts(params.step_size);
        let min = conv.velocity_to_counts(params.min_velocity);
        let accel = conv.acceleration_to_counts(params.acceleration);
        let max = conv.velocity_to_counts(params.max_velocity);

        let mut payload = channel_payload(channel, 20);
        payload.put_u16_le(params.mode);
        payload.put_i32_le(step);
        payload.put_u32_le(min);
        payload.put_u32_le(accel);
        payload.put_u32_le(max);
        payload.put_u16_le(params.stop_mode);
        self.engine_mut()
            .write_data(&DataMessage::new(MOT_SET_JOGPARAMS, payload.freeze()))
    }

    pub fn get_jog_parameters(&mut self, channel: u8) -> Result<JogParameters> {
        let payload = self.request_payload(MOT_REQ_JOGPARAMS, MOT_GET_JOGPARAMS, channel)?;
        require_len(MOT_GET_JOGPARAMS, &payload, JOG_REPLY_LEN)?;

        let mut buf = &payload[2..JOG_REPLY_LEN];
        let mode = buf.get_u16_le();
        let step = buf.get_i32_le();
        let min = buf.get_u32_le();
        let accel = buf.get_u32_le();
        let max = buf.get_u32_le();
        let stop_mode = buf.get_u16_le();

        let conv = self.converter();
        Ok(JogParameters {
            mode,
            step_size: conv.counts_to_position(step),
            min_velocity: conv.counts_to_velocity(min),
            acceleration: conv.counts_to_acceleration(accel),
            max_velocity: conv.counts_to_velocity(max),
            stop_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use kdcprims_transport::MockTransport;

    use super::*;
    use crate::calibration::{Calibration, MotorType, StageType};
    use crate::error::ControllerError;
    use crate::transaction::TransactionConfig;

    fn controller(mock: MockTransport) -> Controller<MockTransport> {
        Controller::with_config(
            mock,
            Calibration::new(StageType::Mts25Z8, MotorType::Brushed),
            TransactionConfig::immediate(),
        )
    }

    #[test]
    fn set_velocity_payload_layout() {
        let mut ctl = controller(MockTransport::connected());
        let profile = VelocityProfile {
            min_velocity: 0.0,
            acceleration: 1.5,
            max_velocity: 2.0,
        };
        ctl.set_trapezoidal_velocity(1, profile).unwrap();

        let conv = *ctl.converter();
        let written = &ctl.transport().written()[0];
        assert_eq!(&written[..8], &[0x13, 0x04, 0x0E, 0x00, 0xD0, 0x01, 0x01, 0x00]);
        assert_eq!(&written[8..12], &0u32.to_le_bytes());
        assert_eq!(
            &written[12..16],
            &conv.acceleration_to_counts(1.5).to_le_bytes()
        );
        assert_eq!(&written[16..20], &conv.velocity_to_counts(2.0).to_le_bytes());
    }

    #[test]
    fn get_velocity_decodes_counts() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x15, 0x04, 0x0E, 0x00, 0x81, 0x50]);
        let mut payload = vec![0x01, 0x00];
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&4_506u32.to_le_bytes());
        payload.extend_from_slice(&1_717_986u32.to_le_bytes());
        mock.push_reply(&payload);
        let mut ctl = controller(mock);

        let profile = ctl.get_trapezoidal_velocity(1).unwrap();
        let conv = *ctl.converter();
        assert_eq!(profile.min_velocity, 0.0);
        assert_eq!(profile.acceleration, conv.counts_to_acceleration(4_506));
        assert_eq!(profile.max_velocity, conv.counts_to_velocity(1_717_986));
        assert!((profile.max_velocity - 2.22).abs() < 0.01);
        assert_eq!(
            ctl.transport().written(),
            &[vec![0x14u8, 0x04, 0x01, 0x00, 0x50, 0x01]]
        );
    }

    #[test]
    fn get_velocity_too_short() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x15, 0x04, 0x0A, 0x00, 0x81, 0x50]);
        mock.push_reply(&[0u8; 10]);
        let mut ctl = controller(mock);

        let err = ctl.get_trapezoidal_velocity(1).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::ResponseTooShort {
                expected: 14,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn jog_parameters_layout_and_decode() {
        let params = JogParameters {
            mode: 2,
            step_size: 0.5,
            min_velocity: 0.0,
            acceleration: 1.0,
            max_velocity: 1.0,
            stop_mode: 2,
        };

        let mut ctl = controller(MockTransport::connected());
        ctl.set_jog_parameters(1, params).unwrap();
        let written = ctl.transport().written()[0].clone();
        assert_eq!(written.len(), 6 + 22);
        assert_eq!(&written[..8], &[0x16, 0x04, 0x16, 0x00, 0xD0, 0x01, 0x01, 0x00]);
        assert_eq!(&written[8..10], &2u16.to_le_bytes());
        assert_eq!(&written[10..14], &17_277i32.to_le_bytes());
        assert_eq!(&written[26..28], &2u16.to_le_bytes());

        // Echo the same payload back as a reply.
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x18, 0x04, 0x16, 0x00, 0x81, 0x50]);
        mock.push_reply(&written[6..]);
        let mut ctl = controller(mock);
        let decoded = ctl.get_jog_parameters(1).unwrap();

        let conv = *ctl.converter();
        assert_eq!(decoded.mode, 2);
        assert_eq!(decoded.stop_mode, 2);
        assert!((decoded.step_size - 0.5).abs() <= conv.counts_to_position(1));
        assert!((decoded.max_velocity - 1.0).abs() <= conv.counts_to_velocity(1));
        assert!((decoded.acceleration - 1.0).abs() <= conv.counts_to_acceleration(1));
    }

    #[test]
    fn get_jog_too_short() {
        let mut mock = MockTransport::connected();
        mock.push_reply(&[0x18, 0x04, 0x14, 0x00, 0x81, 0x50]);
        mock.push_reply(&[0u8; 20]);
        let mut ctl = controller(mock);

        let err = ctl.get_jog_parameters(1).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::ResponseTooShort {
                expected: 22,
                actual: 20,
                ..
            }
        ));
    }
}
