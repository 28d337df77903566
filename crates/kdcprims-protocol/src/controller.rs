use bytes::{Buf, BufMut, Bytes, BytesMut};
use kdcprims_frame::{
    channel_mask, channel_prefix, is_supported, DataMessage, HeaderMessage, CHANNEL_PREFIX_SIZE,
};
use kdcprims_transport::Transport;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calibration::{Calibration, MotorType, StageType};
use crate::commands::*;
use crate::error::{ControllerError, Result};
use crate::transaction::{TransactionConfig, TransactionEngine};
use crate::units::UnitConverter;

/// Minimum payload of a hardware information reply.
pub const HW_INFO_LEN: usize = 84;

/// Minimum payload of a move distance or position reply.
pub const DISTANCE_REPLY_LEN: usize = 6;

/// Identity block reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HwInformation {
    pub serial_number: i32,
    /// Model text with trailing NUL padding removed.
    pub model: String,
    pub hw_type: u16,
    /// Raw firmware bytes: minor, interim, major, unused.
    pub firmware_version: [u8; 4],
    pub hardware_version: u16,
    pub mod_state: u16,
    pub channel_count: u16,
}

impl HwInformation {
    /// Parse a hardware information payload (at least 84 bytes).
    pub fn parse(payload: &[u8]) -> Result<Self> {
        require_len(HW_GET_INFO, payload, HW_INFO_LEN)?;

        let mut head = &payload[..18];
        let serial_number = head.get_i32_le();
        let mut model = [0u8; 8];
        head.copy_to_slice(&mut model);
        let hw_type = head.get_u16_le();
        let mut firmware_version = [0u8; 4];
        head.copy_to_slice(&mut firmware_version);

        let mut tail = &payload[78..HW_INFO_LEN];
        Ok(Self {
            serial_number,
            model: String::from_utf8_lossy(&model)
                .trim_end_matches('\0')
                .to_string(),
            hw_type,
            firmware_version,
            hardware_version: tail.get_u16_le(),
            mod_state: tail.get_u16_le(),
            channel_count: tail.get_u16_le(),
        })
    }

    /// Firmware version as `major.interim.minor`.
    pub fn firmware_string(&self) -> String {
        let [minor, interim, major, _] = self.firmware_version;
        format!("{major}.{interim}.{minor}")
    }
}

/// A KDC101 single-channel DC servo controller.
///
/// Owns the transport (through a [`TransactionEngine`]) and an immutable
/// [`Calibration`]. Every operation that takes a channel rejects anything
/// other than channel 1 before touching the wire. Dropping a connected
/// controller disconnects it.
///
/// Calls block for write + settle delay + read and must not be interleaved
/// across threads; wrap the controller in a mutex if it is shared.
#[derive(Debug)]
pub struct Controller<T: Transport> {
    engine: TransactionEngine<T>,
    converter: UnitConverter,
}

impl<T: Transport> Controller<T> {
    /// Controller for a known stage and motor with default settle delays.
    pub fn new(transport: T, stage: StageType, motor: MotorType) -> Self {
        Self::with_config(
            transport,
            Calibration::new(stage, motor),
            TransactionConfig::default(),
        )
    }

    /// Controller for catalog labels such as `("MTS25-Z8", "Brushed")`.
    ///
    /// Fails fast with [`ControllerError::UnsupportedStageOrMotor`].
    pub fn from_labels(transport: T, stage: &str, motor: &str) -> Result<Self> {
        Ok(Self::with_config(
            transport,
            Calibration::lookup(stage, motor)?,
            TransactionConfig::default(),
        ))
    }

    pub fn with_config(transport: T, calibration: Calibration, config: TransactionConfig) -> Self {
        Self {
            engine: TransactionEngine::with_config(transport, config),
            converter: UnitConverter::new(calibration),
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        self.engine.transport_mut().connect()?;
        info!(
            transport = self.engine.transport().transport_name(),
            stage = %self.calibration().stage(),
            motor = %self.calibration().motor(),
            "controller connected"
        );
        Ok(())
    }

    pub fn disconnect(&mut self) -> Result<()> {
        self.engine.transport_mut().disconnect()?;
        info!(
            transport = self.engine.transport().transport_name(),
            "controller disconnected"
        );
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.engine.transport().is_connected()
    }

    pub fn calibration(&self) -> &Calibration {
        self.converter.calibration()
    }

    pub fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    pub fn transport(&self) -> &T {
        self.engine.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.engine.transport_mut()
    }

    /// Flash the front-panel LED.
    pub fn identify(&mut self, channel: u8) -> Result<()> {
        self.send_header(MOD_IDENTIFY, channel, 0x00)
    }

    /// Read serial number, model, firmware and hardware revision.
    pub fn get_hw_information(&mut self) -> Result<HwInformation> {
        let reply = self
            .engine
            .request_data(&HeaderMessage::new(HW_REQ_INFO, 0x00, 0x00))?;
        check_reply(HW_GET_INFO, reply.command);
        HwInformation::parse(&reply.payload)
    }

    /// Enable or disable the drive output of a channel.
    pub fn enable(&mut self, channel: u8, enable: bool) -> Result<()> {
        let state = if enable { ENABLE_ON } else { ENABLE_OFF };
        self.send_header(MOD_SET_ENABLE, channel, state)
    }

    pub fn is_enabled(&mut self, channel: u8) -> Result<bool> {
        let mask = check_channel(channel)?;
        let reply = self
            .engine
            .request_header_only(&HeaderMessage::new(MOD_REQ_CHANENABLESTATE, mask, 0x00))?;
        check_reply(MOD_GET_CHANENABLESTATE, reply.command);
        Ok(reply.param2 == ENABLE_ON)
    }

    /// Start a homing sequence. Completion is reported through the status word.
    pub fn start_home_move(&mut self, channel: u8) -> Result<()> {
        self.send_header(MOT_MOVE_HOME, channel, 0x00)
    }

    /// Start a relative move by the previously set distance.
    pub fn start_relative_move(&mut self, channel: u8) -> Result<()> {
        self.send_header(MOT_MOVE_RELATIVE, channel, 0x00)
    }

    /// Move by `distance` mm from the current position.
    pub fn move_relative_distance(&mut self, channel: u8, distance: f64) -> Result<()> {
        self.send_position(MOT_MOVE_RELATIVE, channel, distance)
    }

    /// Set the distance used by the next [`start_relative_move`](Self::start_relative_move).
    pub fn set_relative_move_distance(&mut self, channel: u8, distance: f64) -> Result<()> {
        self.send_position(MOT_SET_MOVERELPARAMS, channel, distance)
    }

    pub fn get_relative_move_distance(&mut self, channel: u8) -> Result<f64> {
        self.request_position(MOT_REQ_MOVERELPARAMS, MOT_GET_MOVERELPARAMS, channel)
    }

    /// Start an absolute move to the previously set position.
    pub fn start_absolute_move(&mut self, channel: u8) -> Result<()> {
        self.send_header(MOT_MOVE_ABSOLUTE, channel, 0x00)
    }

    /// Move to `position` mm.
    pub fn move_absolute_position(&mut self, channel: u8, position: f64) -> Result<()> {
        self.send_position(MOT_MOVE_ABSOLUTE, channel, position)
    }

    /// Set the target used by the next [`start_absolute_move`](Self::start_absolute_move).
    pub fn set_absolute_move_position(&mut self, channel: u8, position: f64) -> Result<()> {
        self.send_position(MOT_SET_MOVEABSPARAMS, channel, position)
    }

    pub fn get_absolute_move_position(&mut self, channel: u8) -> Result<f64> {
        self.request_position(MOT_REQ_MOVEABSPARAMS, MOT_GET_MOVEABSPARAMS, channel)
    }

    /// Jog one step using the current jog parameters.
    pub fn start_jog_move(&mut self, channel: u8, direction: Direction) -> Result<()> {
        self.send_header(MOT_MOVE_JOG, channel, direction.code())
    }

    /// Move at the maximum profile velocity until stopped.
    pub fn move_continuous(&mut self, channel: u8, direction: Direction) -> Result<()> {
        self.send_header(MOT_MOVE_VELOCITY, channel, direction.code())
    }

    pub fn stop(&mut self, channel: u8, mode: StopMode) -> Result<()> {
        self.send_header(MOT_MOVE_STOP, channel, mode.code())
    }

    pub(crate) fn engine_mut(&mut self) -> &mut TransactionEngine<T> {
        &mut self.engine
    }

    fn send_header(&mut self, command: u16, channel: u8, param2: u8) -> Result<()> {
        let mask = check_channel(channel)?;
        self.engine
            .write_header_only(&HeaderMessage::new(command, mask, param2))
    }

    fn send_position(&mut self, command: u16, channel: u8, position: f64) -> Result<()> {
        check_channel(channel)?;
        let counts = self.converter.position_to_counts(position);
        debug!(command = command_name(command), position, counts, "position");

        let mut payload = channel_payload(channel, 4);
        payload.put_i32_le(counts);
        self.engine
            .write_data(&DataMessage::new(command, payload.freeze()))
    }

    fn request_position(&mut self, request: u16, reply: u16, channel: u8) -> Result<f64> {
        let payload = self.request_payload(request, reply, channel)?;
        require_len(reply, &payload, DISTANCE_REPLY_LEN)?;
        let counts = (&payload[2..6]).get_i32_le();
        Ok(self.converter.counts_to_position(counts))
    }

    /// Request a data reply for `channel` and return its payload.
    pub(crate) fn request_payload(
        &mut self,
        request: u16,
        reply: u16,
        channel: u8,
    ) -> Result<Bytes> {
        let mask = check_channel(channel)?;
        let msg = self
            .engine
            .request_data(&HeaderMessage::new(request, mask, 0x00))?;
        check_reply(reply, msg.command);
        Ok(msg.payload)
    }
}

impl<T: Transport> Drop for Controller<T> {
    fn drop(&mut self) {
        if !self.engine.transport().is_connected() {
            return;
        }
        if let Err(err) = self.engine.transport_mut().disconnect() {
            warn!(%err, "failed to disconnect controller on drop");
        }
    }
}

/// Validate `channel` and return its wire mask.
pub(crate) fn check_channel(channel: u8) -> Result<u8> {
    if is_supported(channel) {
        Ok(channel_mask(channel))
    } else {
        Err(ControllerError::ChannelNotSupported(channel))
    }
}

/// Channel prefix followed by room for `fields` more bytes.
pub(crate) fn channel_payload(channel: u8, fields: usize) -> BytesMut {
    let mut payload = BytesMut::with_capacity(CHANNEL_PREFIX_SIZE + fields);
    payload.put_slice(&channel_prefix(channel));
    payload
}

pub(crate) fn require_len(command: u16, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() < expected {
        return Err(ControllerError::ResponseTooShort {
            command,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

fn check_reply(expected: u16, actual: u16) {
    if expected != actual {
        warn!(
            expected = format_args!("0x{expected:04X}"),
            actual = format_args!("0x{actual:04X}"),
            "unexpected reply command"
        );
    }
}
