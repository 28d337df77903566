//! DC servo status updates.

use std::thread;
use std::time::{Duration, Instant};

use bytes::Buf;
use kdcprims_transport::Transport;
use serde::Serialize;
use tracing::debug;

use crate::commands::{MOT_GET_DCSTATUSUPDATE, MOT_REQ_DCSTATUSUPDATE};
use crate::controller::{require_len, Controller};
use crate::error::{ControllerError, Result};
use crate::status::StatusFlags;
use crate::units::UnitConverter;

/// Minimum payload of a DC status reply.
pub const DC_STATUS_LEN: usize = 14;

/// Status update as reported, in encoder counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DcStatusUpdate {
    pub channel: u16,
    pub position: i32,
    pub velocity: u16,
    pub current: i16,
    pub status_bits: u32,
}

impl DcStatusUpdate {
    /// Parse a DC status payload (at least 14 bytes).
    pub fn parse(payload: &[u8]) -> Result<Self> {
        require_len(MOT_GET_DCSTATUSUPDATE, payload, DC_STATUS_LEN)?;
        let mut buf = &payload[..DC_STATUS_LEN];
        Ok(Self {
            channel: buf.get_u16_le(),
            position: buf.get_i32_le(),
            velocity: buf.get_u16_le(),
            current: buf.get_i16_le(),
            status_bits: buf.get_u32_le(),
        })
    }

    /// Convert to physical units with `converter`.
    pub fn to_si(&self, converter: &UnitConverter) -> DcStatusUpdateSi {
        DcStatusUpdateSi {
            channel: self.channel,
            position: converter.counts_to_position(self.position),
            velocity: converter.counts_to_velocity(u32::from(self.velocity)),
            current: self.current,
            status: StatusFlags::from_bits(self.status_bits),
        }
    }
}

/// Status update in physical units with named status flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DcStatusUpdateSi {
    pub channel: u16,
    /// mm
    pub position: f64,
    /// mm/s
    pub velocity: f64,
    /// Motor current, unscaled.
    pub current: i16,
    pub status: StatusFlags,
}

impl<T: Transport> Controller<T> {
    pub fn get_dc_status_update(&mut self, channel: u8) -> Result<DcStatusUpdate> {
        let payload =
            self.request_payload(MOT_REQ_DCSTATUSUPDATE, MOT_GET_DCSTATUSUPDATE, channel)?;
        DcStatusUpdate::parse(&payload)
    }

    pub fn get_dc_status_update_si(&mut self, channel: u8) -> Result<DcStatusUpdateSi> {
        let raw = self.get_dc_status_update(channel)?;
        Ok(self.dc_status_update_to_si(&raw))
    }

    pub fn dc_status_update_to_si(&self, update: &DcStatusUpdate) -> DcStatusUpdateSi {
        update.to_si(self.converter())
    }

    /// Poll the status every `interval` until `done` holds.
    ///
    /// Fails with [`ControllerError::WaitTimeout`] once `timeout` has elapsed.
    /// Each poll is a full status transaction; no state is kept between polls.
    pub fn wait_for_status<F>(
        &mut self,
        channel: u8,
        interval: Duration,
        timeout: Duration,
        mut done: F,
    ) -> Result<DcStatusUpdateSi>
    where
        F: FnMut(&StatusFlags) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let status = self.get_dc_status_update_si(channel)?;
            if done(&status.status) {
                return Ok(status);
            }
            debug!(
                position = status.position,
                flags = ?status.status.active(),
                "waiting for status"
            );

            let now = Instant::now();
            if now >= deadline {
                return Err(ControllerError::WaitTimeout(timeout));
            }
            thread::sleep(interval.min(deadline - now));
        }
    }

    /// Start homing and block until the stage reports `IsHomed`.
    pub fn home_and_wait(
        &mut self,
        channel: u8,
        interval: Duration,
        timeout: Duration,
    ) -> Result<DcStatusUpdateSi> {
        self.start_home_move(channel)?;
        self.wait_for_status(channel, interval, timeout, |flags| flags.is_homed)
    }
}
