//! APT command identifiers and parameter enums used by the KDC101.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub const MOD_IDENTIFY: u16 = 0x0223;
pub const HW_REQ_INFO: u16 = 0x0005;
pub const HW_GET_INFO: u16 = 0x0006;
pub const MOD_REQ_CHANENABLESTATE: u16 = 0x0211;
pub const MOD_GET_CHANENABLESTATE: u16 = 0x0212;

/// Enable-state writes use this id on the KDC101.
pub const MOD_SET_ENABLE: u16 = 0x0224;

pub const MOT_SET_VELPARAMS: u16 = 0x0413;
pub const MOT_REQ_VELPARAMS: u16 = 0x0414;
pub const MOT_GET_VELPARAMS: u16 = 0x0415;
pub const MOT_SET_JOGPARAMS: u16 = 0x0416;
pub const MOT_REQ_JOGPARAMS: u16 = 0x0417;
pub const MOT_GET_JOGPARAMS: u16 = 0x0418;
pub const MOT_MOVE_HOME: u16 = 0x0443;
pub const MOT_SET_MOVERELPARAMS: u16 = 0x0445;
pub const MOT_REQ_MOVERELPARAMS: u16 = 0x0446;
pub const MOT_GET_MOVERELPARAMS: u16 = 0x0447;
pub const MOT_MOVE_RELATIVE: u16 = 0x0448;
pub const MOT_SET_MOVEABSPARAMS: u16 = 0x0450;
pub const MOT_REQ_MOVEABSPARAMS: u16 = 0x0451;
pub const MOT_GET_MOVEABSPARAMS: u16 = 0x0452;
pub const MOT_MOVE_ABSOLUTE: u16 = 0x0453;
pub const MOT_MOVE_VELOCITY: u16 = 0x0457;
pub const MOT_MOVE_STOP: u16 = 0x0465;
pub const MOT_MOVE_JOG: u16 = 0x046A;
pub const MOT_REQ_DCSTATUSUPDATE: u16 = 0x0490;
pub const MOT_GET_DCSTATUSUPDATE: u16 = 0x0491;

/// `param2` of an enable-state write.
pub(crate) const ENABLE_ON: u8 = 0x01;
pub(crate) const ENABLE_OFF: u8 = 0x02;

/// Returns a short name for a command id, for logs and error messages.
pub fn command_name(id: u16) -> &'static str {
    match id {
        MOD_IDENTIFY => "identify",
        HW_REQ_INFO | HW_GET_INFO => "hw-info",
        MOD_SET_ENABLE => "set-enable",
        MOD_REQ_CHANENABLESTATE | MOD_GET_CHANENABLESTATE => "enable-state",
        MOT_SET_VELPARAMS => "set-velocity",
        MOT_REQ_VELPARAMS | MOT_GET_VELPARAMS => "get-velocity",
        MOT_SET_JOGPARAMS => "set-jog",
        MOT_REQ_JOGPARAMS | MOT_GET_JOGPARAMS => "get-jog",
        MOT_MOVE_HOME => "home",
        MOT_SET_MOVERELPARAMS => "set-rel-distance",
        MOT_REQ_MOVERELPARAMS | MOT_GET_MOVERELPARAMS => "get-rel-distance",
        MOT_MOVE_RELATIVE => "move-relative",
        MOT_SET_MOVEABSPARAMS => "set-abs-position",
        MOT_REQ_MOVEABSPARAMS | MOT_GET_MOVEABSPARAMS => "get-abs-position",
        MOT_MOVE_ABSOLUTE => "move-absolute",
        MOT_MOVE_VELOCITY => "move-continuous",
        MOT_MOVE_STOP => "stop",
        MOT_MOVE_JOG => "jog",
        MOT_REQ_DCSTATUSUPDATE | MOT_GET_DCSTATUSUPDATE => "dc-status",
        _ => "unknown",
    }
}

/// Direction of a jog or continuous move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Wire value carried in `param2`.
    pub fn code(self) -> u8 {
        match self {
            Direction::Forward => 0x01,
            Direction::Reverse => 0x02,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Reverse => f.write_str("reverse"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "fwd" | "+" => Ok(Direction::Forward),
            "reverse" | "rev" | "-" => Ok(Direction::Reverse),
            other => Err(format!("invalid direction '{other}' (expected forward|reverse)")),
        }
    }
}

/// How a stop command decelerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopMode {
    /// Stop immediately.
    Abrupt,
    /// Ramp down using the current velocity profile.
    Soft,
}

impl StopMode {
    /// Wire value carried in `param2` and in jog parameters.
    pub fn code(self) -> u8 {
        match self {
            StopMode::Abrupt => 0x01,
            StopMode::Soft => 0x02,
        }
    }
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopMode::Abrupt => f.write_str("abrupt"),
            StopMode::Soft => f.write_str("soft"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes() {
        assert_eq!(Direction::Forward.code(), 0x01);
        assert_eq!(Direction::Reverse.code(), 0x02);
        assert_eq!(StopMode::Abrupt.code(), 0x01);
        assert_eq!(StopMode::Soft.code(), 0x02);
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("forward".parse::<Direction>().unwrap(), Direction::Forward);
        assert_eq!("REV".parse::<Direction>().unwrap(), Direction::Reverse);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn command_names() {
        assert_eq!(command_name(0x0453), "move-absolute");
        assert_eq!(command_name(0x0490), "dc-status");
        assert_eq!(command_name(0xFFFF), "unknown");
    }
}
