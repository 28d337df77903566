//! Per-stage and per-motor calibration constants.
//!
//! A [`Calibration`] is resolved once when a controller is built and never
//! changes afterwards. Stage scales are datasheet values in encoder counts per
//! millimetre (linear stages) or per degree (rotation mounts).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ControllerError;

/// Seconds per velocity-loop tick on DC servo controllers.
pub const DC_SERVO_TIME_FACTOR: f64 = 2048.0 / (6.0 * 1e6);

/// Counts per millimetre of the Z8 actuator family.
const Z8_SCALE: f64 = 34554.96;

/// Counts per degree of the PRM1 rotation mounts.
const PRM1_SCALE: f64 = 1919.6418578623391;

/// Supported stages and actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StageType {
    #[serde(rename = "MTS25-Z8")]
    Mts25Z8,
    #[serde(rename = "MTS50-Z8")]
    Mts50Z8,
    #[serde(rename = "Z8xx")]
    Z8xx,
    #[serde(rename = "Z6xx")]
    Z6xx,
    #[serde(rename = "PRM1-Z8")]
    Prm1Z8,
    #[serde(rename = "PRMTZ8")]
    Prmtz8,
    #[serde(rename = "CR1-Z7")]
    Cr1Z7,
    #[serde(rename = "KVS30")]
    Kvs30,
}

impl StageType {
    /// Every supported stage, in table order.
    pub const ALL: [StageType; 8] = [
        StageType::Mts25Z8,
        StageType::Mts50Z8,
        StageType::Z8xx,
        StageType::Z6xx,
        StageType::Prm1Z8,
        StageType::Prmtz8,
        StageType::Cr1Z7,
        StageType::Kvs30,
    ];

    /// Catalog label, e.g. `MTS25-Z8`.
    pub fn label(self) -> &'static str {
        match self {
            StageType::Mts25Z8 => "MTS25-Z8",
            StageType::Mts50Z8 => "MTS50-Z8",
            StageType::Z8xx => "Z8xx",
            StageType::Z6xx => "Z6xx",
            StageType::Prm1Z8 => "PRM1-Z8",
            StageType::Prmtz8 => "PRMTZ8",
            StageType::Cr1Z7 => "CR1-Z7",
            StageType::Kvs30 => "KVS30",
        }
    }

    /// Encoder counts per physical unit.
    pub fn scale(self) -> f64 {
        match self {
            StageType::Mts25Z8 | StageType::Mts50Z8 | StageType::Z8xx => Z8_SCALE,
            StageType::Z6xx => 24600.0,
            StageType::Prm1Z8 | StageType::Prmtz8 => PRM1_SCALE,
            StageType::Cr1Z7 => 12288.0,
            StageType::Kvs30 => 20000.0,
        }
    }

    /// Physical unit of positions on this stage.
    pub fn unit(self) -> &'static str {
        match self {
            StageType::Prm1Z8 | StageType::Prmtz8 | StageType::Cr1Z7 => "deg",
            _ => "mm",
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StageType {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageType::ALL
            .into_iter()
            .find(|stage| stage.label() == s)
            .ok_or_else(|| ControllerError::UnsupportedStageOrMotor(format!("stage '{s}'")))
    }
}

/// Supported motor families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MotorType {
    Brushed,
    Brushless,
}

impl MotorType {
    /// Every supported motor type.
    pub const ALL: [MotorType; 2] = [MotorType::Brushed, MotorType::Brushless];

    pub fn label(self) -> &'static str {
        match self {
            MotorType::Brushed => "Brushed",
            MotorType::Brushless => "Brushless",
        }
    }

    /// Seconds per internal tick.
    pub fn time_factor(self) -> f64 {
        match self {
            MotorType::Brushed | MotorType::Brushless => DC_SERVO_TIME_FACTOR,
        }
    }
}

impl fmt::Display for MotorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MotorType {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MotorType::ALL
            .into_iter()
            .find(|motor| motor.label() == s)
            .ok_or_else(|| ControllerError::UnsupportedStageOrMotor(format!("motor '{s}'")))
    }
}

/// Immutable conversion constants for one (stage, motor) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calibration {
    stage: StageType,
    motor: MotorType,
    stage_scale: f64,
    time_factor: f64,
}

impl Calibration {
    /// Calibration for a known stage and motor.
    pub fn new(stage: StageType, motor: MotorType) -> Self {
        Self {
            stage,
            motor,
            stage_scale: stage.scale(),
            time_factor: motor.time_factor(),
        }
    }

    /// Calibration for catalog labels such as `("MTS25-Z8", "Brushed")`.
    ///
    /// Fails with [`ControllerError::UnsupportedStageOrMotor`] when either
    /// label is not in the table.
    pub fn lookup(stage: &str, motor: &str) -> crate::Result<Self> {
        Ok(Self::new(stage.parse()?, motor.parse()?))
    }

    pub fn stage(&self) -> StageType {
        self.stage
    }

    pub fn motor(&self) -> MotorType {
        self.motor
    }

    /// Counts per mm (or per degree).
    pub fn stage_scale(&self) -> f64 {
        self.stage_scale
    }

    /// Seconds per internal tick.
    pub fn time_factor(&self) -> f64 {
        self.time_factor
    }
}
