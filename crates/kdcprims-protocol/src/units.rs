//! Physical units to encoder counts and back.
//!
//! With `S` the stage scale and `T` the motor time factor:
//!
//! | Quantity | To counts | From counts |
//! |---|---|---|
//! | position | `round(x * S)` as `i32` | `c / S` |
//! | velocity | `round(v * T * 65536 * S)` as `u32` | `c / (T * 65536 * S)` |
//! | acceleration | `round(a * (T * T) * 65536 * S)` as `u32` | `c / (T * T * 65536 * S)` |
//!
//! Expressions are evaluated left to right exactly as written so results are
//! reproducible bit for bit. Values outside the target range are not rejected:
//! the rounded value wraps to the target width.

use serde::Serialize;

use crate::calibration::Calibration;

/// Fixed-point scale of velocity and acceleration counts.
const FIXED_POINT_SCALE: f64 = 65536.0;

/// Counts converter bound to one calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitConverter {
    calibration: Calibration,
}

impl UnitConverter {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Millimetres (or degrees) to position counts.
    pub fn position_to_counts(&self, position: f64) -> i32 {
        wrap_i32(position * self.scale())
    }

    /// Position counts to millimetres (or degrees).
    pub fn counts_to_position(&self, counts: i32) -> f64 {
        f64::from(counts) / self.scale()
    }

    /// mm/s to velocity counts.
    pub fn velocity_to_counts(&self, velocity: f64) -> u32 {
        wrap_u32(velocity * self.time() * FIXED_POINT_SCALE * self.scale())
    }

    /// Velocity counts to mm/s.
    pub fn counts_to_velocity(&self, counts: u32) -> f64 {
        f64::from(counts) / (self.time() * FIXED_POINT_SCALE * self.scale())
    }

    /// mm/s² to acceleration counts.
    pub fn acceleration_to_counts(&self, acceleration: f64) -> u32 {
        let t = self.time();
        wrap_u32(acceleration * (t * t) * FIXED_POINT_SCALE * self.scale())
    }

    /// Acceleration counts to mm/s².
    pub fn counts_to_acceleration(&self, counts: u32) -> f64 {
        let t = self.time();
        f64::from(counts) / (t * t * FIXED_POINT_SCALE * self.scale())
    }

    fn scale(&self) -> f64 {
        self.calibration.stage_scale()
    }

    fn time(&self) -> f64 {
        self.calibration.time_factor()
    }
}

impl From<Calibration> for UnitConverter {
    fn from(calibration: Calibration) -> Self {
        Self::new(calibration)
    }
}

// Round half away from zero, then narrow through i64 with wraparound.
fn wrap_i32(value: f64) -> i32 {
    value.round() as i64 as i32
}

fn wrap_u32(value: f64) -> u32 {
    value.round() as i64 as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{MotorType, StageType};

    fn converter(stage: StageType) -> UnitConverter {
        UnitConverter::new(Calibration::new(stage, MotorType::Brushed))
    }

    #[test]
    fn ten_millimetres_on_mts25() {
        let conv = converter(StageType::Mts25Z8);
        assert_eq!(conv.position_to_counts(10.0), 345_550);
        assert_eq!(conv.position_to_counts(-10.0), -345_550);
    }

    #[test]
    fn zero_maps_to_zero() {
        for stage in StageType::ALL {
            let conv = converter(stage);
            assert_eq!(conv.position_to_counts(0.0), 0);
            assert_eq!(conv.velocity_to_counts(0.0), 0);
            assert_eq!(conv.acceleration_to_counts(0.0), 0);
            assert_eq!(conv.counts_to_position(0), 0.0);
        }
    }

    #[test]
    fn position_round_trip_within_one_count() {
        for stage in StageType::ALL {
            let conv = converter(stage);
            let one_count = 1.0 / stage.scale();
            for value in [-25.0, -3.3, -0.001, 0.5, 1.0, 7.25, 12.345, 49.999] {
                let back = conv.counts_to_position(conv.position_to_counts(value));
                assert!(
                    (back - value).abs() <= one_count,
                    "{stage}: {value} -> {back}"
                );
            }
        }
    }

    #[test]
    fn velocity_round_trip_within_one_count() {
        for stage in StageType::ALL {
            let conv = converter(stage);
            let one_count = conv.counts_to_velocity(1);
            for value in [0.01, 0.5, 1.0, 2.3, 2.6] {
                let back = conv.counts_to_velocity(conv.velocity_to_counts(value));
                assert!(
                    (back - value).abs() <= one_count,
                    "{stage}: {value} -> {back}"
                );
            }
        }
    }

    #[test]
    fn acceleration_round_trip_within_one_count() {
        for stage in StageType::ALL {
            let conv = converter(stage);
            let one_count = conv.counts_to_acceleration(1);
            for value in [0.1, 1.0, 1.5, 4.0, 10.0] {
                let back = conv.counts_to_acceleration(conv.acceleration_to_counts(value));
                assert!(
                    (back - value).abs() <= one_count,
                    "{stage}: {value} -> {back}"
                );
            }
        }
    }

    #[test]
    fn velocity_formula_matches_reference_order() {
        let conv = converter(StageType::Mts25Z8);
        let t = 2048.0 / (6.0 * 1e6);
        let expected = (1.0 * t * 65536.0 * 34554.96_f64).round() as u32;
        assert_eq!(conv.velocity_to_counts(1.0), expected);

        let expected = (1.5 * (t * t) * 65536.0 * 34554.96_f64).round() as u32;
        assert_eq!(conv.acceleration_to_counts(1.5), expected);
    }

    #[test]
    fn acceleration_uses_squared_time_factor() {
        let conv = converter(StageType::Mts25Z8);
        let t = conv.calibration().time_factor();
        let ratio = f64::from(conv.velocity_to_counts(100.0))
            / f64::from(conv.acceleration_to_counts(100.0));
        assert!((ratio - 1.0 / t).abs() / (1.0 / t) < 1e-4);
    }

    #[test]
    fn out_of_range_wraps_instead_of_clamping() {
        let conv = converter(StageType::Kvs30);
        // 2^31 counts: one past i32::MAX.
        assert_eq!(conv.position_to_counts(107_374.182_4), i32::MIN);

        // Negative velocities wrap to the top of the unsigned range.
        assert_eq!(conv.velocity_to_counts(-0.0), 0);
        let wrapped = conv.velocity_to_counts(-1.0);
        assert_eq!(wrapped, conv.velocity_to_counts(1.0).wrapping_neg());
    }

    #[test]
    fn rotation_mount_degrees() {
        let conv = converter(StageType::Prm1Z8);
        assert_eq!(conv.position_to_counts(360.0), 691_071);
        assert!((conv.counts_to_position(691_071) - 360.0).abs() < 1e-3);
    }
}
