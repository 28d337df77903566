//! DC servo status word decoding.
//!
//! The controller reports motion and fault state as a 32-bit word. Bits 0-19
//! and 24-31 carry named flags; bits 20-23 are unassigned on this device class
//! and are ignored.

use serde::Serialize;

/// Status word bits with no flag assigned.
pub const RESERVED_MASK: u32 = 0x00F0_0000;

macro_rules! status_flags {
    ($( $(#[$doc:meta])* $field:ident = $mask:literal, $name:literal; )+) => {
        /// Named view of a status word. Decoding is total over `u32`.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
        pub struct StatusFlags {
            $( $(#[$doc])* pub $field: bool, )+
        }

        impl StatusFlags {
            /// `(mask, name)` for every flag, low bit to high bit.
            pub const TABLE: &'static [(u32, &'static str)] = &[$( ($mask, $name), )+];

            /// Decode a raw status word.
            pub fn from_bits(bits: u32) -> Self {
                Self {
                    $( $field: bits & $mask != 0, )+
                }
            }

            /// Re-encode the flags. Reserved bits are always zero.
            pub fn to_bits(&self) -> u32 {
                let mut bits = 0;
                $( if self.$field { bits |= $mask; } )+
                bits
            }

            /// Names of the flags that are set, low bit to high bit.
            pub fn active(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $( if self.$field { names.push($name); } )+
                names
            }
        }
    };
}

status_flags! {
    /// Clockwise hardware limit switch engaged.
    cw_hard_limit = 0x0000_0001, "CWHardLimit";
    /// Counter-clockwise hardware limit switch engaged.
    ccw_hard_limit = 0x0000_0002, "CCWHardLimit";
    cw_soft_limit = 0x0000_0004, "CWSoftLimit";
    ccw_soft_limit = 0x0000_0008, "CCWSoftLimit";
    /// Moving clockwise.
    in_motion_cw = 0x0000_0010, "InMotionCW";
    /// Moving counter-clockwise.
    in_motion_ccw = 0x0000_0020, "InMotionCCW";
    jogging_cw = 0x0000_0040, "JoggingCW";
    jogging_ccw = 0x0000_0080, "JoggingCCW";
    /// Motor is connected to the controller.
    is_connected = 0x0000_0100, "IsConnected";
    is_homing = 0x0000_0200, "IsHoming";
    /// Homing completed since power-up.
    is_homed = 0x0000_0400, "IsHomed";
    is_initializing = 0x0000_0800, "IsInitializing";
    is_tracking = 0x0000_1000, "IsTracking";
    is_settled = 0x0000_2000, "IsSettled";
    /// Following error exceeded its limit.
    position_error = 0x0000_4000, "PositionError";
    instruction_error = 0x0000_8000, "InstructionError";
    interlock = 0x0001_0000, "Interlock";
    over_temperature = 0x0002_0000, "OverTemperature";
    bus_voltage_fault = 0x0004_0000, "BusVoltageFault";
    commutation_error = 0x0008_0000, "CommutationError";
    overload = 0x0100_0000, "Overload";
    encoder_fault = 0x0200_0000, "EncoderFault";
    over_current = 0x0400_0000, "OverCurrent";
    bus_current_fault = 0x0800_0000, "BusCurrentFault";
    power_ok = 0x1000_0000, "PowerOk";
    is_active = 0x2000_0000, "IsActive";
    /// Any latched controller error.
    error = 0x4000_0000, "Error";
    /// Channel output stage enabled.
    is_enabled = 0x8000_0000, "IsEnabled";
}

impl StatusFlags {
    /// True while the stage is moving or jogging in either direction.
    pub fn is_moving(&self) -> bool {
        self.in_motion_cw || self.in_motion_ccw || self.jogging_cw || self.jogging_ccw
    }

    /// True if any fault flag is set.
    pub fn has_fault(&self) -> bool {
        self.position_error
            || self.instruction_error
            || self.over_temperature
            || self.bus_voltage_fault
            || self.commutation_error
            || self.overload
            || self.encoder_fault
            || self.over_current
            || self.bus_current_fault
            || self.error
    }
}

impl From<u32> for StatusFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_every_named_flag() {
        assert_eq!(StatusFlags::TABLE.len(), 28);
        let all: u32 = StatusFlags::TABLE.iter().map(|(mask, _)| mask).sum();
        assert_eq!(all, !RESERVED_MASK);
    }

    #[test]
    fn all_ones_sets_every_flag() {
        let flags = StatusFlags::from_bits(0xFFFF_FFFF);
        assert_eq!(flags.active().len(), StatusFlags::TABLE.len());
        assert_eq!(flags.to_bits(), !RESERVED_MASK);
    }

    #[test]
    fn zero_clears_every_flag() {
        let flags = StatusFlags::from_bits(0);
        assert_eq!(flags, StatusFlags::default());
        assert!(flags.active().is_empty());
    }

    #[test]
    fn reserved_bits_never_surface() {
        for bit in 20..24 {
            let flags = StatusFlags::from_bits(1 << bit);
            assert!(flags.active().is_empty(), "bit {bit}");
        }
        assert_eq!(StatusFlags::from_bits(RESERVED_MASK), StatusFlags::default());
    }

    #[test]
    fn each_mask_maps_to_its_name() {
        for &(mask, name) in StatusFlags::TABLE {
            assert_eq!(StatusFlags::from_bits(mask).active(), vec![name]);
        }
    }

    #[test]
    fn connected_homed_enabled() {
        let flags = StatusFlags::from_bits(0x8000_0401);
        assert!(flags.cw_hard_limit);
        assert!(flags.is_homed);
        assert!(flags.is_enabled);
        assert_eq!(flags.active(), vec!["CWHardLimit", "IsHomed", "IsEnabled"]);
    }

    #[test]
    fn motion_and_fault_summaries() {
        assert!(StatusFlags::from_bits(0x10).is_moving());
        assert!(StatusFlags::from_bits(0x80).is_moving());
        assert!(!StatusFlags::from_bits(0x400).is_moving());
        assert!(StatusFlags::from_bits(0x4000_0000).has_fault());
        assert!(!StatusFlags::from_bits(0x9000_0500).has_fault());
    }
}
