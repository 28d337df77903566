//! Channel addressing.
//!
//! Single-channel controllers answer on channel 1 only. Header messages carry
//! the channel in `param1`, data messages prefix the payload with a 16-bit
//! little-endian channel identifier.

/// The only channel a KDC101 exposes.
pub const SUPPORTED_CHANNEL: u8 = 1;

/// Size of the channel prefix at the start of every channel-scoped payload.
pub const CHANNEL_PREFIX_SIZE: usize = 2;

/// Bit mask identifying `channel` on the wire: `1 << (channel - 1)`.
///
/// Only meaningful for channels 1 through 8. Callers reject unsupported
/// channels before encoding.
pub fn channel_mask(channel: u8) -> u8 {
    1u8.checked_shl(u32::from(channel.saturating_sub(1)))
        .unwrap_or(0)
}

/// Returns true if `channel` is addressable on a single-channel controller.
pub fn is_supported(channel: u8) -> bool {
    channel == SUPPORTED_CHANNEL
}

/// Two-byte payload prefix naming `channel`.
pub fn channel_prefix(channel: u8) -> [u8; CHANNEL_PREFIX_SIZE] {
    [channel_mask(channel), 0x00]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_one_mask() {
        assert_eq!(channel_mask(1), 0x01);
        assert_eq!(channel_prefix(1), [0x01, 0x00]);
    }

    #[test]
    fn test_mask_is_one_bit_per_channel() {
        assert_eq!(channel_mask(2), 0x02);
        assert_eq!(channel_mask(4), 0x08);
        assert_eq!(channel_mask(8), 0x80);
        assert_eq!(channel_mask(9), 0x00);
    }

    #[test]
    fn test_supported_channels() {
        assert!(is_supported(1));
        assert!(!is_supported(0));
        assert!(!is_supported(2));
    }
}
