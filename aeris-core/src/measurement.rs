//! Raw measurement word assembly
//!
//! Sensors publish wide readings as runs of consecutive 8-bit registers,
//! read in one bus transaction with `read_registers`. These helpers turn
//! such runs back into integers.

/// 20-bit reading from `[msb, lsb, xlsb]`, the value left-aligned in 24 bits
///
/// `(msb << 12) | (lsb << 4) | (xlsb >> 4)`
pub fn raw20(bytes: [u8; 3]) -> u32 {
    ((bytes[0] as u32) << 12) | ((bytes[1] as u32) << 4) | ((bytes[2] as u32) >> 4)
}

/// 16-bit reading from `[msb, lsb]`
pub fn raw16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Unsigned little-endian register pair
pub fn u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// Signed little-endian register pair
pub fn i16_le(bytes: [u8; 2]) -> i16 {
    i16::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw20_reassembly() {
        let raw = raw20([0x7F, 0xE0, 0x00]);
        assert_eq!(raw, 0x7FE000 >> 4);
        assert_eq!(raw, 0x7FE00);
        assert!(raw < 1 << 20);
    }

    #[test]
    fn test_raw20_drops_low_nibble() {
        assert_eq!(raw20([0x00, 0x00, 0x0F]), 0);
        assert_eq!(raw20([0x00, 0x00, 0xF0]), 0x0F);
        assert_eq!(raw20([0xFF, 0xFF, 0xFF]), 0xFFFFF);
    }

    #[test]
    fn test_word_helpers() {
        assert_eq!(raw16_be([0x66, 0x80]), 0x6680);
        assert_eq!(u16_le([0x70, 0x6B]), 0x6B70);
        assert_eq!(i16_le([0x32, 0xFC]), -974);
    }
}
