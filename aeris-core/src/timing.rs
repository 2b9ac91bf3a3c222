//! Clock divisor math
//!
//! Both peripherals derive their bit clock from the CPU clock. Out-of-range
//! requests are caller contract violations; they are clamped rather than
//! reported because the hardware offers no way to detect them either.

use aeris_hal::{BitRate, Prescaler};

/// USART baud-rate register value for normal-speed asynchronous mode
///
/// `clock / (16 * baud) - 1`, saturating at both ends.
pub fn baud_divisor(clock_hz: u32, baud: u32) -> u16 {
    let ticks = clock_hz / baud.max(1).saturating_mul(16);
    ticks.saturating_sub(1).min(u16::MAX as u32) as u16
}

/// Baud rate actually produced by a divisor
pub fn actual_baud(clock_hz: u32, divisor: u16) -> u32 {
    clock_hz / (16 * (divisor as u32 + 1))
}

/// Two-wire bit-rate settings for a target SCL frequency
///
/// Picks the smallest prescaler whose divisor fits in a byte:
/// `divisor = (clock / scl - 16) / (2 * prescaler)`.
pub fn bit_rate(clock_hz: u32, bus_hz: u32) -> BitRate {
    let span = (clock_hz / bus_hz.max(1)).saturating_sub(16);
    for prescaler in Prescaler::ALL {
        let divisor = span / (2 * prescaler.factor());
        if divisor <= u8::MAX as u32 {
            return BitRate {
                prescaler,
                divisor: divisor as u8,
            };
        }
    }
    BitRate {
        prescaler: Prescaler::Div64,
        divisor: u8::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(clock: u32, baud: u32) -> u16 {
        ((clock / (16 * baud)) - 1) as u16
    }

    #[test]
    fn test_baud_divisor_16mhz_19200() {
        assert_eq!(baud_divisor(16_000_000, 19_200), 51);
        assert_eq!(baud_divisor(16_000_000, 19_200), formula(16_000_000, 19_200));
    }

    #[test]
    fn test_baud_divisor_matches_formula() {
        let pairs = [
            (16_000_000, 9_600),
            (16_000_000, 57_600),
            (16_000_000, 115_200),
            (8_000_000, 9_600),
            (1_000_000, 4_800),
        ];
        for (clock, baud) in pairs {
            assert_eq!(baud_divisor(clock, baud), formula(clock, baud));
        }
        assert_eq!(baud_divisor(16_000_000, 9_600), 103);
        assert_eq!(baud_divisor(8_000_000, 9_600), 51);
    }

    #[test]
    fn test_baud_divisor_clamps() {
        assert_eq!(baud_divisor(16_000_000, 0), u16::MAX);
        assert_eq!(baud_divisor(16_000_000, 4_000_000), 0);
    }

    #[test]
    fn test_actual_baud() {
        assert_eq!(actual_baud(16_000_000, 51), 19_230);
    }

    #[test]
    fn test_bit_rate_standard_mode() {
        let rate = bit_rate(16_000_000, 100_000);
        assert_eq!(rate.prescaler, Prescaler::Div1);
        assert_eq!(rate.divisor, 72);
    }

    #[test]
    fn test_bit_rate_fast_mode() {
        let rate = bit_rate(16_000_000, 400_000);
        assert_eq!(rate.prescaler, Prescaler::Div1);
        assert_eq!(rate.divisor, 12);
        assert_eq!(rate.frequency(16_000_000), 400_000);
    }

    #[test]
    fn test_bit_rate_needs_prescaler() {
        // 16 MHz / 10 kHz = 1600; (1600 - 16) / 2 = 792 does not fit
        let rate = bit_rate(16_000_000, 10_000);
        assert_eq!(rate.prescaler, Prescaler::Div4);
        assert_eq!(rate.divisor, 198);
    }

    #[test]
    fn test_bit_rate_too_slow_clamps() {
        let rate = bit_rate(16_000_000, 100);
        assert_eq!(rate.prescaler, Prescaler::Div64);
        assert_eq!(rate.divisor, 255);
    }
}
