//! Two-wire bus controller abstractions
//!
//! Models a byte-oriented TWI/I2C controller of the kind found on AVR parts:
//! software writes a command, hardware performs one bus phase and raises a
//! completion flag, then a status register reports what happened on the
//! wire. Sequencing and status validation live in `aeris-core`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transfer direction, carried in the low bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

impl Direction {
    /// Build the address byte: 7-bit address shifted left, direction in bit 0
    ///
    /// `address` must fit in 7 bits; debug builds reject wider values.
    pub fn address_byte(self, address: u8) -> u8 {
        debug_assert!(address <= 0x7F, "7-bit address out of range");
        ((address & 0x7F) << 1) | (self as u8)
    }
}

/// One bus phase the controller can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start (or repeated start) condition
    Start,
    /// Shift out one byte (address or data)
    Transmit(u8),
    /// Shift in one byte and acknowledge it
    ReceiveAck,
    /// Shift in one byte and do not acknowledge it
    ReceiveNack,
    /// Stop condition; hardware raises no completion flag for this one
    Stop,
}

/// TWI controller registers
pub trait TwiController {
    /// Program bus timing
    fn configure(&mut self, rate: BitRate);

    /// Start one bus phase
    fn execute(&mut self, command: Command);

    /// Whether the phase started by the last [`execute`](Self::execute) finished
    fn is_complete(&mut self) -> bool;

    /// Raw status register, prescaler bits included
    fn status(&mut self) -> u8;

    /// Data register (last byte shifted in)
    fn data(&mut self) -> u8;
}

/// Clock prescaler applied before the bit-rate divisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Prescaler {
    #[default]
    Div1,
    Div4,
    Div16,
    Div64,
}

impl Prescaler {
    /// All prescalers, smallest first
    pub const ALL: [Prescaler; 4] = [
        Prescaler::Div1,
        Prescaler::Div4,
        Prescaler::Div16,
        Prescaler::Div64,
    ];

    /// Division factor
    pub fn factor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div4 => 4,
            Prescaler::Div16 => 16,
            Prescaler::Div64 => 64,
        }
    }

    /// Value of the two prescaler bits in the status register
    pub fn bits(self) -> u8 {
        match self {
            Prescaler::Div1 => 0b00,
            Prescaler::Div4 => 0b01,
            Prescaler::Div16 => 0b10,
            Prescaler::Div64 => 0b11,
        }
    }
}

/// Bus timing as programmed into the controller
///
/// SCL frequency = CPU clock / (16 + 2 * divisor * prescaler)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitRate {
    pub prescaler: Prescaler,
    pub divisor: u8,
}

impl BitRate {
    /// Resulting SCL frequency in Hz for a given CPU clock
    pub fn frequency(&self, clock_hz: u32) -> u32 {
        clock_hz / (16 + 2 * self.divisor as u32 * self.prescaler.factor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_byte() {
        assert_eq!(Direction::Write.address_byte(0x76), 0xEC);
        assert_eq!(Direction::Read.address_byte(0x76), 0xED);
        assert_eq!(Direction::Read.address_byte(0x7F), 0xFF);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "7-bit address out of range")]
    fn test_address_byte_rejects_eight_bit_address() {
        Direction::Write.address_byte(0xEC);
    }

    #[test]
    fn test_bit_rate_frequency() {
        let rate = BitRate {
            prescaler: Prescaler::Div1,
            divisor: 72,
        };
        assert_eq!(rate.frequency(16_000_000), 100_000);
    }
}
