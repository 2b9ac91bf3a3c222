//! Bus master configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status literals the abort logic compares against
///
/// Controller families disagree on the numbers, so they are configuration
/// rather than constants. The defaults are the AVR TWI codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusCodes {
    /// Address + write bit sent, ACK received
    pub start_write_ack: u8,
    /// Address + read bit sent, ACK received
    pub start_read_ack: u8,
    /// Data byte sent, ACK received
    pub data_write_ack: u8,
    /// Bits of the status register that carry the status
    pub mask: u8,
}

impl StatusCodes {
    /// AVR TWI (ATmega48/88/168/328/640/1280/2560)
    pub const AVR_TWI: Self = Self {
        start_write_ack: 0x18,
        start_read_ack: 0x40,
        data_write_ack: 0x28,
        mask: 0xF8,
    };

    /// Whether `status` is an acknowledged address in either direction
    pub fn is_address_ack(&self, status: u8) -> bool {
        status == self.start_write_ack || status == self.start_read_ack
    }
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self::AVR_TWI
    }
}

/// Bus master configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// CPU clock feeding the bit-rate generator
    pub clock_hz: u32,
    /// Target SCL frequency in Hz
    pub bus_hz: u32,
    /// Expected status literals
    pub status: StatusCodes,
    /// Settling delay after a stop condition, in microseconds
    pub settle_us: u32,
    /// Upper bound on completion polls per phase; `None` waits forever
    pub timeout_polls: Option<u32>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BusConfig {
    /// Standard mode (100 kHz) on a 16 MHz part
    pub const STANDARD: Self = Self {
        clock_hz: 16_000_000,
        bus_hz: 100_000,
        status: StatusCodes::AVR_TWI,
        settle_us: 10,
        timeout_polls: None,
    };

    /// Fast mode (400 kHz) on a 16 MHz part
    pub const FAST: Self = Self {
        bus_hz: 400_000,
        ..Self::STANDARD
    };

    /// Same configuration with bounded completion waits
    pub fn with_timeout(self, polls: u32) -> Self {
        Self {
            timeout_polls: Some(polls),
            ..self
        }
    }
}
