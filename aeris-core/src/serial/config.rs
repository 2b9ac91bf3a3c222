//! Serial transport configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default CPU clock of the supported boards
pub const DEFAULT_CLOCK_HZ: u32 = 16_000_000;

/// Default console baud rate
pub const DEFAULT_BAUD: u32 = 19_200;

/// Serial link configuration
///
/// The frame format is fixed at 8N1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// CPU clock feeding the baud-rate generator
    pub clock_hz: u32,
    /// Line input behavior
    pub line: LineConfig,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD,
            clock_hz: DEFAULT_CLOCK_HZ,
            line: LineConfig::RAW,
        }
    }
}

impl SerialConfig {
    /// Default link with a different baud rate
    pub fn with_baud(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }
}

/// Line input policy for [`Serial::receive_line`](super::Serial::receive_line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineConfig {
    /// Send every accepted byte back to the remote terminal
    pub echo: bool,
    /// Treat BS/DEL as "erase the last byte"
    pub backspace: bool,
}

impl LineConfig {
    /// No echo, no editing; bytes are stored as received
    pub const RAW: Self = Self {
        echo: false,
        backspace: false,
    };

    /// Interactive terminal: echo plus destructive backspace
    pub const INTERACTIVE: Self = Self {
        echo: true,
        backspace: true,
    };
}
