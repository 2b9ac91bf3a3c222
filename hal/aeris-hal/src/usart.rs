//! USART register abstractions
//!
//! The serial transport touches the peripheral from two execution contexts:
//! the main program (configuration, re-arming the transmit interrupt) and
//! the interrupt handlers (moving bytes through the data register). Each
//! context gets its own trait so a HAL can hand out two independent handles
//! to the same peripheral.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Main-context half of a USART
pub trait UsartControl {
    /// Program the bit-rate divisor and frame format, enable the receiver,
    /// the transmitter and the receive-complete interrupt.
    ///
    /// The transmit-ready interrupt must be left disabled.
    fn configure(&mut self, divisor: u16, frame: FrameFormat);

    /// Enable the transmit-ready (data register empty) interrupt
    ///
    /// Called after every enqueue so draining resumes.
    fn enable_transmit_interrupt(&mut self);

    /// Set the global interrupt enable flag
    fn enable_global_interrupts(&mut self);
}

/// Interrupt-context half of a USART
///
/// Implementations must never block.
pub trait UsartIsr {
    /// Read the received byte
    ///
    /// On most parts this read is what clears the "data ready" condition,
    /// so it must happen exactly once per receive interrupt.
    fn read_data(&mut self) -> u8;

    /// Load the next byte into the transmit register
    fn write_data(&mut self, byte: u8);

    /// Disable the transmit-ready interrupt once the queue is drained
    fn disable_transmit_interrupt(&mut self);
}

/// Handlers the receive-complete and transmit-ready vectors dispatch into
///
/// Implemented by the transport's interrupt half; a HAL or simulator calls
/// these from its interrupt vectors.
pub trait UsartInterrupts {
    /// Receive-complete event
    fn on_receive(&mut self);

    /// Transmit data register empty event
    fn on_transmit_ready(&mut self);
}

/// Serial frame format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameFormat {
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl FrameFormat {
    /// 8 data bits, no parity, 1 stop bit
    pub const EIGHT_N_ONE: Self = Self {
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self::EIGHT_N_ONE
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    One,
    Two,
}
