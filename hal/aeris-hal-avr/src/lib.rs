//! ATmega2560 HAL for the Aeris firmware
//!
//! Implements the `aeris-hal` traits directly on the `avr-device`
//! register blocks:
//!
//! - USART0 split into a main-context and an interrupt-context handle
//! - TWI as a [`TwiController`](aeris_hal::TwiController)
//! - A cycle-counting [`DelayNs`](embedded_hal::delay::DelayNs)
//!
//! Only this crate touches hardware registers, so it is the only one in
//! the workspace that needs `unsafe`.

#![no_std]

pub mod delay;
pub mod twi;
pub mod usart;

pub use avr_device::atmega2560 as pac;

pub use delay::CycleDelay;
pub use twi::Twi;
pub use usart::{Usart0Control, Usart0Isr};
