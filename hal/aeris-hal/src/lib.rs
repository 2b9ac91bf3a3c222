//! Aeris Hardware Abstraction Layer
//!
//! This crate defines the register-level traits the Aeris core drives.
//! Chip-specific HALs (ATmega2560 today) and the host simulator implement
//! them, so the serial transport and the bus master engine run unchanged
//! on hardware and in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (aeris-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aeris-core (serial transport, bus)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aeris-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ aeris-hal-avr │       │   aeris-sim   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`usart::UsartControl`], [`usart::UsartIsr`] - Serial port, split by execution context
//! - [`usart::UsartInterrupts`] - Receive/transmit interrupt handlers
//! - [`twi::TwiController`] - Two-wire bus controller registers
//! - [`relax::Relax`] - What a busy-wait does between polls

#![no_std]
#![deny(unsafe_code)]

pub mod relax;
pub mod twi;
pub mod usart;

// Re-export key traits at crate root for convenience
pub use relax::{Relax, Spin};
pub use twi::{BitRate, Command, Direction, Prescaler, TwiController};
pub use usart::{FrameFormat, UsartControl, UsartInterrupts, UsartIsr};
