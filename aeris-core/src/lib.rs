//! Board-agnostic communication core for the Aeris firmware
//!
//! This crate contains the two pieces of the firmware that share state
//! across execution contexts or sequence a wire protocol:
//!
//! - Lock-free single-producer/single-consumer byte ring
//! - Interrupt-driven serial transport (console link)
//! - Two-wire bus master engine with register helpers
//! - Clock divisor math for both peripherals
//! - Raw measurement word assembly
//!
//! Everything here is written against the `aeris-hal` traits and runs on
//! the host through `aeris-sim`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod measurement;
pub mod ring;
pub mod serial;
pub mod timing;

pub use bus::{BusConfig, BusError, BusMaster, Phase, RegisterBus, StatusCodes};
pub use ring::RingBuffer;
pub use serial::{LineConfig, Serial, SerialBuffers, SerialConfig, SerialInterrupts};
