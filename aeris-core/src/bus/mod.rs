//! Two-wire bus master engine
//!
//! The engine is the only master on the bus and drives it through a fixed
//! sequence of primitives:
//!
//! ```text
//! Idle ──start──► Started ──address──► AddressAcked ──► Writing | Reading ──stop──► Idle
//! ```
//!
//! Primitives ([`BusMaster::start`], [`BusMaster::write`],
//! [`BusMaster::read_ack`], [`BusMaster::read_nack`], [`BusMaster::stop`])
//! report the raw status the controller latched. Register helpers check
//! each status against the literals in [`StatusCodes`] and, on the first
//! mismatch, issue a stop and return the offending code. Every helper,
//! successful or not, leaves the bus released.

pub mod config;
pub mod error;
pub mod i2c;
pub mod master;
pub mod register;

pub use config::{BusConfig, StatusCodes};
pub use error::{BusError, Phase};
pub use master::{BusMaster, SCAN_INTERVAL_MS};
pub use register::RegisterBus;
