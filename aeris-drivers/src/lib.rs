//! Device drivers
//!
//! Drivers are written against the register-level traits in `aeris-core`
//! and never touch a peripheral directly:
//!
//! - Environmental sensors (BME280)
//!
//! [`console`] parses the operator's request lines; it has no bus access
//! and is kept here so it builds and tests on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod console;
pub mod sensor;
