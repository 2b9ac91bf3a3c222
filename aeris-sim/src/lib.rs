//! Simulated peripherals for host tests
//!
//! Each simulator is a cheap `Clone` handle over shared state: hand one
//! clone to the code under test and keep another to inject traffic and
//! inspect what happened on the wire.
//!
//! - [`SimUsart`] implements both USART halves; [`InterruptPump`] plays
//!   the interrupt controller and fires the transport's handlers whenever
//!   the simulated hardware would.
//! - [`SimBus`] is a TWI controller with register-mapped devices attached.
//! - [`SimDelay`] records requested delays instead of sleeping.

mod delay;
mod twi;
mod usart;

pub use delay::SimDelay;
pub use twi::SimBus;
pub use usart::{InterruptPump, SimUsart};
