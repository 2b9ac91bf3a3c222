//! Interrupt-driven serial transport
//!
//! Two rings connect the main program with the USART interrupt handlers:
//!
//! ```text
//!            main context                      interrupt context
//!  send_byte ──push──► [ TX ring ] ──pop──► on_transmit_ready ──► data register
//!  receive_byte ◄─pop── [ RX ring ] ◄─push── on_receive ◄────────── data register
//! ```
//!
//! Each ring index has exactly one writer. Main-context calls busy-wait
//! (through a [`Relax`](aeris_hal::Relax) strategy) when the TX ring is full
//! or the RX ring is empty; interrupt handlers never wait. A byte that
//! arrives while the RX ring is full is dropped and counted.

pub mod buffers;
pub mod config;
pub mod interrupt;
pub mod transport;

pub use buffers::{InterruptSide, MainSide, SerialBuffers};
pub use config::{LineConfig, SerialConfig};
pub use interrupt::SerialInterrupts;
pub use transport::Serial;
