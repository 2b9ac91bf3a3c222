//! Interrupt-context half of the transport
//!
//! Both handlers run to completion in a bounded number of steps; neither
//! waits on the main program.

use aeris_hal::{UsartInterrupts, UsartIsr};

use super::buffers::InterruptSide;

/// Receive-complete and transmit-ready handlers bound to one USART
pub struct SerialInterrupts<'a, H, const TX: usize, const RX: usize> {
    side: InterruptSide<'a, TX, RX>,
    hw: H,
}

impl<'a, H: UsartIsr, const TX: usize, const RX: usize> SerialInterrupts<'a, H, TX, RX> {
    /// Bind the interrupt endpoint of the rings to the peripheral
    ///
    /// The returned value is what the interrupt vectors dispatch into.
    pub fn register(side: InterruptSide<'a, TX, RX>, hw: H) -> Self {
        Self { side, hw }
    }

    /// Receive-complete: move the arrived byte into the RX ring
    ///
    /// The data register is read unconditionally so the hardware condition
    /// clears. If the ring is full the byte is dropped; queued bytes are
    /// never evicted.
    pub fn on_receive(&mut self) {
        let byte = self.hw.read_data();
        if self.side.rx.push(byte).is_err() {
            self.side.record_drop();
        }
    }

    /// Transmit-ready: feed the next queued byte, or go quiet when drained
    pub fn on_transmit_ready(&mut self) {
        match self.side.tx.pop() {
            Some(byte) => self.hw.write_data(byte),
            None => self.hw.disable_transmit_interrupt(),
        }
    }
}

impl<H: UsartIsr, const TX: usize, const RX: usize> UsartInterrupts
    for SerialInterrupts<'_, H, TX, RX>
{
    fn on_receive(&mut self) {
        SerialInterrupts::on_receive(self);
    }

    fn on_transmit_ready(&mut self) {
        SerialInterrupts::on_transmit_ready(self);
    }
}
