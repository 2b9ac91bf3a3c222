//! Busy-wait delay

use embedded_hal::delay::DelayNs;

/// CPU cycles spent per loop iteration (nop + decrement + branch)
const CYCLES_PER_LOOP: u32 = 4;

/// Cycle-counting delay for a fixed CPU clock
///
/// Accuracy is "at least as long as requested"; interrupts taken during
/// the loop stretch it further.
#[derive(Debug, Clone, Copy)]
pub struct CycleDelay {
    cycles_per_us: u32,
}

impl CycleDelay {
    pub const fn new(clock_hz: u32) -> Self {
        let cycles_per_us = clock_hz / 1_000_000;
        Self {
            cycles_per_us: if cycles_per_us == 0 { 1 } else { cycles_per_us },
        }
    }

    fn spin(&self, loops: u32) {
        for _ in 0..loops {
            avr_device::asm::nop();
        }
    }
}

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns / 1_000 + 1).saturating_mul(self.cycles_per_us);
        self.spin(cycles / CYCLES_PER_LOOP);
    }

    fn delay_us(&mut self, us: u32) {
        let cycles = us.saturating_mul(self.cycles_per_us);
        self.spin(cycles / CYCLES_PER_LOOP);
    }
}
