use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

/// Delay provider that only adds up requested time
#[derive(Debug, Clone, Default)]
pub struct SimDelay {
    total_ns: Rc<Cell<u64>>,
}

impl SimDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested delays, in nanoseconds
    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    /// Sum of all requested delays, in whole microseconds
    pub fn total_us(&self) -> u64 {
        self.total_ns.get() / 1_000
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_across_clones() {
        let delay = SimDelay::new();
        let mut handle = delay.clone();
        handle.delay_us(10);
        handle.delay_ms(5);
        assert_eq!(delay.total_us(), 5_010);
    }
}
