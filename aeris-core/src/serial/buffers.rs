//! Ring storage shared by the two halves of the transport

use portable_atomic::{AtomicU16, Ordering};

use crate::ring::{Consumer, Producer, RingBuffer};

/// Statically allocated TX/RX rings plus the overflow counter
///
/// Place this in a `static` (for example through `static_cell::StaticCell`)
/// and [`split`](Self::split) it once at boot.
pub struct SerialBuffers<const TX: usize, const RX: usize> {
    tx: RingBuffer<TX>,
    rx: RingBuffer<RX>,
    dropped: AtomicU16,
}

impl<const TX: usize, const RX: usize> Default for SerialBuffers<TX, RX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const TX: usize, const RX: usize> SerialBuffers<TX, RX> {
    pub const fn new() -> Self {
        Self {
            tx: RingBuffer::new(),
            rx: RingBuffer::new(),
            dropped: AtomicU16::new(0),
        }
    }

    /// Hand out the main-context and interrupt-context endpoints
    pub fn split(&mut self) -> (MainSide<'_, TX, RX>, InterruptSide<'_, TX, RX>) {
        let (tx_producer, tx_consumer) = self.tx.split();
        let (rx_producer, rx_consumer) = self.rx.split();
        let dropped = &self.dropped;
        (
            MainSide {
                tx: tx_producer,
                rx: rx_consumer,
                dropped,
            },
            InterruptSide {
                rx: rx_producer,
                tx: tx_consumer,
                dropped,
            },
        )
    }
}

/// Main-context endpoint: TX producer, RX consumer
pub struct MainSide<'a, const TX: usize, const RX: usize> {
    pub(crate) tx: Producer<'a, TX>,
    pub(crate) rx: Consumer<'a, RX>,
    dropped: &'a AtomicU16,
}

impl<const TX: usize, const RX: usize> MainSide<'_, TX, RX> {
    /// Bytes discarded by the receive handler because the RX ring was full
    pub fn dropped(&self) -> u16 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Interrupt-context endpoint: RX producer, TX consumer
pub struct InterruptSide<'a, const TX: usize, const RX: usize> {
    pub(crate) rx: Producer<'a, RX>,
    pub(crate) tx: Consumer<'a, TX>,
    dropped: &'a AtomicU16,
}

impl<const TX: usize, const RX: usize> InterruptSide<'_, TX, RX> {
    /// Count one dropped byte; the receive handler is the counter's only writer
    pub(crate) fn record_drop(&self) {
        let count = self.dropped.load(Ordering::Relaxed);
        self.dropped.store(count.saturating_add(1), Ordering::Relaxed);
    }
}
