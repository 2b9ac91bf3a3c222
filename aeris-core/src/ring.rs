//! Fixed-capacity byte ring shared between two execution contexts
//!
//! The ring holds `N` slots and keeps one of them empty so that
//! `head == tail` always means "empty" and `head + 1 == tail` (mod `N`)
//! always means "full", without a separate counter.
//!
//! `head` is only written by the [`Producer`], `tail` only by the
//! [`Consumer`]. Both indices are single bytes, which every supported
//! target loads and stores atomically, so no lock is needed even when one
//! side runs in an interrupt handler.

use portable_atomic::{AtomicU8, Ordering};

/// Lock-free SPSC byte ring with `N - 1` usable slots
pub struct RingBuffer<const N: usize> {
    slots: [AtomicU8; N],
    head: AtomicU8,
    tail: AtomicU8,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const SIZE_OK: () = assert!(N >= 2 && N <= 256, "ring size must be in 2..=256");

    /// Create an empty ring
    ///
    /// Usable in `static` initializers.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SIZE_OK;
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
        }
    }

    /// Number of bytes the ring can hold at once
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of bytes currently queued
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire) as usize;
        let tail = self.tail.load(Ordering::Acquire) as usize;
        (head + N - tail) % N
    }

    /// Check whether the ring holds no bytes
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Check whether another push would be rejected
    pub fn is_full(&self) -> bool {
        advance::<N>(self.head.load(Ordering::Acquire)) == self.tail.load(Ordering::Acquire)
    }

    /// Split into the two endpoints
    ///
    /// Taking `&mut self` guarantees there is exactly one producer and one
    /// consumer for as long as the endpoints live.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }
}

/// Next index modulo `N`
#[inline]
fn advance<const N: usize>(index: u8) -> u8 {
    let next = index as usize + 1;
    if next == N {
        0
    } else {
        next as u8
    }
}

/// Writing endpoint; the only writer of `head`
pub struct Producer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Append one byte
    ///
    /// Hands the byte back if the ring is full. Existing content is never
    /// touched by a rejected push.
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        let head = self.ring.head.load(Ordering::Relaxed);
        let next = advance::<N>(head);
        if next == self.ring.tail.load(Ordering::Acquire) {
            return Err(byte);
        }
        self.ring.slots[head as usize].store(byte, Ordering::Relaxed);
        self.ring.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Check whether the next push would be rejected
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Check whether the consumer has drained everything
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

/// Reading endpoint; the only writer of `tail`
pub struct Consumer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Remove the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        if tail == self.ring.head.load(Ordering::Acquire) {
            return None;
        }
        let byte = self.ring.slots[tail as usize].load(Ordering::Relaxed);
        self.ring.tail.store(advance::<N>(tail), Ordering::Release);
        Some(byte)
    }

    /// Check whether there is nothing to pop
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of bytes waiting
    pub fn len(&self) -> usize {
        self.ring.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[test]
    fn test_empty_ring() {
        let mut ring = RingBuffer::<4>::new();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 3);

        let (_, mut rx) = ring.split();
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_one_slot_is_sacrificed() {
        let mut ring = RingBuffer::<4>::new();
        let (mut tx, _) = ring.split();

        assert_eq!(tx.push(1), Ok(()));
        assert_eq!(tx.push(2), Ok(()));
        assert_eq!(tx.push(3), Ok(()));
        assert!(tx.is_full());
        assert_eq!(tx.push(4), Err(4));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_rejected_push_keeps_content() {
        let mut ring = RingBuffer::<3>::new();
        let (mut tx, mut rx) = ring.split();

        tx.push(0xA1).unwrap();
        tx.push(0xA2).unwrap();
        assert_eq!(tx.push(0xA3), Err(0xA3));

        assert_eq!(rx.pop(), Some(0xA1));
        assert_eq!(rx.pop(), Some(0xA2));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_wraparound() {
        let mut ring = RingBuffer::<4>::new();
        let (mut tx, mut rx) = ring.split();

        for round in 0..10u8 {
            tx.push(round).unwrap();
            tx.push(round.wrapping_add(100)).unwrap();
            assert_eq!(rx.pop(), Some(round));
            assert_eq!(rx.pop(), Some(round.wrapping_add(100)));
        }
        assert!(rx.is_empty());
    }

    #[test]
    fn test_full_size_ring() {
        let mut ring = RingBuffer::<256>::new();
        let (mut tx, mut rx) = ring.split();

        for byte in 0..255u8 {
            tx.push(byte).unwrap();
        }
        assert_eq!(tx.push(0xFF), Err(0xFF));
        for byte in 0..255u8 {
            assert_eq!(rx.pop(), Some(byte));
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(u8),
        Pop,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![any::<u8>().prop_map(Op::Push), Just(Op::Pop)]
    }

    proptest! {
        #[test]
        fn prop_fifo_and_bounded(ops in proptest::collection::vec(op(), 0..400)) {
            let mut ring = RingBuffer::<8>::new();
            let mut model: VecDeque<u8> = VecDeque::new();
            {
                let (mut tx, mut rx) = ring.split();
                for op in ops {
                    match op {
                        Op::Push(byte) => {
                            let result = tx.push(byte);
                            if model.len() < 7 {
                                prop_assert_eq!(result, Ok(()));
                                model.push_back(byte);
                            } else {
                                prop_assert_eq!(result, Err(byte));
                            }
                        }
                        Op::Pop => prop_assert_eq!(rx.pop(), model.pop_front()),
                    }
                    prop_assert!(rx.len() <= 7);
                    prop_assert_eq!(rx.len(), model.len());
                }
            }
            prop_assert_eq!(ring.len(), model.len());
        }

        #[test]
        fn prop_drain_order(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut ring = RingBuffer::<64>::new();
            let (mut tx, mut rx) = ring.split();
            for &byte in &bytes {
                tx.push(byte).unwrap();
            }
            let drained: Vec<u8> = core::iter::from_fn(|| rx.pop()).collect();
            prop_assert_eq!(drained, bytes);
        }
    }
}
