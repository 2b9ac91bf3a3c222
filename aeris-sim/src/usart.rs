use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use aeris_hal::usart::{FrameFormat, UsartControl, UsartInterrupts, UsartIsr};
use aeris_hal::Relax;

/// Polls without any interrupt firing before [`InterruptPump`] gives up
const IDLE_LIMIT: u32 = 10_000;

#[derive(Debug, Default)]
struct UsartState {
    divisor: Option<u16>,
    frame: Option<FrameFormat>,
    receive_interrupt: bool,
    transmit_interrupt: bool,
    global_interrupts: bool,
    incoming: VecDeque<u8>,
    transmitted: Vec<u8>,
    data_reads: usize,
}

/// Simulated USART with both register halves
///
/// Bytes passed to [`inject`](Self::inject) wait in the receiver until an
/// interrupt handler reads them; bytes written to the data register are
/// collected in [`transmitted`](Self::transmitted).
#[derive(Debug, Clone, Default)]
pub struct SimUsart {
    state: Rc<RefCell<UsartState>>,
}

impl SimUsart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes arriving from the remote end
    pub fn inject(&self, bytes: &[u8]) {
        self.state.borrow_mut().incoming.extend(bytes);
    }

    /// Everything written to the data register so far
    pub fn transmitted(&self) -> Vec<u8> {
        self.state.borrow().transmitted.clone()
    }

    /// Divisor from the last `configure`, if any
    pub fn divisor(&self) -> Option<u16> {
        self.state.borrow().divisor
    }

    /// Frame format from the last `configure`, if any
    pub fn frame(&self) -> Option<FrameFormat> {
        self.state.borrow().frame
    }

    pub fn receive_interrupt_enabled(&self) -> bool {
        self.state.borrow().receive_interrupt
    }

    pub fn transmit_interrupt_enabled(&self) -> bool {
        self.state.borrow().transmit_interrupt
    }

    pub fn global_interrupts_enabled(&self) -> bool {
        self.state.borrow().global_interrupts
    }

    /// Number of data register reads (one per receive interrupt served)
    pub fn data_reads(&self) -> usize {
        self.state.borrow().data_reads
    }

    /// Whether the receive-complete vector would fire now
    pub fn receive_pending(&self) -> bool {
        let state = self.state.borrow();
        state.global_interrupts && state.receive_interrupt && !state.incoming.is_empty()
    }

    /// Whether the data-register-empty vector would fire now
    ///
    /// The simulated transmitter shifts bytes out instantly, so the data
    /// register is always empty.
    pub fn transmit_pending(&self) -> bool {
        let state = self.state.borrow();
        state.global_interrupts && state.transmit_interrupt
    }
}

impl UsartControl for SimUsart {
    fn configure(&mut self, divisor: u16, frame: FrameFormat) {
        let mut state = self.state.borrow_mut();
        state.divisor = Some(divisor);
        state.frame = Some(frame);
        state.receive_interrupt = true;
        state.transmit_interrupt = false;
    }

    fn enable_transmit_interrupt(&mut self) {
        self.state.borrow_mut().transmit_interrupt = true;
    }

    fn enable_global_interrupts(&mut self) {
        self.state.borrow_mut().global_interrupts = true;
    }
}

impl UsartIsr for SimUsart {
    fn read_data(&mut self) -> u8 {
        let mut state = self.state.borrow_mut();
        state.data_reads += 1;
        state.incoming.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        self.state.borrow_mut().transmitted.push(byte);
    }

    fn disable_transmit_interrupt(&mut self) {
        self.state.borrow_mut().transmit_interrupt = false;
    }
}

/// Interrupt controller stand-in
///
/// Used as the transport's [`Relax`] strategy: every busy-wait iteration
/// gives the simulated hardware a chance to raise its interrupts. A wait
/// that makes no progress for a long time panics instead of hanging the
/// test run.
pub struct InterruptPump<I> {
    wire: SimUsart,
    handlers: I,
    idle: u32,
}

impl<I: UsartInterrupts> InterruptPump<I> {
    pub fn new(wire: SimUsart, handlers: I) -> Self {
        Self {
            wire,
            handlers,
            idle: 0,
        }
    }

    /// Fire every vector that is pending right now, once
    ///
    /// Returns whether anything fired.
    pub fn step(&mut self) -> bool {
        let mut fired = false;
        if self.wire.receive_pending() {
            self.handlers.on_receive();
            fired = true;
        }
        if self.wire.transmit_pending() {
            self.handlers.on_transmit_ready();
            fired = true;
        }
        fired
    }

    /// Fire interrupts until nothing is pending
    pub fn run_until_idle(&mut self) {
        while self.step() {}
    }

    pub fn handlers_mut(&mut self) -> &mut I {
        &mut self.handlers
    }
}

impl<I: UsartInterrupts> Relax for InterruptPump<I> {
    fn relax(&mut self) {
        if self.step() {
            self.idle = 0;
            return;
        }
        self.idle += 1;
        if self.idle >= IDLE_LIMIT {
            panic!("simulated hang: no interrupt fired in {} polls", IDLE_LIMIT);
        }
    }
}
