//! USART0 register access
//!
//! [`split`] consumes the peripheral and returns two handles: one for the
//! main program and one to move into the interrupt handlers. They write
//! disjoint bits, except `UDRIE0`, which the main side sets and the
//! interrupt side clears. Both do that with a read-modify-write of `UCSR0B`,
//! so the main side runs its update with interrupts masked.

use aeris_hal::usart::{DataBits, FrameFormat, Parity, StopBits, UsartControl, UsartIsr};
use avr_device::atmega2560::{usart0, USART0};

// UCSR0B
const RXCIE0: u8 = 1 << 7;
const UDRIE0: u8 = 1 << 5;
const RXEN0: u8 = 1 << 4;
const TXEN0: u8 = 1 << 3;

// UCSR0C
const UPM01: u8 = 1 << 5;
const UPM00: u8 = 1 << 4;
const USBS0: u8 = 1 << 3;
const UCSZ_SHIFT: u8 = 1;

/// Split USART0 into its main-context and interrupt-context halves
pub fn split(usart: USART0) -> (Usart0Control, Usart0Isr) {
    (
        Usart0Control { _usart: usart },
        Usart0Isr { _private: () },
    )
}

fn registers() -> &'static usart0::RegisterBlock {
    // SAFETY: the owned USART0 singleton was consumed by `split`, and the two
    // halves it returned touch disjoint register bits (see module docs).
    unsafe { &*USART0::ptr() }
}

/// `UCSR0C` value for a frame format (asynchronous mode)
fn frame_bits(frame: FrameFormat) -> u8 {
    let size = match frame.data_bits {
        DataBits::Five => 0b00,
        DataBits::Six => 0b01,
        DataBits::Seven => 0b10,
        DataBits::Eight => 0b11,
    };
    let parity = match frame.parity {
        Parity::None => 0,
        Parity::Even => UPM01,
        Parity::Odd => UPM01 | UPM00,
    };
    let stop = match frame.stop_bits {
        StopBits::One => 0,
        StopBits::Two => USBS0,
    };
    (size << UCSZ_SHIFT) | parity | stop
}

/// Main-context half of USART0
pub struct Usart0Control {
    _usart: USART0,
}

impl UsartControl for Usart0Control {
    fn configure(&mut self, divisor: u16, frame: FrameFormat) {
        let regs = registers();
        regs.ubrr0.write(|w| unsafe { w.bits(divisor) });
        regs.ucsr0c.write(|w| unsafe { w.bits(frame_bits(frame)) });
        // UCSZ02 clear (no 9-bit frames), UDRIE0 clear until data is queued
        regs.ucsr0b
            .write(|w| unsafe { w.bits(RXEN0 | TXEN0 | RXCIE0) });
    }

    fn enable_transmit_interrupt(&mut self) {
        avr_device::interrupt::free(|_| {
            registers()
                .ucsr0b
                .modify(|r, w| unsafe { w.bits(r.bits() | UDRIE0) });
        });
    }

    fn enable_global_interrupts(&mut self) {
        // SAFETY: called once at the end of initialization, after the ring
        // buffers and handlers the vectors dispatch into are in place.
        unsafe { avr_device::interrupt::enable() };
    }
}

/// Interrupt-context half of USART0
pub struct Usart0Isr {
    _private: (),
}

impl UsartIsr for Usart0Isr {
    fn read_data(&mut self) -> u8 {
        registers().udr0.read().bits()
    }

    fn write_data(&mut self, byte: u8) {
        registers().udr0.write(|w| unsafe { w.bits(byte) });
    }

    fn disable_transmit_interrupt(&mut self) {
        // Already running with interrupts masked
        registers()
            .ucsr0b
            .modify(|r, w| unsafe { w.bits(r.bits() & !UDRIE0) });
    }
}
