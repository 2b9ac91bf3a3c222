//! Main-context half of the transport

use core::convert::Infallible;

use aeris_hal::{FrameFormat, Relax, UsartControl};

use super::buffers::MainSide;
use super::config::{LineConfig, SerialConfig};
use crate::timing::baud_divisor;

/// Backspace as sent by most terminals
const BACKSPACE: u8 = 0x08;
/// DEL, sent by terminals configured for "^?" erase
const DELETE: u8 = 0x7F;
/// Step back, blank the cell, step back again
const ERASE: &[u8] = b"\x08 \x08";

/// Serial console link
///
/// All waits are unbounded busy-waits delegated to `R`. Callers who need
/// a bounded wait poll with [`try_receive_byte`](Self::try_receive_byte) /
/// [`try_send_byte`](Self::try_send_byte) instead.
pub struct Serial<'a, H, R, const TX: usize, const RX: usize> {
    side: MainSide<'a, TX, RX>,
    hw: H,
    relax: R,
    line: LineConfig,
}

impl<'a, H, R, const TX: usize, const RX: usize> Serial<'a, H, R, TX, RX>
where
    H: UsartControl,
    R: Relax,
{
    /// Configure the USART for 8N1 at `config.baud_rate` and enable interrupts
    ///
    /// The receive interrupt is armed immediately; the transmit-ready
    /// interrupt stays off until the first byte is queued.
    pub fn init(side: MainSide<'a, TX, RX>, mut hw: H, relax: R, config: SerialConfig) -> Self {
        let divisor = baud_divisor(config.clock_hz, config.baud_rate);
        hw.configure(divisor, FrameFormat::EIGHT_N_ONE);
        hw.enable_global_interrupts();

        #[cfg(feature = "defmt")]
        defmt::debug!("serial: {} baud, divisor {}", config.baud_rate, divisor);

        Self {
            side,
            hw,
            relax,
            line: config.line,
        }
    }

    /// Queue one byte, waiting for room if the TX ring is full
    ///
    /// Never drops data; a slow host only delays the caller.
    pub fn send_byte(&mut self, byte: u8) {
        let mut pending = byte;
        loop {
            match self.side.tx.push(pending) {
                Ok(()) => break,
                Err(byte) => {
                    pending = byte;
                    self.relax.relax();
                }
            }
        }
        self.hw.enable_transmit_interrupt();
    }

    /// Queue one byte if there is room, handing it back otherwise
    pub fn try_send_byte(&mut self, byte: u8) -> Result<(), u8> {
        self.side.tx.push(byte)?;
        self.hw.enable_transmit_interrupt();
        Ok(())
    }

    /// Queue every byte of `bytes`, in order
    pub fn send_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.send_byte(byte);
        }
    }

    /// Queue a string as-is; no framing or line ending is added
    pub fn send_str(&mut self, s: &str) {
        self.send_bytes(s.as_bytes());
    }

    /// Wait until the interrupt handler has taken every queued byte
    ///
    /// The last byte may still be shifting out when this returns.
    pub fn flush(&mut self) {
        while !self.side.tx.is_empty() {
            self.relax.relax();
        }
    }

    /// Take the oldest received byte, waiting for one if necessary
    pub fn receive_byte(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.side.rx.pop() {
                return byte;
            }
            self.relax.relax();
        }
    }

    /// Take the oldest received byte if one is waiting
    pub fn try_receive_byte(&mut self) -> Option<u8> {
        self.side.rx.pop()
    }

    /// Whether a received byte is waiting
    pub fn available(&self) -> bool {
        !self.side.rx.is_empty()
    }

    /// Read one line into `buf`
    ///
    /// Stops at CR or LF (consumed, not stored) or once `buf.len() - 1`
    /// bytes are stored; a `0` marker is written after the stored bytes.
    /// Returns the number of bytes stored. Echo and backspace handling
    /// follow the [`LineConfig`] given at init.
    pub fn receive_line(&mut self, buf: &mut [u8]) -> usize {
        let Some(limit) = buf.len().checked_sub(1) else {
            return 0;
        };

        let mut len = 0;
        while len < limit {
            let byte = self.receive_byte();
            match byte {
                b'\r' | b'\n' => {
                    if self.line.echo {
                        self.send_bytes(b"\r\n");
                    }
                    break;
                }
                BACKSPACE | DELETE if self.line.backspace => {
                    if len > 0 {
                        len -= 1;
                        if self.line.echo {
                            self.send_bytes(ERASE);
                        }
                    }
                }
                _ => {
                    buf[len] = byte;
                    len += 1;
                    if self.line.echo {
                        self.send_byte(byte);
                    }
                }
            }
        }

        buf[len] = 0;
        len
    }

    /// Bytes lost to RX overflow since boot (saturating)
    pub fn dropped(&self) -> u16 {
        self.side.dropped()
    }

    /// Current line input policy
    pub fn line_config(&self) -> LineConfig {
        self.line
    }

    /// Change the line input policy
    pub fn set_line_config(&mut self, line: LineConfig) {
        self.line = line;
    }

    /// Access the wait strategy
    pub fn relax_mut(&mut self) -> &mut R {
        &mut self.relax
    }
}

impl<H: UsartControl, R: Relax, const TX: usize, const RX: usize> core::fmt::Write
    for Serial<'_, H, R, TX, RX>
{
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.send_str(s);
        Ok(())
    }
}

impl<H, R, const TX: usize, const RX: usize> embedded_io::ErrorType for Serial<'_, H, R, TX, RX> {
    type Error = Infallible;
}

impl<H: UsartControl, R: Relax, const TX: usize, const RX: usize> embedded_io::Read
    for Serial<'_, H, R, TX, RX>
{
    /// Waits for the first byte, then takes whatever else is already queued
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some((first, rest)) = buf.split_first_mut() else {
            return Ok(0);
        };
        *first = self.receive_byte();

        let mut count = 1;
        for slot in rest {
            match self.side.rx.pop() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl<H: UsartControl, R: Relax, const TX: usize, const RX: usize> embedded_io::ReadReady
    for Serial<'_, H, R, TX, RX>
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.available())
    }
}

impl<H: UsartControl, R: Relax, const TX: usize, const RX: usize> embedded_io::Write
    for Serial<'_, H, R, TX, RX>
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.send_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Serial::flush(self);
        Ok(())
    }
}
