//! TWI (two-wire interface) master register access

use aeris_hal::{BitRate, Command, TwiController};
use avr_device::atmega2560::TWI;

// TWCR
const TWINT: u8 = 1 << 7;
const TWEA: u8 = 1 << 6;
const TWSTA: u8 = 1 << 5;
const TWSTO: u8 = 1 << 4;
const TWEN: u8 = 1 << 2;

/// TWI peripheral as a [`TwiController`]
///
/// Polled only; the TWI interrupt stays disabled.
pub struct Twi {
    twi: TWI,
}

impl Twi {
    pub fn new(twi: TWI) -> Self {
        Self { twi }
    }

    pub fn free(self) -> TWI {
        self.twi
    }

    fn control(&mut self, bits: u8) {
        self.twi.twcr.write(|w| unsafe { w.bits(bits) });
    }
}

impl TwiController for Twi {
    fn configure(&mut self, rate: BitRate) {
        self.twi
            .twsr
            .write(|w| unsafe { w.bits(rate.prescaler.bits()) });
        self.twi.twbr.write(|w| unsafe { w.bits(rate.divisor) });
        self.control(TWEN);
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Start => self.control(TWINT | TWSTA | TWEN),
            Command::Transmit(byte) => {
                self.twi.twdr.write(|w| unsafe { w.bits(byte) });
                self.control(TWINT | TWEN);
            }
            Command::ReceiveAck => self.control(TWINT | TWEN | TWEA),
            Command::ReceiveNack => self.control(TWINT | TWEN),
            Command::Stop => self.control(TWINT | TWSTO | TWEN),
        }
    }

    fn is_complete(&mut self) -> bool {
        self.twi.twcr.read().bits() & TWINT != 0
    }

    fn status(&mut self) -> u8 {
        self.twi.twsr.read().bits()
    }

    fn data(&mut self) -> u8 {
        self.twi.twdr.read().bits()
    }
}
