//! Aeris - Environmental Sensor Console Firmware
//!
//! Firmware for ATmega2560 boards with a BME280 on the TWI bus. Scans the
//! bus at boot, then serves a line-oriented console on USART0: each line
//! names the raw readings to print.
//!
//! Named after the Latin "aer" (air).

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use core::cell::RefCell;
use core::fmt::Write as _;

use avr_device::interrupt::Mutex;
use panic_halt as _;
use static_cell::StaticCell;

use aeris_core::{
    BusConfig, BusError, BusMaster, LineConfig, Serial, SerialBuffers, SerialConfig,
    SerialInterrupts,
};
use aeris_drivers::console::{self, Request};
use aeris_drivers::sensor::{Bme280, RawSample};
use aeris_hal::Spin;
use aeris_hal_avr::{pac, usart, CycleDelay, Twi, Usart0Control, Usart0Isr};

const CLOCK_HZ: u32 = 16_000_000;
const BAUD_RATE: u32 = 19_200;

const TX_SIZE: usize = 64;
const RX_SIZE: usize = 64;
const LINE_LEN: usize = 128;

/// Completion polls per bus phase before giving up, a few milliseconds at 16 MHz
const TWI_TIMEOUT_POLLS: u32 = 4_000;

/// Sampling period programmed into the sensor at boot
const STANDBY_MS: u16 = 1000;

type Console = Serial<'static, Usart0Control, Spin, TX_SIZE, RX_SIZE>;
type Sensor = Bme280<BusMaster<Twi, CycleDelay>>;

// Ring storage shared by the main program and the USART vectors
static BUFFERS: StaticCell<SerialBuffers<TX_SIZE, RX_SIZE>> = StaticCell::new();

// Handlers the USART vectors dispatch into, installed once at boot
static HANDLERS: Mutex<RefCell<Option<SerialInterrupts<'static, Usart0Isr, TX_SIZE, RX_SIZE>>>> =
    Mutex::new(RefCell::new(None));

#[avr_device::entry]
fn main() -> ! {
    let Some(dp) = pac::Peripherals::take() else {
        // Entry runs once; the peripherals cannot be taken already
        loop {}
    };

    let (control, isr) = usart::split(dp.USART0);
    let (main_side, isr_side) = BUFFERS.init(SerialBuffers::new()).split();
    avr_device::interrupt::free(|cs| {
        HANDLERS
            .borrow(cs)
            .replace(Some(SerialInterrupts::register(isr_side, isr)));
    });

    let config = SerialConfig {
        baud_rate: BAUD_RATE,
        clock_hz: CLOCK_HZ,
        line: LineConfig::INTERACTIVE,
    };
    let mut serial: Console = Serial::init(main_side, control, Spin, config);

    let bus_config = BusConfig {
        clock_hz: CLOCK_HZ,
        ..BusConfig::STANDARD
    }
    .with_timeout(TWI_TIMEOUT_POLLS);
    let mut bus = BusMaster::init(Twi::new(dp.TWI), CycleDelay::new(CLOCK_HZ), Spin, bus_config);

    let _ = write!(serial, "\r\naeris: {} baud\r\n", BAUD_RATE);
    report_scan(&mut serial, &mut bus);

    let mut sensor = Bme280::primary(bus);
    if let Err(error) = sensor
        .configure()
        .and_then(|()| sensor.set_standby(STANDBY_MS).map(|_| ()))
    {
        report_error(&mut serial, "sensor setup", error);
    }

    let _ = serial.write_str("requests: temp press hum id scan dropped\r\n");

    let mut line = [0u8; LINE_LEN];
    loop {
        let _ = serial.write_str("> ");
        let len = serial.receive_line(&mut line);
        if len == 0 {
            continue;
        }
        handle_line(&mut serial, &mut sensor, &line[..len]);
    }
}

fn handle_line(serial: &mut Console, sensor: &mut Sensor, line: &[u8]) {
    let parsed = console::parse(line);

    if let Some(word) = parsed.unknown {
        let _ = serial.write_str("unknown: ");
        serial.send_bytes(word);
        let _ = serial.write_str("\r\n");
    }

    // One burst serves every reading requested on the line
    let sample = if parsed.requests.iter().any(|r| r.needs_sample()) {
        match sensor.read_raw() {
            Ok(sample) => Some(sample),
            Err(error) => {
                report_error(serial, "read", error);
                return;
            }
        }
    } else {
        None
    };

    for request in parsed.requests.iter().copied() {
        match (request, sample) {
            (Request::Temperature, Some(RawSample { temperature, .. })) => {
                let _ = write!(serial, "temperature raw: {}\r\n", temperature);
            }
            (Request::Pressure, Some(RawSample { pressure, .. })) => {
                let _ = write!(serial, "pressure raw: {}\r\n", pressure);
            }
            (Request::Humidity, Some(RawSample { humidity, .. })) => {
                let _ = write!(serial, "humidity raw: {}\r\n", humidity);
            }
            (Request::ChipId, _) => match sensor.chip_id() {
                Ok(id) => {
                    let _ = write!(serial, "chip id: 0x{:02X}\r\n", id);
                }
                Err(error) => report_error(serial, "chip id", error),
            },
            (Request::Scan, _) => report_scan(serial, sensor.bus_mut()),
            (Request::Dropped, _) => {
                let dropped = serial.dropped();
                let _ = write!(serial, "rx dropped: {}\r\n", dropped);
            }
            _ => {}
        }
    }
}

fn report_scan(serial: &mut Console, bus: &mut BusMaster<Twi, CycleDelay>) {
    match bus.scan() {
        Ok(found) if found.is_empty() => {
            let _ = serial.write_str("scan: no devices\r\n");
        }
        Ok(found) => {
            for address in &found {
                let _ = write!(serial, "scan: device at 0x{:02X}\r\n", address);
            }
        }
        Err(error) => report_error(serial, "scan", error),
    }
}

fn report_error(serial: &mut Console, what: &str, error: BusError) {
    let _ = write!(
        serial,
        "{}: bus error 0x{:02X} ({:?})\r\n",
        what,
        error.code(),
        error.phase()
    );
}

#[avr_device::interrupt(atmega2560)]
fn USART0_RX() {
    avr_device::interrupt::free(|cs| {
        if let Some(handlers) = HANDLERS.borrow(cs).borrow_mut().as_mut() {
            handlers.on_receive();
        }
    });
}

#[avr_device::interrupt(atmega2560)]
fn USART0_UDRE() {
    avr_device::interrupt::free(|cs| {
        if let Some(handlers) = HANDLERS.borrow(cs).borrow_mut().as_mut() {
            handlers.on_transmit_ready();
        }
    });
}
