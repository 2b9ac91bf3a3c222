//! Bosch BME280 temperature / pressure / humidity sensor
//!
//! Register-level access only: the driver configures the sensor for
//! continuous ("normal") measurement and reads the raw ADC words. Turning
//! those into physical units needs the factory calibration table, which
//! [`Bme280::calibration_word`] reads but this driver does not interpret.

use aeris_core::measurement::{i16_le, raw16_be, raw20, u16_le};
use aeris_core::{BusError, RegisterBus};

/// SDO tied to ground
pub const ADDRESS_PRIMARY: u8 = 0x76;
/// SDO tied to VDDIO
pub const ADDRESS_SECONDARY: u8 = 0x77;

/// Value of [`REG_CHIP_ID`] on a BME280
pub const CHIP_ID: u8 = 0x60;

const REG_CHIP_ID: u8 = 0xD0;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
/// First of the 8 data registers: press[3], temp[3], hum[2]
const REG_DATA: u8 = 0xF7;
const REG_TEMP: u8 = 0xFA;

/// Humidity oversampling x1
const CTRL_HUM_DEFAULT: u8 = 0x01;
/// Temperature and pressure oversampling x1, normal mode
const CTRL_MEAS_DEFAULT: u8 = 0x27;

/// Inactive time between two conversions in normal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Standby {
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
}

impl Standby {
    /// Map a period in milliseconds; unsupported values fall back to 1 s
    pub fn from_ms(ms: u16) -> Self {
        match ms {
            125 => Standby::Ms125,
            250 => Standby::Ms250,
            500 => Standby::Ms500,
            _ => Standby::Ms1000,
        }
    }

    /// `config` register value (t_sb bits, filter off)
    pub fn config_bits(self) -> u8 {
        match self {
            Standby::Ms125 => 0x40,
            Standby::Ms250 => 0x60,
            Standby::Ms500 => 0x80,
            Standby::Ms1000 => 0xA0,
        }
    }
}

/// Uncompensated ADC words from one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// 20-bit pressure word
    pub pressure: u32,
    /// 20-bit temperature word
    pub temperature: u32,
    /// 16-bit humidity word
    pub humidity: u16,
}

impl RawSample {
    fn from_burst(data: [u8; 8]) -> Self {
        Self {
            pressure: raw20([data[0], data[1], data[2]]),
            temperature: raw20([data[3], data[4], data[5]]),
            humidity: raw16_be([data[6], data[7]]),
        }
    }
}

/// BME280 on a register bus
pub struct Bme280<B> {
    bus: B,
    address: u8,
}

impl<B: RegisterBus> Bme280<B> {
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Sensor at [`ADDRESS_PRIMARY`]
    pub fn primary(bus: B) -> Self {
        Self::new(bus, ADDRESS_PRIMARY)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Identification register; [`CHIP_ID`] for a genuine BME280
    pub fn chip_id(&mut self) -> Result<u8, BusError> {
        self.bus.read_register(self.address, REG_CHIP_ID)
    }

    /// Start continuous measurement with x1 oversampling on all channels
    ///
    /// `ctrl_hum` only takes effect after a `ctrl_meas` write, so the order
    /// matters.
    pub fn configure(&mut self) -> Result<(), BusError> {
        self.bus
            .write_register(self.address, REG_CTRL_HUM, CTRL_HUM_DEFAULT)?;
        self.bus
            .write_register(self.address, REG_CTRL_MEAS, CTRL_MEAS_DEFAULT)
    }

    /// Set the standby period; returns the period actually selected
    pub fn set_standby(&mut self, ms: u16) -> Result<Standby, BusError> {
        let standby = Standby::from_ms(ms);
        self.bus
            .write_register(self.address, REG_CONFIG, standby.config_bits())?;
        Ok(standby)
    }

    /// All three raw words, read in one burst so they belong together
    pub fn read_raw(&mut self) -> Result<RawSample, BusError> {
        let mut data = [0u8; 8];
        self.bus.read_registers(self.address, REG_DATA, &mut data)?;
        Ok(RawSample::from_burst(data))
    }

    /// Raw temperature word alone
    pub fn read_raw_temperature(&mut self) -> Result<u32, BusError> {
        let mut data = [0u8; 3];
        self.bus.read_registers(self.address, REG_TEMP, &mut data)?;
        Ok(raw20(data))
    }

    /// Unsigned calibration word at `register`, `register + 1`
    pub fn calibration_word(&mut self, register: u8) -> Result<u16, BusError> {
        let mut data = [0u8; 2];
        self.bus.read_registers(self.address, register, &mut data)?;
        Ok(u16_le(data))
    }

    /// Signed calibration word at `register`, `register + 1`
    pub fn calibration_word_signed(&mut self, register: u8) -> Result<i16, BusError> {
        let mut data = [0u8; 2];
        self.bus.read_registers(self.address, register, &mut data)?;
        Ok(i16_le(data))
    }

    /// Borrow the bus for other traffic between readings
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }
}
