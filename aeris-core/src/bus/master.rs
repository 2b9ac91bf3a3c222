//! Bus master primitives and register helpers

use aeris_hal::{Command, Direction, Relax, Spin, TwiController};
use embedded_hal::delay::DelayNs;
use heapless::Vec;

use super::config::BusConfig;
use super::error::{BusError, Phase};
use super::register::RegisterBus;
use crate::timing::bit_rate;

/// Pause between two scan probes, in milliseconds
pub const SCAN_INTERVAL_MS: u32 = 5;

/// Lowest address probed by a scan (0x00 is general call)
const SCAN_FIRST: u8 = 0x01;

/// Highest address probed by a scan (0x7F is reserved)
const SCAN_LAST: u8 = 0x7E;

/// Single-master two-wire bus engine
///
/// Every primitive busy-waits on the controller's completion flag through
/// `R`. With [`BusConfig::timeout_polls`] unset the wait is unbounded and a
/// controller that never completes hangs the caller.
pub struct BusMaster<T, D, R = Spin> {
    twi: T,
    delay: D,
    relax: R,
    config: BusConfig,
}

impl<T, D, R> BusMaster<T, D, R>
where
    T: TwiController,
    D: DelayNs,
    R: Relax,
{
    /// Program bus timing for `config.bus_hz`; the bus starts idle
    pub fn init(mut twi: T, delay: D, relax: R, config: BusConfig) -> Self {
        let rate = bit_rate(config.clock_hz, config.bus_hz);
        twi.configure(rate);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "bus: {} Hz requested, prescaler {}, divisor {}",
            config.bus_hz,
            rate.prescaler,
            rate.divisor
        );

        Self {
            twi,
            delay,
            relax,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Give back the peripheral, delay and wait strategy
    pub fn release(self) -> (T, D, R) {
        (self.twi, self.delay, self.relax)
    }

    /// Start condition followed by the address byte
    ///
    /// Returns the status latched after the address phase; the caller
    /// decides whether it means "acknowledged". Also used mid-transaction
    /// as a repeated start.
    pub fn start(&mut self, address: u8, direction: Direction) -> Result<u8, BusError> {
        self.twi.execute(Command::Start);
        self.wait(Phase::Start)?;

        self.twi
            .execute(Command::Transmit(direction.address_byte(address)));
        self.wait(match direction {
            Direction::Write => Phase::AddressWrite,
            Direction::Read => Phase::AddressRead,
        })?;

        Ok(self.status())
    }

    /// Send one data byte; returns the latched status
    ///
    /// This shadows `embedded_hal::i2c::I2c::write`; call the trait method
    /// as `I2c::write(&mut master, address, bytes)`.
    pub fn write(&mut self, byte: u8) -> Result<u8, BusError> {
        self.twi.execute(Command::Transmit(byte));
        self.wait(Phase::Data)?;
        Ok(self.status())
    }

    /// Receive one byte and acknowledge it (more bytes wanted)
    pub fn read_ack(&mut self) -> Result<u8, BusError> {
        self.twi.execute(Command::ReceiveAck);
        self.wait(Phase::Receive)?;
        Ok(self.twi.data())
    }

    /// Receive one byte without acknowledging it (last byte of a read)
    pub fn read_nack(&mut self) -> Result<u8, BusError> {
        self.twi.execute(Command::ReceiveNack);
        self.wait(Phase::Receive)?;
        Ok(self.twi.data())
    }

    /// Stop condition, then the settling delay the controller needs
    pub fn stop(&mut self) {
        self.twi.execute(Command::Stop);
        self.delay.delay_us(self.config.settle_us);
    }

    /// `start(write) → write(register) → write(value) → stop`
    pub fn write_register(&mut self, device: u8, register: u8, value: u8) -> Result<(), BusError> {
        let result = self.write_register_steps(device, register, value);
        self.finish(result)
    }

    /// `start(write) → write(register) → start(read) → read_nack → stop`
    ///
    /// The repeated start keeps the bus between setting the register
    /// pointer and reading it.
    pub fn read_register(&mut self, device: u8, register: u8) -> Result<u8, BusError> {
        let result = self.read_register_steps(device, register);
        self.finish(result)
    }

    /// Read `buf.len()` consecutive registers in one transaction
    ///
    /// All bytes but the last are acknowledged; the last is not, which
    /// tells the device to stop sending. An empty `buf` touches nothing.
    pub fn read_registers(
        &mut self,
        device: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        if buf.is_empty() {
            return Ok(());
        }
        let result = self.read_registers_steps(device, register, buf);
        self.finish(result)
    }

    /// [`read_registers`](Self::read_registers) into a fixed-size array
    pub fn read_array<const N: usize>(
        &mut self,
        device: u8,
        register: u8,
    ) -> Result<[u8; N], BusError> {
        let mut buf = [0u8; N];
        self.read_registers(device, register, &mut buf)?;
        Ok(buf)
    }

    /// Check whether a device acknowledges its write address
    ///
    /// The bus is released before returning, even on timeout.
    pub fn probe(&mut self, address: u8) -> Result<bool, BusError> {
        let status = self.start(address, Direction::Write);
        self.stop();
        Ok(self.config.status.is_address_ack(status?))
    }

    /// Probe every assignable 7-bit address, lowest first
    ///
    /// Returns the addresses that answered. A timeout aborts the scan.
    pub fn scan(&mut self) -> Result<Vec<u8, 128>, BusError> {
        let mut found = Vec::new();
        for address in SCAN_FIRST..=SCAN_LAST {
            if self.probe(address)? {
                // 126 candidates always fit
                let _ = found.push(address);
            }
            self.delay.delay_ms(SCAN_INTERVAL_MS);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("bus: scan found {} device(s)", found.len());

        Ok(found)
    }

    /// Address `device` and require the acknowledge literal for `direction`
    pub(crate) fn address(&mut self, device: u8, direction: Direction) -> Result<(), BusError> {
        let status = self.start(device, direction)?;
        let codes = self.config.status;
        match direction {
            Direction::Write => Self::expect(status, codes.start_write_ack, Phase::AddressWrite),
            Direction::Read => Self::expect(status, codes.start_read_ack, Phase::AddressRead),
        }
    }

    /// Write one data byte and require the data acknowledge literal
    pub(crate) fn write_checked(&mut self, byte: u8) -> Result<(), BusError> {
        let status = self.write(byte)?;
        Self::expect(status, self.config.status.data_write_ack, Phase::Data)
    }

    /// Release the bus and pass `result` through
    pub(crate) fn finish<V>(&mut self, result: Result<V, BusError>) -> Result<V, BusError> {
        self.stop();

        #[cfg(feature = "defmt")]
        if let Err(error) = &result {
            defmt::debug!("bus: transaction aborted: {}", error);
        }

        result
    }

    fn write_register_steps(&mut self, device: u8, register: u8, value: u8) -> Result<(), BusError> {
        self.select_register(device, register)?;
        self.write_checked(value)
    }

    fn read_register_steps(&mut self, device: u8, register: u8) -> Result<u8, BusError> {
        self.open_read(device, register)?;
        self.read_nack()
    }

    fn read_registers_steps(
        &mut self,
        device: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.open_read(device, register)?;
        if let Some((last, head)) = buf.split_last_mut() {
            for slot in head {
                *slot = self.read_ack()?;
            }
            *last = self.read_nack()?;
        }
        Ok(())
    }

    /// Address the device for writing and send the register pointer
    fn select_register(&mut self, device: u8, register: u8) -> Result<(), BusError> {
        self.address(device, Direction::Write)?;
        self.write_checked(register)
    }

    /// Set the register pointer, then re-address for reading (repeated start)
    fn open_read(&mut self, device: u8, register: u8) -> Result<(), BusError> {
        self.select_register(device, register)?;
        self.address(device, Direction::Read)
    }

    fn expect(status: u8, expected: u8, phase: Phase) -> Result<(), BusError> {
        if status == expected {
            Ok(())
        } else {
            Err(BusError::Status {
                phase,
                code: status,
            })
        }
    }

    fn status(&mut self) -> u8 {
        self.twi.status() & self.config.status.mask
    }

    fn wait(&mut self, phase: Phase) -> Result<(), BusError> {
        let mut polls: u32 = 0;
        while !self.twi.is_complete() {
            if let Some(limit) = self.config.timeout_polls {
                if polls >= limit {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("bus: no completion after {} polls in {}", limit, phase);
                    return Err(BusError::Timeout { phase });
                }
                polls += 1;
            }
            self.relax.relax();
        }
        Ok(())
    }
}

impl<T, D, R> RegisterBus for BusMaster<T, D, R>
where
    T: TwiController,
    D: DelayNs,
    R: Relax,
{
    fn write_register(&mut self, device: u8, register: u8, value: u8) -> Result<(), BusError> {
        BusMaster::write_register(self, device, register, value)
    }

    fn read_register(&mut self, device: u8, register: u8) -> Result<u8, BusError> {
        BusMaster::read_register(self, device, register)
    }

    fn read_registers(
        &mut self,
        device: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        BusMaster::read_registers(self, device, register, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::StatusCodes;
    use crate::measurement::raw20;
    use aeris_hal::Prescaler;
    use aeris_sim::{SimBus, SimDelay};

    const SENSOR: u8 = 0x76;

    fn master(bus: &SimBus, delay: &SimDelay, config: BusConfig) -> BusMaster<SimBus, SimDelay> {
        BusMaster::init(bus.clone(), delay.clone(), Spin, config)
    }

    fn bus_with_sensor() -> SimBus {
        let bus = SimBus::new();
        bus.add_device(SENSOR);
        bus
    }

    #[test]
    fn test_init_programs_bit_rate() {
        let bus = SimBus::new();
        let _master = master(&bus, &SimDelay::new(), BusConfig::default());

        let rate = bus.bit_rate().unwrap();
        assert_eq!(rate.prescaler, Prescaler::Div1);
        assert_eq!(rate.divisor, 72);
        assert!(bus.commands().is_empty());
    }

    #[test]
    fn test_primitives_report_raw_status() {
        let bus = bus_with_sensor();
        bus.set_register(SENSOR, 0xD0, 0x60);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        assert_eq!(master.start(SENSOR, Direction::Write), Ok(0x18));
        assert_eq!(master.write(0xD0), Ok(0x28));
        assert_eq!(master.start(SENSOR, Direction::Read), Ok(0x40));
        assert_eq!(master.read_nack(), Ok(0x60));
        master.stop();

        // An absent device is reported, not rejected, by the primitive
        assert_eq!(master.start(0x10, Direction::Write), Ok(0x20));
        master.stop();
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let bus = bus_with_sensor();
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        assert_eq!(master.write_register(SENSOR, 0xF4, 0x27), Ok(()));
        assert_eq!(bus.register(SENSOR, 0xF4), 0x27);
        assert_eq!(master.read_register(SENSOR, 0xF4), Ok(0x27));
    }

    #[test]
    fn test_write_register_sequence() {
        let bus = bus_with_sensor();
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        master.write_register(SENSOR, 0xF2, 0x01).unwrap();
        assert_eq!(
            bus.commands(),
            [
                Command::Start,
                Command::Transmit(0xEC),
                Command::Transmit(0xF2),
                Command::Transmit(0x01),
                Command::Stop,
            ]
        );
    }

    #[test]
    fn test_read_registers_acks_all_but_last() {
        let bus = bus_with_sensor();
        bus.set_registers(SENSOR, 0xFA, &[0x7F, 0xE0, 0x00]);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        let mut raw = [0u8; 3];
        master.read_registers(SENSOR, 0xFA, &mut raw).unwrap();
        assert_eq!(raw, [0x7F, 0xE0, 0x00]);
        assert_eq!(raw20(raw), 0x7FE00);

        assert_eq!(
            bus.commands(),
            [
                Command::Start,
                Command::Transmit(0xEC),
                Command::Transmit(0xFA),
                Command::Start,
                Command::Transmit(0xED),
                Command::ReceiveAck,
                Command::ReceiveAck,
                Command::ReceiveNack,
                Command::Stop,
            ]
        );
    }

    #[test]
    fn test_read_registers_empty_is_noop() {
        let bus = bus_with_sensor();
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        assert_eq!(master.read_registers(SENSOR, 0x88, &mut []), Ok(()));
        assert!(bus.commands().is_empty());
    }

    #[test]
    fn test_read_array() {
        let bus = bus_with_sensor();
        bus.set_registers(SENSOR, 0x88, &[0x70, 0x6B]);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        assert_eq!(master.read_array::<2>(SENSOR, 0x88), Ok([0x70, 0x6B]));
    }

    #[test]
    fn test_missing_device_aborts_after_address() {
        let bus = SimBus::new();
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        let result = master.write_register(SENSOR, 0xF4, 0x27);
        assert_eq!(
            result,
            Err(BusError::Status {
                phase: Phase::AddressWrite,
                code: 0x20
            })
        );
        assert_eq!(result.unwrap_err().code(), 0x20);
        assert_eq!(
            bus.commands(),
            [Command::Start, Command::Transmit(0xEC), Command::Stop]
        );
    }

    #[test]
    fn test_unexpected_address_status_stops_transaction() {
        let bus = bus_with_sensor();
        // Completion 0 is the start condition, 1 the address byte
        bus.inject_status(1, 0x38);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        let result = master.write_register(SENSOR, 0xF4, 0x27);
        assert_eq!(result.map_err(|e| e.code()), Err(0x38));
        assert_eq!(
            bus.commands(),
            [Command::Start, Command::Transmit(0xEC), Command::Stop]
        );
        assert_eq!(bus.register(SENSOR, 0xF4), 0x00);
    }

    #[test]
    fn test_data_nack_aborts_write() {
        let bus = bus_with_sensor();
        // start, address, register, value
        bus.inject_status(3, 0x30);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        assert_eq!(
            master.write_register(SENSOR, 0xF4, 0x27),
            Err(BusError::Status {
                phase: Phase::Data,
                code: 0x30
            })
        );
        assert_eq!(bus.commands().last(), Some(&Command::Stop));
    }

    #[test]
    fn test_read_address_failure_skips_receive() {
        let bus = bus_with_sensor();
        // start, address, register, repeated start, read address
        bus.inject_status(4, 0x48);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        let mut buf = [0u8; 3];
        assert_eq!(
            master.read_registers(SENSOR, 0xF7, &mut buf),
            Err(BusError::Status {
                phase: Phase::AddressRead,
                code: 0x48
            })
        );
        let commands = bus.commands();
        assert!(!commands
            .iter()
            .any(|c| matches!(c, Command::ReceiveAck | Command::ReceiveNack)));
        assert_eq!(commands.last(), Some(&Command::Stop));
    }

    #[test]
    fn test_stop_waits_settling_time() {
        let bus = bus_with_sensor();
        let delay = SimDelay::new();
        let mut master = master(&bus, &delay, BusConfig::default());

        master.read_register(SENSOR, 0xD0).unwrap();
        assert_eq!(delay.total_us(), 10);
    }

    #[test]
    fn test_status_masks_prescaler_bits() {
        let bus = bus_with_sensor();
        bus.set_register(SENSOR, 0xE7, 0x1E);
        let config = BusConfig {
            bus_hz: 10_000,
            ..BusConfig::default()
        };
        let mut master = master(&bus, &SimDelay::new(), config);

        assert_eq!(bus.bit_rate().unwrap().prescaler, Prescaler::Div4);
        assert_eq!(master.read_register(SENSOR, 0xE7), Ok(0x1E));
    }

    #[test]
    fn test_custom_status_codes() {
        let bus = bus_with_sensor();
        let config = BusConfig {
            status: StatusCodes {
                start_write_ack: 0x99,
                ..StatusCodes::AVR_TWI
            },
            ..BusConfig::default()
        };
        let mut master = master(&bus, &SimDelay::new(), config);

        assert_eq!(
            master.write_register(SENSOR, 0xF4, 0x27),
            Err(BusError::Status {
                phase: Phase::AddressWrite,
                code: 0x18
            })
        );
    }

    #[test]
    fn test_timeout_releases_bus() {
        let bus = bus_with_sensor();
        bus.stall(true);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default().with_timeout(50));

        assert_eq!(
            master.write_register(SENSOR, 0xF4, 0x27),
            Err(BusError::Timeout {
                phase: Phase::Start
            })
        );
        assert_eq!(bus.commands(), [Command::Start, Command::Stop]);
    }

    #[test]
    fn test_scan_reports_present_devices() {
        let bus = SimBus::new();
        bus.add_device(0x3C);
        bus.add_device(SENSOR);
        let delay = SimDelay::new();
        let mut master = master(&bus, &delay, BusConfig::default());

        let found = master.scan().unwrap();
        assert_eq!(found.as_slice(), &[0x3C, SENSOR]);

        let stops = bus
            .commands()
            .iter()
            .filter(|c| **c == Command::Stop)
            .count();
        assert_eq!(stops, 126);
        assert_eq!(delay.total_us(), 126 * (SCAN_INTERVAL_MS as u64 * 1_000 + 10));
    }

    #[test]
    fn test_probe() {
        let bus = bus_with_sensor();
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        assert_eq!(master.probe(SENSOR), Ok(true));
        assert_eq!(master.probe(0x77), Ok(false));
    }

    #[test]
    fn test_register_bus_through_reference() {
        fn bump<B: RegisterBus>(mut bus: B) -> Result<u8, BusError> {
            let value = bus.read_register(SENSOR, 0x10)?;
            bus.write_register(SENSOR, 0x10, value + 1)?;
            bus.read_register(SENSOR, 0x10)
        }

        let bus = bus_with_sensor();
        bus.set_register(SENSOR, 0x10, 41);
        let mut master = master(&bus, &SimDelay::new(), BusConfig::default());

        assert_eq!(bump(&mut master), Ok(42));
    }
}
