use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use aeris_hal::{BitRate, Command, TwiController};

// AVR TWI master status codes
const START: u8 = 0x08;
const REPEATED_START: u8 = 0x10;
const ADDRESS_WRITE_ACK: u8 = 0x18;
const ADDRESS_WRITE_NACK: u8 = 0x20;
const DATA_WRITE_ACK: u8 = 0x28;
const DATA_WRITE_NACK: u8 = 0x30;
const ADDRESS_READ_ACK: u8 = 0x40;
const ADDRESS_READ_NACK: u8 = 0x48;
const DATA_READ_ACK: u8 = 0x50;
const DATA_READ_NACK: u8 = 0x58;
const BUS_ERROR: u8 = 0x00;

/// A register-mapped slave: 256 byte registers and an auto-incrementing
/// register pointer
#[derive(Debug, Clone)]
struct Device {
    registers: [u8; 256],
    pointer: u8,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            registers: [0; 256],
            pointer: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Started,
    /// Addressed for writing; `false` until the register pointer byte arrives
    Writing(u8, bool),
    Reading(u8),
    /// Address not acknowledged
    Rejected,
}

#[derive(Debug)]
struct BusState {
    rate: Option<BitRate>,
    devices: BTreeMap<u8, Device>,
    commands: Vec<Command>,
    mode: Mode,
    status: u8,
    data: u8,
    complete: bool,
    completions: usize,
    injected: BTreeMap<usize, u8>,
    stalled: bool,
}

impl Default for BusState {
    fn default() -> Self {
        Self {
            rate: None,
            devices: BTreeMap::new(),
            commands: Vec::new(),
            mode: Mode::Idle,
            status: 0xF8,
            data: 0,
            complete: false,
            completions: 0,
            injected: BTreeMap::new(),
            stalled: false,
        }
    }
}

impl BusState {
    fn transmit(&mut self, byte: u8) -> u8 {
        match self.mode {
            Mode::Started => {
                let address = byte >> 1;
                let read = byte & 1 == 1;
                let present = self.devices.contains_key(&address);
                self.mode = match (present, read) {
                    (true, false) => Mode::Writing(address, false),
                    (true, true) => Mode::Reading(address),
                    (false, _) => Mode::Rejected,
                };
                match (present, read) {
                    (true, false) => ADDRESS_WRITE_ACK,
                    (false, false) => ADDRESS_WRITE_NACK,
                    (true, true) => ADDRESS_READ_ACK,
                    (false, true) => ADDRESS_READ_NACK,
                }
            }
            Mode::Writing(address, pointer_set) => {
                if let Some(device) = self.devices.get_mut(&address) {
                    if pointer_set {
                        device.registers[device.pointer as usize] = byte;
                        device.pointer = device.pointer.wrapping_add(1);
                    } else {
                        device.pointer = byte;
                        self.mode = Mode::Writing(address, true);
                    }
                }
                DATA_WRITE_ACK
            }
            Mode::Rejected => DATA_WRITE_NACK,
            Mode::Idle | Mode::Reading(_) => BUS_ERROR,
        }
    }

    fn receive(&mut self, ack: bool) -> u8 {
        let Mode::Reading(address) = self.mode else {
            self.data = 0xFF;
            return BUS_ERROR;
        };
        if let Some(device) = self.devices.get_mut(&address) {
            self.data = device.registers[device.pointer as usize];
            device.pointer = device.pointer.wrapping_add(1);
        }
        if ack {
            DATA_READ_ACK
        } else {
            DATA_READ_NACK
        }
    }
}

/// Simulated TWI controller with devices attached
///
/// Devices behave like typical sensors: the first byte written after the
/// address sets the register pointer, following bytes are stored there,
/// and reads return consecutive registers. Both directions advance the
/// pointer.
///
/// Phases complete instantly unless the bus is [stalled](Self::stall).
/// The prescaler bits of the programmed bit rate show up in the low bits
/// of the status register, as on real parts.
#[derive(Debug, Clone, Default)]
pub struct SimBus {
    state: Rc<RefCell<BusState>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device that acknowledges `address`
    pub fn add_device(&self, address: u8) {
        self.state
            .borrow_mut()
            .devices
            .entry(address)
            .or_default();
    }

    pub fn set_register(&self, address: u8, register: u8, value: u8) {
        self.set_registers(address, register, &[value]);
    }

    /// Preload consecutive registers starting at `register`
    pub fn set_registers(&self, address: u8, register: u8, values: &[u8]) {
        let mut state = self.state.borrow_mut();
        let device = state.devices.entry(address).or_default();
        for (offset, &value) in values.iter().enumerate() {
            device.registers[register.wrapping_add(offset as u8) as usize] = value;
        }
    }

    /// Current register contents; zero for absent devices
    pub fn register(&self, address: u8, register: u8) -> u8 {
        self.state
            .borrow()
            .devices
            .get(&address)
            .map_or(0, |device| device.registers[register as usize])
    }

    /// Every command executed so far, in order
    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    /// Bit rate from the last `configure`
    pub fn bit_rate(&self) -> Option<BitRate> {
        self.state.borrow().rate
    }

    /// Replace the status latched by the `nth` completed phase (counting
    /// from zero, stop conditions excluded)
    pub fn inject_status(&self, nth: usize, code: u8) {
        self.state.borrow_mut().injected.insert(nth, code);
    }

    /// Stop raising the completion flag
    pub fn stall(&self, stalled: bool) {
        self.state.borrow_mut().stalled = stalled;
    }
}

impl TwiController for SimBus {
    fn configure(&mut self, rate: BitRate) {
        self.state.borrow_mut().rate = Some(rate);
    }

    fn execute(&mut self, command: Command) {
        let mut state = self.state.borrow_mut();
        state.commands.push(command);
        state.complete = false;

        let status = match command {
            Command::Start => {
                let status = if state.mode == Mode::Idle {
                    START
                } else {
                    REPEATED_START
                };
                state.mode = Mode::Started;
                status
            }
            Command::Transmit(byte) => state.transmit(byte),
            Command::ReceiveAck => state.receive(true),
            Command::ReceiveNack => state.receive(false),
            Command::Stop => {
                state.mode = Mode::Idle;
                state.status = 0xF8;
                return;
            }
        };

        let nth = state.completions;
        state.completions += 1;
        state.status = state.injected.remove(&nth).unwrap_or(status);
        state.complete = !state.stalled;
    }

    fn is_complete(&mut self) -> bool {
        self.state.borrow().complete
    }

    fn status(&mut self) -> u8 {
        let state = self.state.borrow();
        let prescaler = state.rate.map_or(0, |rate| rate.prescaler.bits());
        state.status | prescaler
    }

    fn data(&mut self) -> u8 {
        self.state.borrow().data
    }
}
