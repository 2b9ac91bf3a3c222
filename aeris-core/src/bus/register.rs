//! Register-oriented bus access

use super::error::BusError;

/// Byte-addressed register access to devices on a two-wire bus
///
/// Drivers are written against this trait so they work with
/// [`BusMaster`](super::BusMaster) on hardware and with fakes in tests.
pub trait RegisterBus {
    /// Write one register
    fn write_register(&mut self, device: u8, register: u8, value: u8) -> Result<(), BusError>;

    /// Read one register
    fn read_register(&mut self, device: u8, register: u8) -> Result<u8, BusError>;

    /// Read `buf.len()` consecutive registers starting at `register`, in
    /// one transaction
    fn read_registers(&mut self, device: u8, register: u8, buf: &mut [u8])
        -> Result<(), BusError>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn write_register(&mut self, device: u8, register: u8, value: u8) -> Result<(), BusError> {
        (**self).write_register(device, register, value)
    }

    fn read_register(&mut self, device: u8, register: u8) -> Result<u8, BusError> {
        (**self).read_register(device, register)
    }

    fn read_registers(
        &mut self,
        device: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        (**self).read_registers(device, register, buf)
    }
}
