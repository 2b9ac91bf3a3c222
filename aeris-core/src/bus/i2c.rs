//! `embedded-hal` I2C bindings for the bus master
//!
//! Lets third-party sensor drivers written against `embedded_hal::i2c::I2c`
//! run on [`BusMaster`] unchanged.

use aeris_hal::{Direction, Relax, TwiController};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation};

use super::error::BusError;
use super::master::BusMaster;

impl<T, D, R> ErrorType for BusMaster<T, D, R>
where
    T: TwiController,
    D: DelayNs,
    R: Relax,
{
    type Error = BusError;
}

impl<T, D, R> I2c for BusMaster<T, D, R>
where
    T: TwiController,
    D: DelayNs,
    R: Relax,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !operations.iter().any(touches_bus) {
            return Ok(());
        }
        let result = self.run_operations(address, operations);
        self.finish(result)
    }
}

impl<T, D, R> BusMaster<T, D, R>
where
    T: TwiController,
    D: DelayNs,
    R: Relax,
{
    /// Adjacent operations in the same direction share one address phase;
    /// a change of direction issues a repeated start.
    fn run_operations(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), BusError> {
        let mut direction = None;

        for index in 0..operations.len() {
            let more_reads = reads_follow(&operations[index + 1..]);

            match &mut operations[index] {
                Operation::Write(bytes) => {
                    if direction != Some(Direction::Write) {
                        self.address(address, Direction::Write)?;
                        direction = Some(Direction::Write);
                    }
                    for &byte in bytes.iter() {
                        self.write_checked(byte)?;
                    }
                }
                Operation::Read(buf) => {
                    if buf.is_empty() {
                        continue;
                    }
                    if direction != Some(Direction::Read) {
                        self.address(address, Direction::Read)?;
                        direction = Some(Direction::Read);
                    }
                    let last = buf.len() - 1;
                    for (i, slot) in buf.iter_mut().enumerate() {
                        *slot = if i == last && !more_reads {
                            self.read_nack()?
                        } else {
                            self.read_ack()?
                        };
                    }
                }
            }
        }
        Ok(())
    }
}

/// Whether an operation needs an address phase; an empty write still does
fn touches_bus(operation: &Operation<'_>) -> bool {
    match operation {
        Operation::Write(_) => true,
        Operation::Read(buf) => !buf.is_empty(),
    }
}

/// Whether the read run continues into `rest` with at least one more byte
fn reads_follow(rest: &[Operation<'_>]) -> bool {
    rest.iter()
        .take_while(|op| matches!(op, Operation::Read(_)))
        .any(|op| matches!(op, Operation::Read(buf) if !buf.is_empty()))
}
