//! Bus master errors

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Transaction step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Start or repeated start condition
    Start,
    /// Address byte with the write bit
    AddressWrite,
    /// Address byte with the read bit
    AddressRead,
    /// Data byte written to the device (register pointer or value)
    Data,
    /// Data byte read from the device
    Receive,
}

/// Errors from bus transactions
///
/// The bus has already been released (stop issued) when a helper returns
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The controller latched a status other than the expected literal
    Status { phase: Phase, code: u8 },
    /// The completion flag never came up within the configured poll budget
    Timeout { phase: Phase },
}

impl BusError {
    /// Raw status byte, as the numeric error convention reports it
    ///
    /// Timeouts have no status; they report `0xFF`.
    pub fn code(&self) -> u8 {
        match self {
            BusError::Status { code, .. } => *code,
            BusError::Timeout { .. } => 0xFF,
        }
    }

    /// Step the transaction failed at
    pub fn phase(&self) -> Phase {
        match self {
            BusError::Status { phase, .. } | BusError::Timeout { phase } => *phase,
        }
    }
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        match self {
            BusError::Status {
                phase: Phase::AddressWrite | Phase::AddressRead,
                ..
            } => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            BusError::Status {
                phase: Phase::Data, ..
            } => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            BusError::Status { .. } => ErrorKind::Bus,
            BusError::Timeout { .. } => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn test_error_kind_mapping() {
        let address = BusError::Status {
            phase: Phase::AddressWrite,
            code: 0x20,
        };
        assert_eq!(
            address.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );

        let data = BusError::Status {
            phase: Phase::Data,
            code: 0x30,
        };
        assert_eq!(data.kind(), ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        assert_eq!(data.code(), 0x30);

        let timeout = BusError::Timeout {
            phase: Phase::Receive,
        };
        assert_eq!(timeout.kind(), ErrorKind::Other);
        assert_eq!(timeout.phase(), Phase::Receive);
    }
}
