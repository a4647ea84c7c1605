// src/common/error.rs

use super::transceiver::TransceiverError;

/// Errors produced by the Modbus RTU engine.
///
/// `E` is the error type of the serial link implementation. Validation that
/// never touches the link (addresses, requests) returns `ModbusError<()>`.
#[derive(Debug, thiserror::Error)]
pub enum ModbusError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the serial link.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// A direction control line could not be driven.
    #[error("Transceiver error: {0}")]
    Transceiver(TransceiverError),

    /// The link accepted fewer bytes than the request frame holds.
    #[error("Short write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    /// No complete response arrived within the response timeout.
    #[error("Response timed out")]
    Timeout,

    /// Trailing CRC does not match the CRC of the preceding bytes.
    #[error("CRC mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    CrcMismatch { expected: u16, calculated: u16 },

    /// The slave answered with a Modbus exception response.
    #[error("Slave exception {0:#04x}")]
    SlaveException(u8),

    /// Byte count field disagrees with the expected register payload.
    #[error("Malformed response frame")]
    MalformedFrame,

    /// The response ended before the expected number of bytes arrived.
    #[error("Response frame too short: received {received}, expected {expected}")]
    FrameTooShort { received: usize, expected: usize },

    /// A valid frame arrived, but from another slave or for another function.
    #[error("Unexpected response from slave {slave} (function {function:#04x})")]
    UnexpectedResponse { slave: u8, function: u8 },

    /// Slave address outside the unicast range 1..=247.
    #[error("Invalid slave address: {0}")]
    InvalidAddress(u8),

    /// Register count outside what a single read of this sensor supports.
    #[error("Invalid register count: {0}")]
    InvalidRegisterCount(u16),
}

/// Payload-free classification of a [`ModbusError`].
///
/// This is what a [`Reading`](super::types::Reading) keeps when a poll fails,
/// so readings stay `Copy`-friendly regardless of the link's error type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    Io,
    Transceiver,
    ShortWrite,
    Timeout,
    CrcMismatch,
    SlaveException(u8),
    MalformedFrame,
    FrameTooShort,
    UnexpectedResponse,
    InvalidAddress,
    InvalidRegisterCount,
}

impl<E: core::fmt::Debug> ModbusError<E> {
    /// Returns the payload-free kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModbusError::Io(_) => ErrorKind::Io,
            ModbusError::Transceiver(_) => ErrorKind::Transceiver,
            ModbusError::ShortWrite { .. } => ErrorKind::ShortWrite,
            ModbusError::Timeout => ErrorKind::Timeout,
            ModbusError::CrcMismatch { .. } => ErrorKind::CrcMismatch,
            ModbusError::SlaveException(code) => ErrorKind::SlaveException(*code),
            ModbusError::MalformedFrame => ErrorKind::MalformedFrame,
            ModbusError::FrameTooShort { .. } => ErrorKind::FrameTooShort,
            ModbusError::UnexpectedResponse { .. } => ErrorKind::UnexpectedResponse,
            ModbusError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            ModbusError::InvalidRegisterCount(_) => ErrorKind::InvalidRegisterCount,
        }
    }
}

impl<E: core::fmt::Debug> From<TransceiverError> for ModbusError<E> {
    fn from(e: TransceiverError) -> Self {
        ModbusError::Transceiver(e)
    }
}

/// Standard Modbus exception codes, for display and matching only.
///
/// [`ModbusError::SlaveException`] carries the raw code untranslated; this
/// type is a convenience view over it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExceptionCode {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    SlaveDeviceFailure,
    Acknowledge,
    SlaveDeviceBusy,
    MemoryParityError,
    GatewayPathUnavailable,
    GatewayTargetFailedToRespond,
    Other(u8),
}

impl From<u8> for ExceptionCode {
    fn from(code: u8) -> Self {
        match code {
            0x01 => ExceptionCode::IllegalFunction,
            0x02 => ExceptionCode::IllegalDataAddress,
            0x03 => ExceptionCode::IllegalDataValue,
            0x04 => ExceptionCode::SlaveDeviceFailure,
            0x05 => ExceptionCode::Acknowledge,
            0x06 => ExceptionCode::SlaveDeviceBusy,
            0x08 => ExceptionCode::MemoryParityError,
            0x0A => ExceptionCode::GatewayPathUnavailable,
            0x0B => ExceptionCode::GatewayTargetFailedToRespond,
            other => ExceptionCode::Other(other),
        }
    }
}

impl core::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExceptionCode::IllegalFunction => write!(f, "illegal function"),
            ExceptionCode::IllegalDataAddress => write!(f, "illegal data address"),
            ExceptionCode::IllegalDataValue => write!(f, "illegal data value"),
            ExceptionCode::SlaveDeviceFailure => write!(f, "slave device failure"),
            ExceptionCode::Acknowledge => write!(f, "acknowledge"),
            ExceptionCode::SlaveDeviceBusy => write!(f, "slave device busy"),
            ExceptionCode::MemoryParityError => write!(f, "memory parity error"),
            ExceptionCode::GatewayPathUnavailable => write!(f, "gateway path unavailable"),
            ExceptionCode::GatewayTargetFailedToRespond => {
                write!(f, "gateway target device failed to respond")
            }
            ExceptionCode::Other(code) => write!(f, "exception {:#04x}", code),
        }
    }
}

// Link errors are wrapped explicitly with `ModbusError::Io`.

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockIoError;

    #[test]
    fn test_kind_keeps_exception_code() {
        let err: ModbusError<MockIoError> = ModbusError::SlaveException(0x02);
        assert_eq!(err.kind(), ErrorKind::SlaveException(0x02));
    }

    #[test]
    fn test_kind_drops_io_payload() {
        let err = ModbusError::Io(MockIoError);
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_exception_code_lookup() {
        assert_eq!(ExceptionCode::from(0x02), ExceptionCode::IllegalDataAddress);
        assert_eq!(ExceptionCode::from(0x06), ExceptionCode::SlaveDeviceBusy);
        assert_eq!(ExceptionCode::from(0x7F), ExceptionCode::Other(0x7F));
    }

    #[test]
    fn test_exception_code_display() {
        assert_eq!(std::format!("{}", ExceptionCode::from(0x02)), "illegal data address");
        assert_eq!(std::format!("{}", ExceptionCode::from(0x7F)), "exception 0x7f");
    }
}
