// src/common/frame.rs

//! Modbus RTU request building and response parsing for function 0x03.

use arrayvec::ArrayVec;

use super::address::SlaveAddr;
use super::crc::{encode_crc, frame_crcs, calculate_crc16, CRC_LEN};
use super::error::ModbusError;

/// Function codes understood by this crate.
pub mod function_code {
    /// Read Holding Registers.
    pub const READ_HOLDING_REGISTERS: u8 = 0x03;
    /// Set on the function byte of an exception response.
    pub const EXCEPTION_FLAG: u8 = 0x80;
}

/// Largest register count a single read of this sensor uses.
pub const MAX_REGISTERS: usize = 2;
/// Length of every read holding registers request frame.
pub const REQUEST_FRAME_LEN: usize = 8;
/// Length of an exception response: address, function, code, CRC.
pub const EXCEPTION_RESPONSE_LEN: usize = 5;
/// Largest response this crate ever buffers.
pub const MAX_RESPONSE_LEN: usize = 5 + 2 * MAX_REGISTERS;

/// Length of a normal read holding registers response for `register_count` registers.
#[inline]
pub const fn expected_response_len(register_count: u16) -> usize {
    5 + 2 * register_count as usize
}

/// A read holding registers request.
///
/// Built through [`Request::read_holding_registers`], which enforces the
/// register count invariant so that [`build_request`] never fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Request {
    slave: SlaveAddr,
    function_code: u8,
    start_register: u16,
    register_count: u16,
}

impl Request {
    /// Creates a read holding registers request.
    ///
    /// Returns `Err(ModbusError::InvalidRegisterCount)` unless
    /// `register_count` is 1 or 2.
    pub fn read_holding_registers(
        slave: SlaveAddr,
        start_register: u16,
        register_count: u16,
    ) -> Result<Self, ModbusError<()>> {
        if register_count == 0 || register_count as usize > MAX_REGISTERS {
            return Err(ModbusError::InvalidRegisterCount(register_count));
        }
        Ok(Request {
            slave,
            function_code: function_code::READ_HOLDING_REGISTERS,
            start_register,
            register_count,
        })
    }

    #[inline]
    pub fn slave(&self) -> SlaveAddr {
        self.slave
    }

    #[inline]
    pub fn function_code(&self) -> u8 {
        self.function_code
    }

    #[inline]
    pub fn start_register(&self) -> u16 {
        self.start_register
    }

    #[inline]
    pub fn register_count(&self) -> u16 {
        self.register_count
    }

    /// Length of the normal (non-exception) response to this request.
    #[inline]
    pub fn expected_response_len(&self) -> usize {
        expected_response_len(self.register_count)
    }
}

/// An encoded 8-byte request frame, CRC included.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RequestFrame([u8; REQUEST_FRAME_LEN]);

impl RequestFrame {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Serializes a request into its wire frame.
///
/// Register address and count go big-endian, the CRC of the first six bytes
/// follows low byte first.
pub fn build_request(request: &Request) -> RequestFrame {
    let start = request.start_register.to_be_bytes();
    let count = request.register_count.to_be_bytes();
    let mut data = [
        request.slave.as_u8(),
        request.function_code,
        start[0],
        start[1],
        count[0],
        count[1],
        0,
        0,
    ];
    let crc = encode_crc(calculate_crc16(&data[..REQUEST_FRAME_LEN - CRC_LEN]));
    data[REQUEST_FRAME_LEN - CRC_LEN..].copy_from_slice(&crc);
    RequestFrame(data)
}

/// A validated read holding registers response.
///
/// Only [`parse_response`] produces these.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Response {
    slave: u8,
    function_code: u8,
    registers: ArrayVec<u16, MAX_REGISTERS>,
}

impl Response {
    #[inline]
    pub fn slave(&self) -> u8 {
        self.slave
    }

    #[inline]
    pub fn function_code(&self) -> u8 {
        self.function_code
    }

    /// Register values in request order.
    #[inline]
    pub fn registers(&self) -> &[u16] {
        &self.registers
    }
}

/// Parses and validates a raw response frame.
///
/// Checks run in order and stop at the first failure:
/// 1. length (`5 + 2 * count`, or the 5-byte exception form),
/// 2. CRC,
/// 3. slave address and function code (exception responses surface here),
/// 4. byte count field,
///
/// then the registers are read out big-endian.
pub fn parse_response<E>(
    bytes: &[u8],
    expected_slave: u8,
    expected_function: u8,
    expected_register_count: u16,
) -> Result<Response, ModbusError<E>>
where
    E: core::fmt::Debug,
{
    let expected_len = expected_response_len(expected_register_count);
    let exception_function = expected_function | function_code::EXCEPTION_FLAG;

    // 1. Length
    let is_exception_shape = bytes.len() == EXCEPTION_RESPONSE_LEN
        && bytes[1] & function_code::EXCEPTION_FLAG != 0;
    if bytes.len() != expected_len && !is_exception_shape {
        return if bytes.len() < expected_len {
            Err(ModbusError::FrameTooShort { received: bytes.len(), expected: expected_len })
        } else {
            Err(ModbusError::MalformedFrame)
        };
    }

    // 2. CRC
    match frame_crcs(bytes) {
        Some((received, calculated)) if received == calculated => {}
        Some((received, calculated)) => {
            return Err(ModbusError::CrcMismatch { expected: received, calculated });
        }
        None => return Err(ModbusError::MalformedFrame),
    }

    // 3. Address and function
    let (slave, function) = (bytes[0], bytes[1]);
    if slave != expected_slave {
        return Err(ModbusError::UnexpectedResponse { slave, function });
    }
    if function == exception_function {
        return Err(ModbusError::SlaveException(bytes[2]));
    }
    if function != expected_function {
        return Err(ModbusError::UnexpectedResponse { slave, function });
    }

    // 4. Byte count
    if bytes[2] as usize != 2 * expected_register_count as usize {
        return Err(ModbusError::MalformedFrame);
    }

    let payload = &bytes[3..bytes.len() - CRC_LEN];
    let mut registers = ArrayVec::new();
    for chunk in payload.chunks_exact(2) {
        registers
            .try_push(u16::from_be_bytes([chunk[0], chunk[1]]))
            .map_err(|_| ModbusError::MalformedFrame)?;
    }

    Ok(Response { slave, function_code: function, registers })
}
