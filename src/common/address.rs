// src/common/address.rs

use super::error::ModbusError;
use core::convert::TryFrom;
use core::fmt;

/// A Modbus RTU unicast slave address (1..=247).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct SlaveAddr(u8);

impl SlaveAddr {
    /// Factory address of the soil NPK sensors.
    pub const DEFAULT_ADDRESS: SlaveAddr = SlaveAddr(0x01);
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 247;

    /// Creates a new `SlaveAddr` if `address` is a unicast address.
    ///
    /// 0 is the broadcast address, which never answers a read, and
    /// 248..=255 are reserved.
    pub fn new(address: u8) -> Result<Self, ModbusError<()>> {
        if Self::is_valid_address(address) {
            Ok(SlaveAddr(address))
        } else {
            Err(ModbusError::InvalidAddress(address))
        }
    }

    /// # Safety
    ///
    /// `address` must be in `1..=247`.
    pub const unsafe fn new_unchecked(address: u8) -> Self {
        SlaveAddr(address)
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_valid_address(address: u8) -> bool {
        matches!(address, Self::MIN..=Self::MAX)
    }
}

impl Default for SlaveAddr {
    fn default() -> Self {
        Self::DEFAULT_ADDRESS
    }
}

impl TryFrom<u8> for SlaveAddr {
    type Error = ModbusError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlaveAddr> for u8 {
    fn from(value: SlaveAddr) -> Self {
        value.0
    }
}

impl fmt::Display for SlaveAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
