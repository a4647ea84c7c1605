// src/lib.rs

#![no_std] // Specify no_std at the crate root

#[cfg(test)]
extern crate std;

pub mod common;
pub mod master;
pub mod probe;

// Re-export key types for convenience
pub use common::{ModbusError, ParameterId, Reading, SlaveAddr};
pub use master::{RtuMaster, RtuMasterConfig};
pub use probe::SoilProbe;
