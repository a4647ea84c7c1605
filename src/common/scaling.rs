// src/common/scaling.rs

//! Register map and raw-to-engineering-unit conversion.

use super::types::ParameterId;

/// Where a parameter lives and how its raw value converts to units.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterSpec {
    pub start_register: u16,
    pub register_count: u16,
    pub scale: f64,
    pub offset: f64,
    /// Interpret the raw register as two's-complement `i16`.
    ///
    /// When false the register is taken as a plain `u16`, so
    /// `value = raw[0] * scale + offset`. The default table sets this for
    /// Temperature only; a raw 0xFFCE then reads -5.0 rather than 6548.6.
    pub signed: bool,
    #[cfg_attr(feature = "serde", serde(skip, default))]
    pub unit: &'static str,
}

impl ParameterSpec {
    /// Converts raw registers to a value. Only the first register carries the reading.
    pub fn apply(&self, raw_registers: &[u16]) -> f64 {
        let raw = raw_registers.first().copied().unwrap_or(0);
        let raw = if self.signed { f64::from(raw as i16) } else { f64::from(raw) };
        raw * self.scale + self.offset
    }
}

/// Per-parameter register map, indexed by [`ParameterId::index`].
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterTable {
    specs: [ParameterSpec; 6],
}

impl ParameterTable {
    // Nitrogen, phosphorus, potassium and EC are taken 1:1 as the sensor
    // sheets state; override the table if a unit reports otherwise.
    pub const DEFAULT: ParameterTable = ParameterTable {
        specs: [
            ParameterSpec { start_register: 0x1E, register_count: 1, scale: 1.0, offset: 0.0, signed: false, unit: "mg/kg" },
            ParameterSpec { start_register: 0x1F, register_count: 1, scale: 1.0, offset: 0.0, signed: false, unit: "mg/kg" },
            ParameterSpec { start_register: 0x20, register_count: 1, scale: 1.0, offset: 0.0, signed: false, unit: "mg/kg" },
            ParameterSpec { start_register: 0x15, register_count: 1, scale: 1.0, offset: 0.0, signed: false, unit: "uS/cm" },
            ParameterSpec { start_register: 0x06, register_count: 1, scale: 0.01, offset: 0.0, signed: false, unit: "pH" },
            ParameterSpec { start_register: 0x12, register_count: 1, scale: 0.1, offset: 0.0, signed: true, unit: "degC" },
        ],
    };

    #[inline]
    pub fn spec(&self, parameter: ParameterId) -> &ParameterSpec {
        &self.specs[parameter.index()]
    }

    /// Returns a copy of this table with `parameter` replaced.
    pub fn with_spec(mut self, parameter: ParameterId, spec: ParameterSpec) -> Self {
        self.specs[parameter.index()] = spec;
        self
    }

    /// Converts raw registers for `parameter` using this table.
    #[inline]
    pub fn scale(&self, parameter: ParameterId, raw_registers: &[u16]) -> f64 {
        self.spec(parameter).apply(raw_registers)
    }
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Process-wide register map.
pub static PARAMETER_TABLE: ParameterTable = ParameterTable::DEFAULT;

/// Converts raw registers for `parameter` using [`PARAMETER_TABLE`].
///
/// `value = raw[0] * scale + offset`. Never fails.
#[inline]
pub fn scale(parameter: ParameterId, raw_registers: &[u16]) -> f64 {
    PARAMETER_TABLE.scale(parameter, raw_registers)
}
