// src/common/types.rs

use arrayvec::ArrayVec;
use core::fmt;

use super::error::ErrorKind;
use super::frame::MAX_REGISTERS;

/// The soil parameters exposed by the sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParameterId {
    Nitrogen,
    Phosphorus,
    Potassium,
    Electroconductivity,
    Ph,
    Temperature,
}

impl ParameterId {
    /// Every parameter, in polling order.
    pub const ALL: [ParameterId; 6] = [
        ParameterId::Nitrogen,
        ParameterId::Phosphorus,
        ParameterId::Potassium,
        ParameterId::Electroconductivity,
        ParameterId::Ph,
        ParameterId::Temperature,
    ];

    /// Position of this parameter in [`ParameterId::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ParameterId::Nitrogen => 0,
            ParameterId::Phosphorus => 1,
            ParameterId::Potassium => 2,
            ParameterId::Electroconductivity => 3,
            ParameterId::Ph => 4,
            ParameterId::Temperature => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ParameterId::Nitrogen => "nitrogen",
            ParameterId::Phosphorus => "phosphorus",
            ParameterId::Potassium => "potassium",
            ParameterId::Electroconductivity => "electroconductivity",
            ParameterId::Ph => "pH",
            ParameterId::Temperature => "temperature",
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one poll.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReadingStatus {
    Ok,
    Error(ErrorKind),
}

/// One polled and scaled sensor value.
///
/// On failure `raw` is empty and `value` is NaN; check `status` first.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub parameter: ParameterId,
    pub raw: ArrayVec<u16, MAX_REGISTERS>,
    pub value: f64,
    pub status: ReadingStatus,
}

impl Reading {
    pub fn ok(parameter: ParameterId, raw: &[u16], value: f64) -> Self {
        Reading {
            parameter,
            raw: raw.iter().copied().take(MAX_REGISTERS).collect(),
            value,
            status: ReadingStatus::Ok,
        }
    }

    pub fn failed(parameter: ParameterId, kind: ErrorKind) -> Self {
        Reading {
            parameter,
            raw: ArrayVec::new(),
            value: f64::NAN,
            status: ReadingStatus::Error(kind),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == ReadingStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_index() {
        for (i, p) in ParameterId::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn test_failed_reading_has_no_value() {
        let r = Reading::failed(ParameterId::Ph, ErrorKind::Timeout);
        assert!(!r.is_ok());
        assert!(r.value.is_nan());
        assert!(r.raw.is_empty());
        assert_eq!(r.status, ReadingStatus::Error(ErrorKind::Timeout));
    }

    #[test]
    fn test_ok_reading_keeps_raw() {
        let r = Reading::ok(ParameterId::Temperature, &[250, 600], 25.0);
        assert!(r.is_ok());
        assert_eq!(r.raw.as_slice(), &[250, 600]);
    }
}
