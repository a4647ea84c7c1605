// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod crc;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod scaling;
pub mod timing;
pub mod transceiver;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From address.rs
pub use address::SlaveAddr;

// From crc.rs
pub use crc::{calculate_crc16, decode_crc, encode_crc, verify_frame_crc};

// From error.rs
pub use error::{ErrorKind, ExceptionCode, ModbusError};

// From frame.rs
pub use frame::{build_request, parse_response, Request, RequestFrame, Response};

// From hal_traits.rs
pub use hal_traits::{DirectionControl, RtuSerial, RtuTimer};

// From scaling.rs
pub use scaling::{scale, ParameterSpec, ParameterTable, PARAMETER_TABLE};

// From timing.rs (constants - users can access via common::timing::*)

// From transceiver.rs
pub use transceiver::{Direction, Transceiver, TransceiverConfig, TransceiverError};

// From types.rs
pub use types::{ParameterId, Reading, ReadingStatus};
